use tracing::debug;
use uuid::Uuid;

use crate::{
    dao::progress_store::ProgressStore,
    state::{
        input::Subscription, matching::MatchingRound, question::QuizQuestion,
        round::RoundController, trivia::TriviaGame,
    },
};

/// Live word matching round.
#[derive(Debug)]
pub struct MatchingSession {
    /// Session id.
    pub id: Uuid,
    /// Round state.
    pub round: MatchingRound,
    _input: Subscription,
}

impl MatchingSession {
    /// Wrap a round, keeping its key binding alive with it.
    pub fn new(id: Uuid, round: MatchingRound, input: Subscription) -> Self {
        Self {
            id,
            round,
            _input: input,
        }
    }
}

/// Live verse drill.
#[derive(Debug)]
pub struct QuizSession {
    /// Session id.
    pub id: Uuid,
    /// Round controller over decoded questions.
    pub round: RoundController<QuizQuestion>,
}

/// Live trivia board. Dropping it autosaves the progress unless a newer
/// session was resumed under the same id in the meantime.
pub struct TriviaSession {
    /// Game state.
    pub game: TriviaGame,
    saves: ProgressStore,
    input: Subscription,
}

impl TriviaSession {
    /// Attach a game to its store and key binding.
    pub fn new(game: TriviaGame, saves: ProgressStore, input: Subscription) -> Self {
        Self {
            game,
            saves,
            input,
        }
    }
}

impl Drop for TriviaSession {
    fn drop(&mut self) {
        if !self.input.is_current() {
            debug!(game = %self.game.id(), "superseded trivia session dropped without saving");
            return;
        }
        self.saves.autosave(self.game.id(), self.game.progress());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::kv_store::MemoryKeyValueStore,
        state::{
            input::{InputRouter, View},
            trivia::{Board, ScoreFloor},
        },
    };

    fn game() -> TriviaGame {
        TriviaGame::new(
            "Teardown".into(),
            vec!["A".into(), "B".into()],
            vec![],
            Board::new(),
            ScoreFloor::None,
        )
    }

    #[test]
    fn dropping_a_trivia_session_saves_and_unsubscribes() {
        let saves = ProgressStore::new(Arc::new(MemoryKeyValueStore::new()), "trivia");
        let router = InputRouter::new();
        let mut game = game();
        let id = game.id();
        saves.create(&game.record()).unwrap();
        game.adjust_score(0, 300).unwrap();

        let session = TriviaSession::new(game, saves.clone(), router.subscribe(id, View::Trivia));
        assert_eq!(router.view(id), Some(View::Trivia));
        drop(session);

        assert!(router.view(id).is_none());
        let progress = saves.load(id).unwrap().progress.unwrap();
        assert_eq!(progress.team_scores, vec![300, 0]);
    }

    #[test]
    fn teardown_after_delete_writes_nothing() {
        let saves = ProgressStore::new(Arc::new(MemoryKeyValueStore::new()), "trivia");
        let router = InputRouter::new();
        let game = game();
        let id = game.id();
        saves.create(&game.record()).unwrap();

        let session = TriviaSession::new(game, saves.clone(), router.subscribe(id, View::Trivia));
        saves.delete(id).unwrap();
        drop(session);

        assert!(saves.load(id).is_none());
    }

    #[test]
    fn superseded_session_does_not_overwrite_the_newer_save() {
        let saves = ProgressStore::new(Arc::new(MemoryKeyValueStore::new()), "trivia");
        let router = InputRouter::new();
        let mut stale = game();
        let id = stale.id();
        saves.create(&stale.record()).unwrap();
        stale.adjust_score(0, 100).unwrap();
        let stale = TriviaSession::new(stale, saves.clone(), router.subscribe(id, View::Trivia));

        let mut fresh = TriviaGame::from_record(saves.load(id).unwrap(), None, ScoreFloor::None);
        fresh.adjust_score(1, 500).unwrap();
        let fresh = TriviaSession::new(fresh, saves.clone(), router.subscribe(id, View::Trivia));

        drop(stale);
        assert_eq!(router.view(id), Some(View::Trivia));
        assert_eq!(saves.load(id).unwrap().progress.unwrap().team_scores, vec![0, 0]);

        drop(fresh);
        let progress = saves.load(id).unwrap().progress.unwrap();
        assert_eq!(progress.team_scores, vec![0, 500]);
    }
}
