//! Jeopardy-style board session.

use std::{collections::BTreeMap, time::SystemTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    dao::models::{ClueEntity, GameRecordEntity, ProgressEntity},
    state::progress::{AskedLog, Tracked},
};

/// Point tiers of a standard board.
pub const DEFAULT_TIERS: [u32; 5] = [100, 200, 300, 400, 500];

/// One clue of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    /// Row id or generated id.
    pub id: String,
    /// Board column.
    pub category: String,
    /// Board row.
    pub points: u32,
    /// Front of the flashcard.
    pub question: String,
    /// Back of the flashcard.
    pub answer: String,
}

/// Key of a board cell, `"<category>-<points>"`.
pub fn clue_key(category: &str, points: u32) -> String {
    format!("{category}-{points}")
}

impl Clue {
    /// Key of the cell this clue occupies.
    pub fn key(&self) -> String {
        clue_key(&self.category, self.points)
    }
}

impl Tracked for Clue {
    fn identity(&self) -> String {
        self.key()
    }
}

impl From<ClueEntity> for Clue {
    fn from(entity: ClueEntity) -> Self {
        Self {
            id: entity.id,
            category: entity.category,
            points: entity.points,
            question: entity.question,
            answer: entity.answer,
        }
    }
}

impl From<Clue> for ClueEntity {
    fn from(clue: Clue) -> Self {
        Self {
            id: clue.id,
            category: clue.category,
            points: clue.points,
            question: clue.question,
            answer: clue.answer,
        }
    }
}

/// Clue grid, columns in display order.
pub type Board = IndexMap<String, BTreeMap<u32, Clue>>;

/// Lower bound applied when adjusting team scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreFloor {
    /// Scores may go negative.
    #[default]
    None,
    /// Scores stop at zero.
    Zero,
}

/// Flashcard currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenClue {
    /// The clue.
    pub clue: Clue,
    /// Whether the answer side is visible.
    pub flipped: bool,
}

/// Rejected board actions. The game is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriviaError {
    /// The board has no clue in this cell.
    #[error("no clue for `{0}`")]
    UnknownClue(String),
    /// The clue was already revealed.
    #[error("clue `{0}` was already asked")]
    AlreadyAsked(String),
    /// Another flashcard is open.
    #[error("clue `{0}` is still open")]
    ClueOpen(String),
    /// No flashcard is open.
    #[error("no clue is open")]
    NoOpenClue,
    /// Team index out of range.
    #[error("unknown team {0}")]
    UnknownTeam(usize),
    /// Teams can only be renamed before the first clue is asked.
    #[error("teams cannot change once the game has started")]
    GameStarted,
}

/// Live state of one trivia game.
#[derive(Debug, Clone)]
pub struct TriviaGame {
    id: Uuid,
    name: String,
    teams: Vec<String>,
    categories: Vec<String>,
    board: Board,
    created_at: Option<SystemTime>,
    asked: AskedLog<Clue>,
    scores: Vec<i32>,
    open: Option<OpenClue>,
    floor: ScoreFloor,
}

impl TriviaGame {
    /// Fresh game with zeroed scores.
    pub fn new(
        name: String,
        teams: Vec<String>,
        categories: Vec<String>,
        board: Board,
        floor: ScoreFloor,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            scores: vec![0; teams.len()],
            teams,
            categories,
            board,
            created_at: Some(SystemTime::now()),
            asked: AskedLog::new(),
            open: None,
            floor,
        }
    }

    /// Rebuild a game from its stored record.
    ///
    /// Asked keys without a history entry (e.g. from the mirrored asked set)
    /// are resolved against the board; keys that match no cell are dropped.
    pub fn from_record(
        record: GameRecordEntity,
        mirrored_asked: Option<Vec<String>>,
        floor: ScoreFloor,
    ) -> Self {
        let board = record
            .board
            .into_iter()
            .map(|(category, column)| {
                let column = column
                    .into_iter()
                    .map(|(points, clue)| (points, Clue::from(clue)))
                    .collect();
                (category, column)
            })
            .collect::<Board>();

        let progress = record.progress.unwrap_or_default();
        let mut asked = AskedLog::restore(progress.history.into_iter().map(Clue::from));
        for key in progress
            .asked_clues
            .iter()
            .chain(mirrored_asked.iter().flatten())
        {
            if asked.contains(key) {
                continue;
            }
            if let Some(clue) = find_by_key(&board, key) {
                asked.mark_oldest(clue);
            }
        }

        let mut scores = progress.team_scores;
        scores.resize(record.teams.len(), 0);

        Self {
            id: record.id,
            name: record.name,
            teams: record.teams,
            categories: record.categories,
            board,
            created_at: record.created_at,
            asked,
            scores,
            open: None,
            floor,
        }
    }

    /// Session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw team names.
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    /// Team name, falling back to `Team <n>` for blank names.
    pub fn team_name(&self, index: usize) -> String {
        match self.teams.get(index) {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Team {}", index + 1),
        }
    }

    /// Category order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Clue grid.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Score per team.
    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    /// Asked set and newest-first history.
    pub fn asked(&self) -> &AskedLog<Clue> {
        &self.asked
    }

    /// Flashcard currently open.
    pub fn open_clue(&self) -> Option<&OpenClue> {
        self.open.as_ref()
    }

    /// Whether every clue on the board was asked.
    pub fn is_complete(&self) -> bool {
        self.board
            .values()
            .flat_map(BTreeMap::values)
            .all(|clue| self.asked.contains(&clue.key()))
    }

    /// Open the flashcard of a cell, front side up.
    pub fn open(&mut self, category: &str, points: u32) -> Result<&Clue, TriviaError> {
        let key = clue_key(category, points);
        if let Some(open) = &self.open {
            if open.clue.key() != key {
                return Err(TriviaError::ClueOpen(open.clue.key()));
            }
        }
        if self.asked.contains(&key) {
            return Err(TriviaError::AlreadyAsked(key));
        }
        let clue = self
            .board
            .get(category)
            .and_then(|column| column.get(&points))
            .cloned()
            .ok_or(TriviaError::UnknownClue(key))?;

        let open = self.open.insert(OpenClue {
            clue,
            flipped: false,
        });
        Ok(&open.clue)
    }

    /// Turn the open flashcard over. Returns whether the answer side is now visible.
    pub fn flip(&mut self) -> Result<bool, TriviaError> {
        let open = self.open.as_mut().ok_or(TriviaError::NoOpenClue)?;
        open.flipped = !open.flipped;
        Ok(open.flipped)
    }

    /// Close the open flashcard. A clue whose answer was seen is marked asked.
    ///
    /// Returns whether the clue was newly recorded.
    pub fn close(&mut self) -> Result<bool, TriviaError> {
        let open = self.open.take().ok_or(TriviaError::NoOpenClue)?;
        if open.flipped {
            Ok(self.mark_asked(&open.clue))
        } else {
            Ok(false)
        }
    }

    /// Record a clue as asked. Idempotent.
    pub fn mark_asked(&mut self, clue: &Clue) -> bool {
        self.asked.mark(clue)
    }

    /// Add `delta` to a team's score, honouring the floor policy.
    pub fn adjust_score(&mut self, team: usize, delta: i32) -> Result<i32, TriviaError> {
        let floor = self.floor;
        let score = self
            .scores
            .get_mut(team)
            .ok_or(TriviaError::UnknownTeam(team))?;
        let next = score.saturating_add(delta);
        *score = match floor {
            ScoreFloor::None => next,
            ScoreFloor::Zero => next.max(0),
        };
        Ok(*score)
    }

    /// Replace team names before the first clue is asked. Scores reset.
    pub fn rename_teams(&mut self, teams: Vec<String>) -> Result<(), TriviaError> {
        if !self.asked.is_empty() {
            return Err(TriviaError::GameStarted);
        }
        self.scores = vec![0; teams.len()];
        self.teams = teams;
        Ok(())
    }

    /// Progress snapshot to persist.
    pub fn progress(&self) -> ProgressEntity {
        ProgressEntity {
            asked_clues: self.asked.asked_keys(),
            team_scores: self.scores.clone(),
            history: self
                .asked
                .history()
                .iter()
                .cloned()
                .map(ClueEntity::from)
                .collect(),
        }
    }

    /// Full record to persist.
    pub fn record(&self) -> GameRecordEntity {
        GameRecordEntity {
            id: self.id,
            name: self.name.clone(),
            teams: self.teams.clone(),
            categories: self.categories.clone(),
            board: self
                .board
                .iter()
                .map(|(category, column)| {
                    let column = column
                        .iter()
                        .map(|(points, clue)| (*points, ClueEntity::from(clue.clone())))
                        .collect();
                    (category.clone(), column)
                })
                .collect(),
            created_at: self.created_at,
            progress: Some(self.progress()),
        }
    }
}

fn find_by_key<'a>(board: &'a Board, key: &str) -> Option<&'a Clue> {
    board
        .values()
        .flat_map(BTreeMap::values)
        .find(|clue| clue.key() == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clue(category: &str, points: u32) -> Clue {
        Clue {
            id: format!("{category}{points}"),
            category: category.into(),
            points,
            question: format!("{category} for {points}"),
            answer: "answer".into(),
        }
    }

    fn board() -> Board {
        let mut board = Board::new();
        for category in ["Prophets", "Places"] {
            let column = [100, 200]
                .into_iter()
                .map(|points| (points, clue(category, points)))
                .collect();
            board.insert(category.to_string(), column);
        }
        board
    }

    fn game(floor: ScoreFloor) -> TriviaGame {
        TriviaGame::new(
            "Friday".into(),
            vec!["Red".into(), "".into()],
            vec!["Prophets".into(), "Places".into()],
            board(),
            floor,
        )
    }

    fn reveal(game: &mut TriviaGame, category: &str, points: u32) -> bool {
        game.open(category, points).unwrap();
        game.flip().unwrap();
        game.close().unwrap()
    }

    #[test]
    fn flashcard_flow_marks_asked_only_when_flipped() {
        let mut game = game(ScoreFloor::None);

        game.open("Prophets", 100).unwrap();
        assert!(!game.close().unwrap());
        assert!(game.asked().is_empty());

        assert!(reveal(&mut game, "Prophets", 100));
        assert!(game.asked().contains("Prophets-100"));
        assert_eq!(
            game.open("Prophets", 100),
            Err(TriviaError::AlreadyAsked("Prophets-100".into()))
        );
    }

    #[test]
    fn flip_toggles_and_needs_open_clue() {
        let mut game = game(ScoreFloor::None);
        assert_eq!(game.flip(), Err(TriviaError::NoOpenClue));
        assert_eq!(game.close(), Err(TriviaError::NoOpenClue));

        game.open("Places", 200).unwrap();
        assert_eq!(game.flip(), Ok(true));
        assert_eq!(game.flip(), Ok(false));
        assert!(!game.close().unwrap());
    }

    #[test]
    fn only_one_clue_open_at_a_time() {
        let mut game = game(ScoreFloor::None);
        game.open("Places", 100).unwrap();
        assert_eq!(
            game.open("Places", 200),
            Err(TriviaError::ClueOpen("Places-100".into()))
        );
        assert!(game.open("Places", 100).is_ok());
        assert_eq!(
            game.open_clue().map(|open| open.clue.key()),
            Some("Places-100".into())
        );
    }

    #[test]
    fn missing_cells_are_reported() {
        let mut game = game(ScoreFloor::None);
        assert_eq!(
            game.open("Prophets", 500),
            Err(TriviaError::UnknownClue("Prophets-500".into()))
        );
    }

    #[test]
    fn mark_asked_is_idempotent_and_history_newest_first() {
        let mut game = game(ScoreFloor::None);
        let first = clue("Prophets", 100);
        assert!(game.mark_asked(&first));
        assert!(!game.mark_asked(&first));
        reveal(&mut game, "Places", 200);

        let progress = game.progress();
        assert_eq!(progress.asked_clues, vec!["Places-200", "Prophets-100"]);
        assert_eq!(progress.history.len(), 2);
        assert_eq!(progress.history[0].category, "Places");
    }

    #[test]
    fn score_floor_policies() {
        let mut free = game(ScoreFloor::None);
        assert_eq!(free.adjust_score(0, -100), Ok(-100));
        assert_eq!(free.adjust_score(1, 300), Ok(300));
        assert_eq!(free.adjust_score(2, 100), Err(TriviaError::UnknownTeam(2)));

        let mut floored = game(ScoreFloor::Zero);
        assert_eq!(floored.adjust_score(0, 100), Ok(100));
        assert_eq!(floored.adjust_score(0, -200), Ok(0));
    }

    #[test]
    fn team_names_fall_back_to_position() {
        let game = game(ScoreFloor::None);
        assert_eq!(game.team_name(0), "Red");
        assert_eq!(game.team_name(1), "Team 2");
    }

    #[test]
    fn teams_can_only_change_before_start() {
        let mut game = game(ScoreFloor::None);
        game.rename_teams(vec!["A".into(), "B".into(), "C".into()])
            .unwrap();
        assert_eq!(game.scores(), &[0, 0, 0]);

        reveal(&mut game, "Places", 100);
        assert_eq!(
            game.rename_teams(vec!["X".into(), "Y".into()]),
            Err(TriviaError::GameStarted)
        );
    }

    #[test]
    fn record_round_trip_restores_progress() {
        let mut game = game(ScoreFloor::None);
        reveal(&mut game, "Prophets", 200);
        game.adjust_score(1, 200).unwrap();

        let record = game.record();
        let restored = TriviaGame::from_record(record, None, ScoreFloor::None);

        assert_eq!(restored.id(), game.id());
        assert_eq!(restored.progress(), game.progress());
        assert_eq!(restored.board(), game.board());
        assert!(restored.open_clue().is_none());
    }

    #[test]
    fn restore_resolves_mirrored_keys_and_pads_scores() {
        let game = game(ScoreFloor::None);
        let mut record = game.record();
        record.progress = Some(ProgressEntity {
            asked_clues: vec!["Places-100".into(), "Nowhere-900".into()],
            team_scores: vec![100],
            history: vec![],
        });

        let restored = TriviaGame::from_record(
            record,
            Some(vec!["Prophets-200".into()]),
            ScoreFloor::None,
        );
        assert_eq!(
            restored.asked().asked_keys(),
            vec!["Places-100", "Prophets-200"]
        );
        assert_eq!(restored.scores(), &[100, 0]);
        assert!(!restored.is_complete());
    }

    #[test]
    fn board_completes_when_every_clue_is_asked() {
        let mut game = game(ScoreFloor::None);
        for category in ["Prophets", "Places"] {
            for points in [100, 200] {
                reveal(&mut game, category, points);
            }
        }
        assert!(game.is_complete());
    }
}
