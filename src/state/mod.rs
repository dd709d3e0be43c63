pub mod deck;
pub mod input;
pub mod matching;
pub mod progress;
pub mod question;
pub mod round;
pub mod session;
pub mod trivia;
pub mod verse;

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{kv_store::KeyValueStore, progress_store::ProgressStore, question_source::QuestionSource},
    state::{
        input::InputRouter,
        session::{MatchingSession, QuizSession, TriviaSession},
        verse::VerseCatalog,
    },
};

pub type SharedState = Arc<AppState>;

/// Game type namespacing trivia records in the key-value store.
pub const TRIVIA_GAME_TYPE: &str = "trivia";

/// An event to deliver after `after` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delayed<E> {
    /// Delay before delivery.
    pub after: Duration,
    /// Event to deliver.
    pub event: E,
}

/// Live sessions of one game, each behind its own lock.
pub type SessionMap<S> = DashMap<Uuid, Arc<Mutex<S>>>;

/// Central application state: configuration, backends and live sessions.
pub struct AppState {
    config: AppConfig,
    saves: ProgressStore,
    source: Arc<dyn QuestionSource>,
    verses: VerseCatalog,
    input: Arc<InputRouter>,
    matching: SessionMap<MatchingSession>,
    quiz: SessionMap<QuizSession>,
    trivia: SessionMap<TriviaSession>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        kv: Arc<dyn KeyValueStore>,
        source: Arc<dyn QuestionSource>,
        verses: VerseCatalog,
    ) -> SharedState {
        Arc::new(Self {
            config,
            saves: ProgressStore::new(kv, TRIVIA_GAME_TYPE),
            source,
            verses,
            input: InputRouter::new(),
            matching: DashMap::new(),
            quiz: DashMap::new(),
            trivia: DashMap::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Trivia saved games.
    pub fn saves(&self) -> &ProgressStore {
        &self.saves
    }

    /// Hosted question tables.
    pub fn source(&self) -> Arc<dyn QuestionSource> {
        Arc::clone(&self.source)
    }

    /// Verse catalog.
    pub fn verses(&self) -> &VerseCatalog {
        &self.verses
    }

    /// Key routing registry.
    pub fn input(&self) -> &Arc<InputRouter> {
        &self.input
    }

    /// Live matching rounds.
    pub fn matching(&self) -> &SessionMap<MatchingSession> {
        &self.matching
    }

    /// Live verse drills.
    pub fn quiz(&self) -> &SessionMap<QuizSession> {
        &self.quiz
    }

    /// Live trivia boards.
    pub fn trivia(&self) -> &SessionMap<TriviaSession> {
        &self.trivia
    }

    /// Drop every live session; trivia boards autosave on the way out.
    pub fn teardown_all(&self) {
        let boards = self.trivia.len();
        self.matching.clear();
        self.quiz.clear();
        self.trivia.clear();
        info!(boards, "live sessions torn down");
    }
}
