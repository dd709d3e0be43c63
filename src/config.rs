//! Application-level configuration loading: game tuning, storage and question backends.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{
    matching::FeedbackDelays, round::GradeDelays, trivia::DEFAULT_TIERS, trivia::ScoreFloor,
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "AYAHVAULT_BACK_CONFIG_PATH";

/// Word matching tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Lives per round.
    pub lives: u32,
    /// Pairs sampled per round.
    pub pairs_per_round: usize,
    /// Feedback delays.
    pub delays: FeedbackDelays,
    /// Vocabulary table; the built-in starter set is used when absent.
    pub table: Option<String>,
}

/// Verse drill tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    /// Question table.
    pub table: String,
    /// Lives per session; unlimited when absent.
    pub lives: Option<u32>,
    /// Delays between a grade and the next question.
    pub delays: GradeDelays,
}

/// Trivia board tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct TriviaConfig {
    /// Clue table.
    pub table: String,
    /// Point tiers (board rows).
    pub tiers: Vec<u32>,
    /// Default score adjustment.
    pub score_step: i32,
    /// Lower bound applied to team scores.
    pub score_floor: ScoreFloor,
}

/// Where saved games are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process memory; lost on restart.
    Memory,
    /// One JSON file per key in `dir`.
    Files {
        /// Directory holding the records.
        dir: PathBuf,
    },
}

/// Where question rows come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum QuestionsConfig {
    /// In-memory tables, optionally seeded from a JSON file.
    Memory {
        /// Seed file shaped as `{ "<table>": [rows] }`.
        #[serde(default)]
        seed: Option<PathBuf>,
    },
    /// Hosted PostgREST endpoint configured through `POSTGREST_URL`/`POSTGREST_API_KEY`.
    Postgrest,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Word matching tuning.
    pub matching: MatchingConfig,
    /// Verse drill tuning.
    pub quiz: QuizConfig,
    /// Trivia board tuning.
    pub trivia: TriviaConfig,
    /// Saved game backend.
    pub storage: StorageConfig,
    /// Question backend.
    pub questions: QuestionsConfig,
    /// Verse catalog used by the picker.
    pub verses: PathBuf,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        storage = ?app_config.storage,
                        questions = ?app_config.questions,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// In-memory everything, no delays. Used by tests.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.storage = StorageConfig::Memory;
        config.questions = QuestionsConfig::Memory { seed: None };
        config.matching.delays = FeedbackDelays {
            correct: Duration::ZERO,
            wrong: Duration::ZERO,
        };
        config.quiz.delays = GradeDelays {
            correct: Duration::ZERO,
            wrong: Duration::ZERO,
        };
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    matching: RawMatching,
    quiz: RawQuiz,
    trivia: RawTrivia,
    storage: Option<StorageConfig>,
    questions: Option<QuestionsConfig>,
    verses: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMatching {
    lives: u32,
    pairs_per_round: usize,
    correct_delay_ms: u64,
    wrong_delay_ms: u64,
    table: Option<String>,
}

impl Default for RawMatching {
    fn default() -> Self {
        Self {
            lives: 3,
            pairs_per_round: 8,
            correct_delay_ms: 250,
            wrong_delay_ms: 400,
            table: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawQuiz {
    table: String,
    lives: Option<u32>,
    correct_delay_ms: u64,
    wrong_delay_ms: u64,
}

impl Default for RawQuiz {
    fn default() -> Self {
        Self {
            table: "hifzbuddy".into(),
            lives: None,
            correct_delay_ms: 350,
            wrong_delay_ms: 450,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTrivia {
    table: String,
    tiers: Vec<u32>,
    score_step: i32,
    score_floor: ScoreFloor,
}

impl Default for RawTrivia {
    fn default() -> Self {
        Self {
            table: "triviabuddy".into(),
            tiers: DEFAULT_TIERS.to_vec(),
            score_step: 100,
            score_floor: ScoreFloor::None,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let RawConfig {
            matching,
            quiz,
            trivia,
            storage,
            questions,
            verses,
        } = value;

        let mut tiers = trivia.tiers;
        tiers.sort_unstable();
        tiers.dedup();
        if tiers.is_empty() {
            tiers = DEFAULT_TIERS.to_vec();
        }

        Self {
            matching: MatchingConfig {
                lives: matching.lives.max(1),
                pairs_per_round: matching.pairs_per_round.max(1),
                delays: FeedbackDelays {
                    correct: Duration::from_millis(matching.correct_delay_ms),
                    wrong: Duration::from_millis(matching.wrong_delay_ms),
                },
                table: matching.table,
            },
            quiz: QuizConfig {
                table: quiz.table,
                lives: quiz.lives.filter(|lives| *lives > 0),
                delays: GradeDelays {
                    correct: Duration::from_millis(quiz.correct_delay_ms),
                    wrong: Duration::from_millis(quiz.wrong_delay_ms),
                },
            },
            trivia: TriviaConfig {
                table: trivia.table,
                tiers,
                score_step: trivia.score_step,
                score_floor: trivia.score_floor,
            },
            storage: storage.unwrap_or(StorageConfig::Files {
                dir: PathBuf::from("data/saves"),
            }),
            questions: questions.unwrap_or(QuestionsConfig::Memory {
                seed: Some(PathBuf::from("data/questions.json")),
            }),
            verses: verses.unwrap_or_else(|| PathBuf::from("data/quran.json")),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = serde_json::from_str::<RawConfig>("{}").unwrap().into();
        assert_eq!(config.matching.lives, 3);
        assert_eq!(config.matching.pairs_per_round, 8);
        assert_eq!(config.quiz.table, "hifzbuddy");
        assert_eq!(config.quiz.delays, GradeDelays::default());
        assert_eq!(config.trivia.tiers, DEFAULT_TIERS.to_vec());
        assert_eq!(config.trivia.score_floor, ScoreFloor::None);
        assert!(matches!(config.storage, StorageConfig::Files { .. }));
    }

    #[test]
    fn sections_override_defaults() {
        let raw = r#"{
            "matching": {"lives": 5, "pairsPerRound": 6, "table": "arabuddy"},
            "quiz": {"lives": 3, "wrongDelayMs": 0},
            "trivia": {"tiers": [300, 100, 100], "scoreFloor": "zero"},
            "storage": {"backend": "memory"},
            "questions": {"backend": "postgrest"}
        }"#;
        let config: AppConfig = serde_json::from_str::<RawConfig>(raw).unwrap().into();

        assert_eq!(config.matching.lives, 5);
        assert_eq!(config.matching.table.as_deref(), Some("arabuddy"));
        assert_eq!(config.quiz.lives, Some(3));
        assert_eq!(config.quiz.delays.wrong, Duration::ZERO);
        assert_eq!(config.trivia.tiers, vec![100, 300]);
        assert_eq!(config.trivia.score_floor, ScoreFloor::Zero);
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.questions, QuestionsConfig::Postgrest);
    }
}
