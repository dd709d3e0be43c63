use std::{collections::BTreeMap, time::SystemTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trivia clue as stored inside a board and in the asked history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClueEntity {
    /// Database primary key or a generated UUID for hand-authored clues.
    pub id: String,
    /// Category (board column) the clue belongs to.
    pub category: String,
    /// Point tier (board row).
    pub points: u32,
    /// Clue text shown on the front of the flashcard.
    pub question: String,
    /// Expected response shown on the back of the flashcard.
    pub answer: String,
}

/// Board layout keyed by category then point tier. Missing tiers are absent cells.
pub type BoardEntity = IndexMap<String, BTreeMap<u32, ClueEntity>>;

/// In-progress state of a trivia game, written opportunistically.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntity {
    /// Keys (`"<category>-<points>"`) of every clue already revealed.
    pub asked_clues: Vec<String>,
    /// Score per team, aligned with the record's team list.
    pub team_scores: Vec<i32>,
    /// Revealed clues, newest first.
    pub history: Vec<ClueEntity>,
}

/// Persisted unit of one trivia game instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameRecordEntity {
    /// Session identifier, also embedded in the resume URL.
    pub id: Uuid,
    /// Display name chosen at setup.
    pub name: String,
    /// Team names in display order.
    pub teams: Vec<String>,
    /// Category order used for the board columns.
    pub categories: Vec<String>,
    /// Clue grid.
    pub board: BoardEntity,
    /// Creation timestamp, absent on records written by older clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<SystemTime>,
    /// Saved progress; absence means a fresh game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressEntity>,
}

/// Saved game projection used when listing resumable sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedGameEntity {
    /// Full stored record.
    pub record: GameRecordEntity,
    /// True once at least one clue was asked.
    pub can_resume: bool,
}

impl From<GameRecordEntity> for SavedGameEntity {
    fn from(record: GameRecordEntity) -> Self {
        let can_resume = record
            .progress
            .as_ref()
            .is_some_and(|progress| !progress.asked_clues.is_empty());
        Self { record, can_resume }
    }
}

/// Vocabulary pair used to build matching decks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabPairEntity {
    /// Pairing key shared by the two cards built from this pair.
    pub id: String,
    /// English label.
    pub en: String,
    /// Arabic label.
    pub ar: String,
}

/// Single verse of the bundled Quran catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerseEntity {
    /// Surah number (1-114).
    pub surah: u16,
    /// Ayah number within the surah.
    pub ayah: u16,
    /// Juz number (1-30).
    pub juz: u8,
    /// Verse text.
    pub text: String,
    /// Optional surah display name.
    #[serde(default)]
    pub surah_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_reads_camel_case_layout() {
        let raw = r#"{
            "id": "6f0c7c8e-5a55-4b57-9d8a-9b1f3f7d2a10",
            "name": "Friday night",
            "teams": ["Red", "Blue"],
            "categories": ["Prophets"],
            "board": {"Prophets": {"100": {"id": "7", "category": "Prophets", "points": 100, "question": "q", "answer": "a"}}},
            "progress": {"askedClues": ["Prophets-100"], "teamScores": [100, 0], "history": []}
        }"#;

        let record: GameRecordEntity = serde_json::from_str(raw).unwrap();
        assert_eq!(record.board["Prophets"][&100].id, "7");
        assert!(record.created_at.is_none());

        let saved = SavedGameEntity::from(record);
        assert!(saved.can_resume);
    }

    #[test]
    fn fresh_record_is_not_resumable() {
        let record = GameRecordEntity {
            id: Uuid::new_v4(),
            name: "Fresh".into(),
            teams: vec!["A".into(), "B".into()],
            categories: vec![],
            board: BoardEntity::new(),
            created_at: None,
            progress: Some(ProgressEntity::default()),
        };
        assert!(!SavedGameEntity::from(record).can_resume);
    }
}
