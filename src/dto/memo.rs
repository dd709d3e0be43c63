use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    dao::models::VerseEntity,
    state::verse::{RangeMode, preview, word_count},
};

/// Words shown in the partial preview when the client does not ask for a count.
pub const DEFAULT_PREVIEW_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RangeModeDto {
    #[default]
    Surah,
    Juz,
}

impl From<RangeModeDto> for RangeMode {
    fn from(value: RangeModeDto) -> Self {
        match value {
            RangeModeDto::Surah => RangeMode::Surah,
            RangeModeDto::Juz => RangeMode::Juz,
        }
    }
}

/// Random verse inside an inclusive range.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerseQuery {
    /// `surah` (1-114) or `juz` (1-30).
    #[serde(default)]
    pub mode: RangeModeDto,
    pub start: u16,
    pub end: u16,
    /// Words in the partial preview, at least one.
    #[serde(default)]
    pub preview_words: Option<usize>,
}

/// Neighbour of a verse inside the same range.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdjacentQuery {
    #[serde(default)]
    pub mode: RangeModeDto,
    pub start: u16,
    pub end: u16,
    /// Verse to move from.
    pub surah: u16,
    pub ayah: u16,
    /// Steps to move; negative goes back.
    #[serde(default = "default_offset")]
    pub offset: i64,
    #[serde(default)]
    pub preview_words: Option<usize>,
}

fn default_offset() -> i64 {
    1
}

/// Picked verse.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerseResponse {
    pub surah: u16,
    pub ayah: u16,
    pub juz: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surah_name: Option<String>,
    pub text: String,
    pub word_count: usize,
    /// First words of the verse, for recall practice.
    pub preview: String,
}

impl VerseResponse {
    pub fn new(verse: &VerseEntity, preview_words: Option<usize>) -> Self {
        Self {
            surah: verse.surah,
            ayah: verse.ayah,
            juz: verse.juz,
            surah_name: verse.surah_name.clone(),
            word_count: word_count(&verse.text),
            preview: preview(&verse.text, preview_words.unwrap_or(DEFAULT_PREVIEW_WORDS)),
            text: verse.text.clone(),
        }
    }
}
