//! Random verse picker over a bundled catalog.

use std::{fs, path::Path};

use rand::{Rng, seq::IndexedRandom};
use serde::Deserialize;
use thiserror::Error;

use crate::dao::models::VerseEntity;

/// Highest surah number.
pub const MAX_SURAH: u16 = 114;
/// Highest juz number.
pub const MAX_JUZ: u16 = 30;

/// What a range is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    /// Surah numbers, 1 to 114.
    Surah,
    /// Juz numbers, 1 to 30.
    Juz,
}

impl RangeMode {
    fn label(self) -> &'static str {
        match self {
            RangeMode::Surah => "Surah",
            RangeMode::Juz => "Juz",
        }
    }

    fn max(self) -> u16 {
        match self {
            RangeMode::Surah => MAX_SURAH,
            RangeMode::Juz => MAX_JUZ,
        }
    }
}

/// Picker failures, worded for the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Bounds outside the valid numbering.
    #[error("Invalid {} range.", .mode.label())]
    OutOfBounds {
        /// Mode of the rejected range.
        mode: RangeMode,
    },
    /// Valid range without any verse in the catalog.
    #[error("No verses found for this selection.")]
    NoVerses,
    /// The verse to navigate from is not inside the range.
    #[error("verse {surah}:{ayah} is not part of this selection")]
    NotInRange {
        /// Surah of the verse.
        surah: u16,
        /// Ayah of the verse.
        ayah: u16,
    },
    /// The catalog could not be read.
    #[error("verse catalog unavailable: {0}")]
    Catalog(String),
}

/// Validated inclusive range; reversed bounds are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseRange {
    mode: RangeMode,
    lower: u16,
    upper: u16,
}

impl VerseRange {
    /// Validate a range.
    pub fn new(mode: RangeMode, start: u16, end: u16) -> Result<Self, RangeError> {
        let lower = start.min(end);
        let upper = start.max(end);
        if lower < 1 || upper > mode.max() {
            return Err(RangeError::OutOfBounds { mode });
        }
        Ok(Self { mode, lower, upper })
    }

    /// Lower bound.
    pub fn lower(&self) -> u16 {
        self.lower
    }

    /// Upper bound.
    pub fn upper(&self) -> u16 {
        self.upper
    }

    fn contains(&self, verse: &VerseEntity) -> bool {
        let value = match self.mode {
            RangeMode::Surah => verse.surah,
            RangeMode::Juz => u16::from(verse.juz),
        };
        (self.lower..=self.upper).contains(&value)
    }
}

/// Verses ordered by `(surah, ayah)`.
#[derive(Debug, Clone, Default)]
pub struct VerseCatalog {
    verses: Vec<VerseEntity>,
}

impl VerseCatalog {
    /// Build a catalog, sorting and de-duplicating by `(surah, ayah)`.
    pub fn new(mut verses: Vec<VerseEntity>) -> Self {
        verses.sort_by_key(|verse| (verse.surah, verse.ayah));
        verses.dedup_by_key(|verse| (verse.surah, verse.ayah));
        Self { verses }
    }

    /// Load a JSON array of verses.
    pub fn from_file(path: &Path) -> Result<Self, RangeError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| RangeError::Catalog(format!("{}: {err}", path.display())))?;
        let verses = serde_json::from_str::<Vec<VerseEntity>>(&raw)
            .map_err(|err| RangeError::Catalog(format!("{}: {err}", path.display())))?;
        Ok(Self::new(verses))
    }

    /// Number of verses.
    pub fn len(&self) -> usize {
        self.verses.len()
    }

    /// Whether the catalog holds no verse.
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    fn filtered(&self, range: &VerseRange) -> Vec<&VerseEntity> {
        self.verses
            .iter()
            .filter(|verse| range.contains(verse))
            .collect()
    }

    /// Uniformly pick a verse inside `range`.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        range: &VerseRange,
        rng: &mut R,
    ) -> Result<&VerseEntity, RangeError> {
        self.filtered(range)
            .choose(rng)
            .copied()
            .ok_or(RangeError::NoVerses)
    }

    /// Verse `offset` positions away from `(surah, ayah)` inside `range`.
    ///
    /// Moving past either end keeps the current verse.
    pub fn adjacent(
        &self,
        range: &VerseRange,
        surah: u16,
        ayah: u16,
        offset: i64,
    ) -> Result<&VerseEntity, RangeError> {
        let filtered = self.filtered(range);
        let current = filtered
            .iter()
            .position(|verse| verse.surah == surah && verse.ayah == ayah)
            .ok_or(RangeError::NotInRange { surah, ayah })?;

        let target = i64::try_from(current)
            .ok()
            .and_then(|index| index.checked_add(offset))
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < filtered.len())
            .unwrap_or(current);
        Ok(filtered[target])
    }
}

/// First `words` words of a verse; at least one word is always kept.
pub fn preview(text: &str, words: usize) -> String {
    text.split_whitespace()
        .take(words.max(1))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of words in a verse.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
