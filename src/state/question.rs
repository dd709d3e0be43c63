//! Drill questions decoded from loosely-typed rows.
//!
//! Rows carry a `qtype` discriminant plus `prompt`, `payload` and `answer`
//! columns that may hold JSON encoded as text. Decoding happens once at the
//! boundary; everything downstream works on [`QuestionBody`].

use std::collections::BTreeSet;

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
    dao::question_source::{Row, safe_parse},
    state::progress::Tracked,
};

/// Columns read from the question table.
pub const QUESTION_COLUMNS: [&str; 8] = [
    "id",
    "qtype",
    "prompt",
    "payload",
    "answer",
    "tags",
    "difficulty",
    "active",
];

/// Which side of the anchor a token sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Token precedes the anchor.
    Before,
    /// Token follows the anchor.
    After,
}

/// Option of a next-verse question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerseOption {
    /// Verse text.
    pub text: String,
    /// Optional reference such as `2:255`.
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
}

/// Option of a location question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocationOption {
    /// Surah name.
    pub surah: String,
    /// Optional ayah label.
    #[serde(default)]
    pub ayah: Option<String>,
}

/// Item to drop into one of two columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortItem {
    /// Item text.
    pub text: String,
    /// Expected column (0 or 1).
    pub col: u8,
}

/// Kind-specific content of a question, including its expected answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionBody {
    /// Identify the surah of a verse.
    WhichSurah {
        /// Verse shown to the player.
        prompt: String,
        /// Candidate surahs.
        options: Vec<String>,
        /// Index of the right option.
        answer: usize,
    },
    /// Pick the verse that follows.
    NextVerse {
        /// Verse shown to the player.
        verse: String,
        /// Reference of the shown verse.
        reference: Option<String>,
        /// Candidate verses.
        options: Vec<VerseOption>,
        /// Index of the right option.
        answer: usize,
    },
    /// Complete the missing word.
    FillBlank {
        /// Verse with a gap.
        scaffold: String,
        /// Word position of the gap.
        blank_index: usize,
        /// Candidate words.
        options: Vec<String>,
        /// Index of the right option.
        answer: usize,
    },
    /// Decide whether a token comes before or after an anchor.
    BeforeAfter {
        /// Reference passage.
        anchor: String,
        /// Token to place.
        token: String,
        /// Expected side.
        answer: Side,
    },
    /// Pair two columns of two items.
    Match2x2 {
        /// Instructions.
        prompt: String,
        /// Left column.
        left: Vec<String>,
        /// Right column.
        right: Vec<String>,
        /// Expected `(left, right)` pairs.
        pairs: Vec<(usize, usize)>,
    },
    /// Sort items into two labelled columns.
    SortColumns {
        /// Instructions.
        prompt: String,
        /// Column labels.
        columns: [String; 2],
        /// Items with their expected column.
        items: Vec<SortItem>,
    },
    /// Find the tokens that differ between two versions.
    SpotDiff {
        /// Instructions.
        prompt: String,
        /// Tokens of the reference version.
        a_tokens: Vec<String>,
        /// Tokens of the altered version.
        b_tokens: Vec<String>,
        /// Positions that differ.
        diff_indices: BTreeSet<usize>,
    },
    /// Locate a verse.
    Location {
        /// Verse shown to the player.
        prompt: String,
        /// Candidate locations.
        options: Vec<LocationOption>,
        /// Index of the right option.
        answer: usize,
    },
}

impl QuestionBody {
    /// `qtype` discriminant as stored in the table.
    pub fn kind(&self) -> &'static str {
        match self {
            QuestionBody::WhichSurah { .. } => "which_surah",
            QuestionBody::NextVerse { .. } => "next_verse",
            QuestionBody::FillBlank { .. } => "fill_blank",
            QuestionBody::BeforeAfter { .. } => "before_after",
            QuestionBody::Match2x2 { .. } => "match_2x2",
            QuestionBody::SortColumns { .. } => "sort_columns",
            QuestionBody::SpotDiff { .. } => "spot_diff",
            QuestionBody::Location { .. } => "location",
        }
    }
}

/// Player response to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Chosen option index (multiple-choice kinds).
    Choice(usize),
    /// Chosen side.
    Side(Side),
    /// Chosen `(left, right)` pairs.
    Pairs(Vec<(usize, usize)>),
    /// Column chosen for every item, in item order.
    Drops(Vec<u8>),
    /// Token positions flagged as different.
    Hits(Vec<usize>),
}

/// Reasons a response cannot be graded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    /// The response shape does not fit the question kind.
    #[error("a {kind} question cannot be answered with this response")]
    WrongShape {
        /// Question kind.
        kind: &'static str,
    },
    /// Not every item was placed in a column.
    #[error("expected {expected} drops, got {got}")]
    Incomplete {
        /// Number of items.
        expected: usize,
        /// Number of drops received.
        got: usize,
    },
}

/// Row that could not be turned into a question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("question `{id}` is malformed: {reason}")]
pub struct DecodeError {
    /// Row id, or `?` when missing.
    pub id: String,
    /// What was wrong.
    pub reason: String,
}

/// A decoded drill question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    /// Row id.
    pub id: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Difficulty used for ordering.
    pub difficulty: Option<i64>,
    /// Kind-specific content.
    pub body: QuestionBody,
}

impl Tracked for QuizQuestion {
    fn identity(&self) -> String {
        self.id.clone()
    }
}

#[derive(Deserialize)]
struct Options<T> {
    options: Vec<T>,
}

#[derive(Deserialize)]
struct IndexAnswer {
    index: usize,
}

#[derive(Deserialize)]
struct SideAnswer {
    side: Side,
}

#[derive(Deserialize)]
struct NextVersePrompt {
    verse: String,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
}

#[derive(Deserialize)]
struct FillBlankPrompt {
    scaffold: String,
    #[serde(rename = "blankIndex")]
    blank_index: usize,
}

#[derive(Deserialize)]
struct BeforeAfterPrompt {
    anchor: String,
    token: String,
}

#[derive(Deserialize)]
struct MatchPayload {
    left: Vec<String>,
    right: Vec<String>,
}

#[derive(Deserialize)]
struct PairsAnswer {
    pairs: Vec<(usize, usize)>,
}

#[derive(Deserialize)]
struct SortPayload {
    columns: [String; 2],
    items: Vec<SortItem>,
}

#[derive(Deserialize)]
struct SpotPayload {
    #[serde(rename = "A_tokens")]
    a_tokens: Vec<String>,
    #[serde(rename = "B_tokens")]
    b_tokens: Vec<String>,
}

#[derive(Deserialize)]
struct SpotAnswer {
    #[serde(rename = "diffIndices")]
    diff_indices: Vec<usize>,
}

struct Columns {
    id: String,
    prompt: Value,
    payload: Value,
    answer: Value,
}

impl Columns {
    fn error(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }

    fn decode<T: DeserializeOwned>(&self, column: &str, value: &Value) -> Result<T, DecodeError> {
        serde_json::from_value(value.clone())
            .map_err(|err| self.error(format!("invalid `{column}`: {err}")))
    }

    fn payload<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        self.decode("payload", &self.payload)
    }

    fn answer<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        self.decode("answer", &self.answer)
    }

    fn index_answer(&self, options: usize) -> Result<usize, DecodeError> {
        let IndexAnswer { index } = self.answer()?;
        if index >= options {
            return Err(self.error(format!("answer index {index} out of {options} options")));
        }
        Ok(index)
    }

    fn text_prompt(&self) -> String {
        text_of(&self.prompt)
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl QuizQuestion {
    /// Decode a row of the question table.
    pub fn from_row(mut row: Row) -> Result<Self, DecodeError> {
        let id = row.get("id").map(text_of).unwrap_or_else(|| "?".to_string());
        let qtype = row
            .get("qtype")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DecodeError {
                id: id.clone(),
                reason: "missing `qtype`".into(),
            })?;

        let mut take = |column: &str| row.remove(column).map(safe_parse).unwrap_or(Value::Null);
        let tags = match take("tags") {
            Value::Array(values) => values.iter().map(text_of).collect(),
            _ => Vec::new(),
        };
        let difficulty = take("difficulty").as_i64();
        let columns = Columns {
            id: id.clone(),
            prompt: take("prompt"),
            payload: take("payload"),
            answer: take("answer"),
        };

        let body = match qtype.as_str() {
            "which_surah" => {
                let Options { options } = columns.payload::<Options<String>>()?;
                QuestionBody::WhichSurah {
                    prompt: columns.text_prompt(),
                    answer: columns.index_answer(options.len())?,
                    options,
                }
            }
            "next_verse" => {
                let NextVersePrompt { verse, reference } = match &columns.prompt {
                    Value::Object(_) => columns.decode("prompt", &columns.prompt)?,
                    other => NextVersePrompt {
                        verse: text_of(other),
                        reference: None,
                    },
                };
                let Options { options } = columns.payload::<Options<VerseOption>>()?;
                QuestionBody::NextVerse {
                    verse,
                    reference,
                    answer: columns.index_answer(options.len())?,
                    options,
                }
            }
            "fill_blank" => {
                let FillBlankPrompt {
                    scaffold,
                    blank_index,
                } = match &columns.prompt {
                    Value::Object(_) => columns.decode("prompt", &columns.prompt)?,
                    other => FillBlankPrompt {
                        scaffold: text_of(other),
                        blank_index: 0,
                    },
                };
                let Options { options } = columns.payload::<Options<String>>()?;
                QuestionBody::FillBlank {
                    scaffold,
                    blank_index,
                    answer: columns.index_answer(options.len())?,
                    options,
                }
            }
            "before_after" => {
                let BeforeAfterPrompt { anchor, token } = match &columns.prompt {
                    Value::Object(_) => columns.decode("prompt", &columns.prompt)?,
                    other => BeforeAfterPrompt {
                        anchor: text_of(other),
                        token: String::new(),
                    },
                };
                let SideAnswer { side } = columns.answer()?;
                QuestionBody::BeforeAfter {
                    anchor,
                    token,
                    answer: side,
                }
            }
            "match_2x2" => {
                let MatchPayload { left, right } = columns.payload()?;
                let PairsAnswer { pairs } = columns.answer()?;
                if pairs.iter().any(|&(l, r)| l >= left.len() || r >= right.len()) {
                    return Err(columns.error("answer pair out of range"));
                }
                QuestionBody::Match2x2 {
                    prompt: columns.text_prompt(),
                    left,
                    right,
                    pairs,
                }
            }
            "sort_columns" => {
                let SortPayload { columns: labels, items } = columns.payload()?;
                if items.iter().any(|item| item.col > 1) {
                    return Err(columns.error("item column must be 0 or 1"));
                }
                QuestionBody::SortColumns {
                    prompt: columns.text_prompt(),
                    columns: labels,
                    items,
                }
            }
            "spot_diff" => {
                let SpotPayload { a_tokens, b_tokens } = columns.payload()?;
                let SpotAnswer { diff_indices } = columns.answer()?;
                QuestionBody::SpotDiff {
                    prompt: columns.text_prompt(),
                    a_tokens,
                    b_tokens,
                    diff_indices: diff_indices.into_iter().collect(),
                }
            }
            "location" => {
                let Options { options } = columns.payload::<Options<LocationOption>>()?;
                QuestionBody::Location {
                    prompt: columns.text_prompt(),
                    answer: columns.index_answer(options.len())?,
                    options,
                }
            }
            other => return Err(columns.error(format!("unknown qtype `{other}`"))),
        };

        Ok(Self {
            id,
            tags,
            difficulty,
            body,
        })
    }

    /// Grade a player response.
    pub fn grade(&self, response: &Response) -> Result<bool, GradeError> {
        let kind = self.body.kind();
        match (&self.body, response) {
            (
                QuestionBody::WhichSurah { answer, .. }
                | QuestionBody::NextVerse { answer, .. }
                | QuestionBody::FillBlank { answer, .. }
                | QuestionBody::Location { answer, .. },
                Response::Choice(index),
            ) => Ok(index == answer),
            (QuestionBody::BeforeAfter { answer, .. }, Response::Side(side)) => Ok(side == answer),
            (QuestionBody::Match2x2 { pairs, .. }, Response::Pairs(chosen)) => {
                let mut expected = pairs.clone();
                let mut chosen = chosen.clone();
                expected.sort_unstable();
                chosen.sort_unstable();
                Ok(expected == chosen)
            }
            (QuestionBody::SortColumns { items, .. }, Response::Drops(drops)) => {
                if drops.len() != items.len() {
                    return Err(GradeError::Incomplete {
                        expected: items.len(),
                        got: drops.len(),
                    });
                }
                Ok(items.iter().zip(drops).all(|(item, drop)| item.col == *drop))
            }
            (QuestionBody::SpotDiff { diff_indices, .. }, Response::Hits(hits)) => {
                Ok(hits.iter().copied().collect::<BTreeSet<_>>() == *diff_indices)
            }
            _ => Err(GradeError::WrongShape { kind }),
        }
    }
}
