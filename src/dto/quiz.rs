use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::state::{
    question::{LocationOption, QuestionBody, QuizQuestion, Response, Side, VerseOption},
    round::{RoundController, RoundPhase},
};

/// Options for a new drill session.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct StartQuizRequest {
    /// Lives for this session; the configured value is used when omitted.
    #[serde(default)]
    #[validate(range(min = 1, max = 10))]
    pub lives: Option<u32>,
}

/// How to restart a finished, lost or failed session.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RestartRequest {
    /// Fetch the question set again instead of reshuffling the loaded one.
    #[serde(default)]
    pub refetch: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SideDto {
    Before,
    After,
}

impl From<SideDto> for Side {
    fn from(value: SideDto) -> Self {
        match value {
            SideDto::Before => Side::Before,
            SideDto::After => Side::After,
        }
    }
}

/// One `(left, right)` pairing of a match question.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct PairDto {
    pub left: usize,
    pub right: usize,
}

/// Player response, shaped after the question kind.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerRequest {
    /// Option index for `which_surah`, `next_verse`, `fill_blank` and `location`.
    Choice { index: usize },
    /// Side for `before_after`.
    Side { side: SideDto },
    /// Pairings for `match_2x2`.
    Pairs { pairs: Vec<PairDto> },
    /// Column (0 or 1) per item for `sort_columns`, in item order.
    Drops { drops: Vec<u8> },
    /// Differing token positions for `spot_diff`.
    Hits { hits: Vec<usize> },
}

impl From<AnswerRequest> for Response {
    fn from(value: AnswerRequest) -> Self {
        match value {
            AnswerRequest::Choice { index } => Response::Choice(index),
            AnswerRequest::Side { side } => Response::Side(side.into()),
            AnswerRequest::Pairs { pairs } => {
                Response::Pairs(pairs.into_iter().map(|p| (p.left, p.right)).collect())
            }
            AnswerRequest::Drops { drops } => Response::Drops(drops),
            AnswerRequest::Hits { hits } => Response::Hits(hits),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerseOptionView {
    pub text: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl From<&VerseOption> for VerseOptionView {
    fn from(value: &VerseOption) -> Self {
        Self {
            text: value.text.clone(),
            reference: value.reference.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationOptionView {
    pub surah: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ayah: Option<String>,
}

impl From<&LocationOption> for LocationOptionView {
    fn from(value: &LocationOption) -> Self {
        Self {
            surah: value.surah.clone(),
            ayah: value.ayah.clone(),
        }
    }
}

/// Question as shown to the player. Expected answers are never included.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionContent {
    WhichSurah {
        prompt: String,
        options: Vec<String>,
    },
    NextVerse {
        verse: String,
        #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
        options: Vec<VerseOptionView>,
    },
    FillBlank {
        scaffold: String,
        blank_index: usize,
        options: Vec<String>,
    },
    BeforeAfter {
        anchor: String,
        token: String,
    },
    #[serde(rename = "match_2x2")]
    Match2x2 {
        prompt: String,
        left: Vec<String>,
        right: Vec<String>,
    },
    SortColumns {
        prompt: String,
        columns: Vec<String>,
        items: Vec<String>,
    },
    SpotDiff {
        prompt: String,
        a_tokens: Vec<String>,
        b_tokens: Vec<String>,
        /// How many positions differ.
        diff_count: usize,
    },
    Location {
        prompt: String,
        options: Vec<LocationOptionView>,
    },
}

impl From<&QuestionBody> for QuestionContent {
    fn from(body: &QuestionBody) -> Self {
        match body {
            QuestionBody::WhichSurah {
                prompt, options, ..
            } => QuestionContent::WhichSurah {
                prompt: prompt.clone(),
                options: options.clone(),
            },
            QuestionBody::NextVerse {
                verse,
                reference,
                options,
                ..
            } => QuestionContent::NextVerse {
                verse: verse.clone(),
                reference: reference.clone(),
                options: options.iter().map(Into::into).collect(),
            },
            QuestionBody::FillBlank {
                scaffold,
                blank_index,
                options,
                ..
            } => QuestionContent::FillBlank {
                scaffold: scaffold.clone(),
                blank_index: *blank_index,
                options: options.clone(),
            },
            QuestionBody::BeforeAfter { anchor, token, .. } => QuestionContent::BeforeAfter {
                anchor: anchor.clone(),
                token: token.clone(),
            },
            QuestionBody::Match2x2 {
                prompt,
                left,
                right,
                ..
            } => QuestionContent::Match2x2 {
                prompt: prompt.clone(),
                left: left.clone(),
                right: right.clone(),
            },
            QuestionBody::SortColumns {
                prompt,
                columns,
                items,
            } => QuestionContent::SortColumns {
                prompt: prompt.clone(),
                columns: columns.to_vec(),
                items: items.iter().map(|item| item.text.clone()).collect(),
            },
            QuestionBody::SpotDiff {
                prompt,
                a_tokens,
                b_tokens,
                diff_indices,
            } => QuestionContent::SpotDiff {
                prompt: prompt.clone(),
                a_tokens: a_tokens.clone(),
                b_tokens: b_tokens.clone(),
                diff_count: diff_indices.len(),
            },
            QuestionBody::Location {
                prompt, options, ..
            } => QuestionContent::Location {
                prompt: prompt.clone(),
                options: options.iter().map(Into::into).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    pub id: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i64>,
    pub content: QuestionContent,
}

impl From<&QuizQuestion> for QuestionView {
    fn from(question: &QuizQuestion) -> Self {
        Self {
            id: question.id.clone(),
            tags: question.tags.clone(),
            difficulty: question.difficulty,
            content: (&question.body).into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhaseDto {
    Loading,
    Ready,
    Transitioning,
    Finished,
    Lost,
    Error,
}

impl From<&RoundPhase> for QuizPhaseDto {
    fn from(value: &RoundPhase) -> Self {
        match value {
            RoundPhase::Loading => QuizPhaseDto::Loading,
            RoundPhase::Ready => QuizPhaseDto::Ready,
            RoundPhase::Transitioning => QuizPhaseDto::Transitioning,
            RoundPhase::Finished => QuizPhaseDto::Finished,
            RoundPhase::Lost => QuizPhaseDto::Lost,
            RoundPhase::Error { .. } => QuizPhaseDto::Error,
        }
    }
}

/// Full state of a drill session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizSnapshot {
    pub id: Uuid,
    pub phase: QuizPhaseDto,
    /// Error banner text, present in the `error` phase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub index: usize,
    pub total: usize,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lives: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    /// Ids of graded questions, newest first.
    pub asked: Vec<String>,
}

impl QuizSnapshot {
    pub fn from_round(id: Uuid, round: &RoundController<QuizQuestion>) -> Self {
        let message = match round.phase() {
            RoundPhase::Error { message } => Some(message.clone()),
            _ => None,
        };
        Self {
            id,
            phase: round.phase().into(),
            message,
            index: round.current_index(),
            total: round.total(),
            score: round.score(),
            lives: round.lives(),
            last_correct: round.last_correct(),
            question: round.current().map(Into::into),
            asked: round
                .asked()
                .history()
                .iter()
                .map(|question| question.id.clone())
                .collect(),
        }
    }
}

/// Outcome of a graded answer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub session: QuizSnapshot,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn answer_request_reads_tagged_shapes() {
        let pairs: AnswerRequest = serde_json::from_value(json!({
            "kind": "pairs",
            "pairs": [{"left": 0, "right": 1}, {"left": 1, "right": 0}]
        }))
        .unwrap();
        assert_eq!(Response::from(pairs), Response::Pairs(vec![(0, 1), (1, 0)]));

        let side: AnswerRequest =
            serde_json::from_value(json!({"kind": "side", "side": "after"})).unwrap();
        assert_eq!(Response::from(side), Response::Side(Side::After));
    }

    #[test]
    fn content_hides_expected_answers() {
        let body = QuestionBody::WhichSurah {
            prompt: "قل هو الله أحد".into(),
            options: vec!["Al-Ikhlas".into(), "An-Nas".into()],
            answer: 0,
        };
        let value = serde_json::to_value(QuestionContent::from(&body)).unwrap();
        assert_eq!(value["kind"], "which_surah");
        assert!(value.get("answer").is_none());

        let body = QuestionBody::Match2x2 {
            prompt: "Pair them".into(),
            left: vec!["a".into(), "b".into()],
            right: vec!["c".into(), "d".into()],
            pairs: vec![(0, 1), (1, 0)],
        };
        let value = serde_json::to_value(QuestionContent::from(&body)).unwrap();
        assert_eq!(value["kind"], "match_2x2");
        assert!(value.get("pairs").is_none());
    }
}
