use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::state::{
    deck::Lang,
    matching::{Feedback, MatchingRound, RoundStatus},
};

/// Options for a new matching round. Omitted fields use the configured defaults.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct StartMatchingRequest {
    #[serde(default)]
    #[validate(range(min = 1, max = 30))]
    pub pairs: Option<usize>,
    #[serde(default)]
    #[validate(range(min = 1, max = 10))]
    pub lives: Option<u32>,
}

/// Card to toggle.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectCardRequest {
    pub card_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LaneDto {
    Ar,
    En,
}

impl From<Lang> for LaneDto {
    fn from(value: Lang) -> Self {
        match value {
            Lang::Ar => LaneDto::Ar,
            Lang::En => LaneDto::En,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatusDto {
    Playing,
    Won,
    Lost,
}

impl From<RoundStatus> for RoundStatusDto {
    fn from(value: RoundStatus) -> Self {
        match value {
            RoundStatus::Playing => RoundStatusDto::Playing,
            RoundStatus::Won => RoundStatusDto::Won,
            RoundStatus::Lost => RoundStatusDto::Lost,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackDto {
    Correct,
    Wrong,
}

impl From<Feedback> for FeedbackDto {
    fn from(value: Feedback) -> Self {
        match value {
            Feedback::Correct => FeedbackDto::Correct,
            Feedback::Wrong => FeedbackDto::Wrong,
        }
    }
}

/// Card as rendered by clients. The pairing key stays server-side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardView {
    pub id: String,
    pub lane: LaneDto,
    pub label: String,
    pub matched: bool,
    pub selected: bool,
}

/// Full state of a matching round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchingSnapshot {
    pub id: Uuid,
    pub status: RoundStatusDto,
    /// Present while the correct/wrong flash is showing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackDto>,
    pub lives: u32,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub remaining_pairs: usize,
    /// Arabic lane first, then English.
    pub cards: Vec<CardView>,
}

impl MatchingSnapshot {
    pub fn from_round(id: Uuid, round: &MatchingRound) -> Self {
        let selected = [round.selected(Lang::Ar), round.selected(Lang::En)];
        Self {
            id,
            status: round.status().into(),
            feedback: round.feedback().map(Into::into),
            lives: round.lives(),
            score: round.score(),
            streak: round.streak(),
            best_streak: round.best_streak(),
            remaining_pairs: round.remaining_pairs(),
            cards: round
                .cards()
                .iter()
                .map(|card| CardView {
                    id: card.id.clone(),
                    lane: card.lang.into(),
                    label: card.label.clone(),
                    matched: card.matched,
                    selected: selected.contains(&Some(card.id.as_str())),
                })
                .collect(),
        }
    }
}
