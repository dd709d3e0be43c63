use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::input::{InputAction, Key, View};

#[derive(Debug, Clone, Copy, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyDto {
    Enter,
    Space,
    Escape,
}

impl From<KeyDto> for Key {
    fn from(value: KeyDto) -> Self {
        match value {
            KeyDto::Enter => Key::Enter,
            KeyDto::Space => Key::Space,
            KeyDto::Escape => Key::Escape,
        }
    }
}

/// Key pressed on the screen of a live session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct KeyPressRequest {
    pub key: KeyDto,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewDto {
    Matching,
    Trivia,
}

impl From<View> for ViewDto {
    fn from(value: View) -> Self {
        match value {
            View::Matching => ViewDto::Matching,
            View::Trivia => ViewDto::Trivia,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputActionDto {
    Match,
    FlipClue,
    CloseClue,
}

impl From<InputAction> for InputActionDto {
    fn from(value: InputAction) -> Self {
        match value {
            InputAction::Match => InputActionDto::Match,
            InputAction::FlipClue => InputActionDto::FlipClue,
            InputAction::CloseClue => InputActionDto::CloseClue,
        }
    }
}

/// What a key press did.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InputOutcome {
    pub view: ViewDto,
    /// Bound action, absent when the key means nothing on this view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<InputActionDto>,
    /// False when the action was bound but rejected in the current state.
    pub handled: bool,
}
