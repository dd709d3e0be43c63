use tracing::debug;
use uuid::Uuid;

use crate::{
    dto::input::{InputOutcome, KeyPressRequest},
    error::ServiceError,
    services::{matching_service, trivia_service},
    state::{SharedState, input::InputAction},
};

/// Route a key press to the view the session is subscribed with.
///
/// Keys without a binding and actions rejected in the current state are
/// reported as unhandled rather than as errors.
pub async fn press(
    state: &SharedState,
    id: Uuid,
    request: KeyPressRequest,
) -> Result<InputOutcome, ServiceError> {
    let key = request.key.into();
    let (view, action) = state.input().resolve(id, key).ok_or_else(|| {
        ServiceError::NotFound(format!("no live session `{id}` accepts key presses"))
    })?;

    let result = match action {
        None => {
            return Ok(InputOutcome {
                view: view.into(),
                action: None,
                handled: false,
            });
        }
        Some(InputAction::Match) => matching_service::evaluate(state, id).await.map(drop),
        Some(InputAction::FlipClue) => trivia_service::flip_clue(state, id).await.map(drop),
        Some(InputAction::CloseClue) => trivia_service::close_clue(state, id).await.map(drop),
    };

    let handled = match result {
        Ok(()) => true,
        Err(ServiceError::InvalidState(reason)) => {
            debug!(session = %id, ?key, reason = %reason, "key press ignored");
            false
        }
        Err(err) => return Err(err),
    };

    Ok(InputOutcome {
        view: view.into(),
        action: action.map(Into::into),
        handled,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{kv_store::MemoryKeyValueStore, question_source::MemoryQuestionSource},
        dto::{
            input::{InputActionDto, KeyDto, ViewDto},
            matching::StartMatchingRequest,
            trivia::CustomBoardRequest,
        },
        state::{AppState, verse::VerseCatalog},
    };

    fn app() -> SharedState {
        AppState::new(
            AppConfig::in_memory(),
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(MemoryQuestionSource::new()),
            VerseCatalog::default(),
        )
    }

    fn press_key(key: KeyDto) -> KeyPressRequest {
        KeyPressRequest { key }
    }

    #[tokio::test]
    async fn enter_evaluates_a_matching_round() {
        let state = app();
        let round = matching_service::start(&state, StartMatchingRequest::default())
            .await
            .unwrap();

        let outcome = press(&state, round.id, press_key(KeyDto::Enter)).await.unwrap();
        assert_eq!(outcome.view, ViewDto::Matching);
        assert_eq!(outcome.action, Some(InputActionDto::Match));
        assert!(outcome.handled);

        let outcome = press(&state, round.id, press_key(KeyDto::Space)).await.unwrap();
        assert!(outcome.action.is_none());
        assert!(!outcome.handled);
    }

    #[tokio::test]
    async fn trivia_keys_drive_the_flashcard() {
        let state = app();
        let request: CustomBoardRequest = serde_json::from_value(serde_json::json!({
            "name": "Keys",
            "teams": ["A", "B"],
            "categories": [
                {"name": "One", "clues": [{"question": "q", "answer": "a"}]},
                {"name": "Two", "clues": [{"question": "q", "answer": "a"}]},
                {"name": "Three", "clues": [{"question": "q", "answer": "a"}]}
            ]
        }))
        .unwrap();
        let board = trivia_service::create_custom(&state, request).await.unwrap();

        let idle = press(&state, board.id, press_key(KeyDto::Space)).await.unwrap();
        assert!(!idle.handled);

        trivia_service::open_clue(&state, board.id, "Two", 100)
            .await
            .unwrap();
        assert!(press(&state, board.id, press_key(KeyDto::Space)).await.unwrap().handled);
        assert!(press(&state, board.id, press_key(KeyDto::Escape)).await.unwrap().handled);

        let snapshot = trivia_service::get(&state, board.id).await.unwrap();
        assert!(snapshot.open_clue.is_none());
        assert_eq!(snapshot.history.len(), 1);
    }

    #[tokio::test]
    async fn torn_down_sessions_receive_nothing() {
        let state = app();
        let round = matching_service::start(&state, StartMatchingRequest::default())
            .await
            .unwrap();
        matching_service::delete(&state, round.id).await.unwrap();

        let err = press(&state, round.id, press_key(KeyDto::Enter)).await;
        assert!(matches!(err, Err(ServiceError::NotFound(_))));
    }
}
