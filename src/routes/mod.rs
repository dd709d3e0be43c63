use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod input;
pub mod matching;
pub mod memo;
pub mod quiz;
pub mod trivia;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(matching::router())
        .merge(quiz::router())
        .merge(trivia::router())
        .merge(memo::router())
        .merge(input::router())
        .merge(docs::router());

    api_router.with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            kv_store::MemoryKeyValueStore, models::VerseEntity,
            question_source::MemoryQuestionSource,
        },
        state::{AppState, verse::VerseCatalog},
    };

    fn app() -> Router<()> {
        let verses = (1..=7)
            .map(|ayah| VerseEntity {
                surah: 1,
                ayah,
                juz: 1,
                text: format!("verse {ayah} of al-fatiha"),
                surah_name: Some("Al-Fatiha".into()),
            })
            .collect();
        let state = AppState::new(
            AppConfig::in_memory(),
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(MemoryQuestionSource::with_tables(["hifzbuddy", "triviabuddy"])),
            VerseCatalog::new(verses),
        );
        router(state)
    }

    async fn call(
        app: Router<()>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let (status, body) = call(app(), Method::GET, "/healthcheck", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["live_sessions"], 0);
    }

    #[tokio::test]
    async fn matching_round_starts_with_defaults() {
        let (status, body) = call(app(), Method::POST, "/matching/rounds", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "playing");
        assert_eq!(body["lives"], 3);
    }

    #[tokio::test]
    async fn matching_rejects_out_of_range_lives() {
        let (status, body) = call(
            app(),
            Method::POST,
            "/matching/rounds",
            Some(json!({ "lives": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn unknown_quiz_session_is_not_found() {
        let uri = format!("/quiz/sessions/{}", Uuid::new_v4());
        let (status, _) = call(app(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn verse_picker_serves_range() {
        let (status, body) = call(
            app(),
            Method::GET,
            "/memo/verse?mode=surah&start=1&end=1&preview_words=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["surah"], 1);
        assert_eq!(body["preview"], "verse 1");
    }

    #[tokio::test]
    async fn verse_picker_rejects_out_of_bounds_range() {
        let (status, _) = call(
            app(),
            Method::GET,
            "/memo/verse?mode=juz&start=0&end=31",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn trivia_board_needs_two_teams() {
        let (status, _) = call(
            app(),
            Method::POST,
            "/trivia/games",
            Some(json!({
                "name": "Friday night",
                "teams": ["Solo"],
                "categories": ["Prophets", "Seerah", "Fiqh"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn key_press_without_session_is_not_found() {
        let uri = format!("/sessions/{}/input", Uuid::new_v4());
        let (status, _) = call(app(), Method::POST, &uri, Some(json!({ "key": "enter" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = call(app(), Method::GET, docs::OPENAPI_PATH, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/trivia/games/{id}/clue/flip"].is_object());

        let (status, _) = call(app(), Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
    }
}
