use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::input::{InputOutcome, KeyPressRequest},
    error::AppError,
    services::input_service,
    state::SharedState,
};

/// Keyboard shortcuts for live sessions.
pub fn router() -> Router<SharedState> {
    Router::new().route("/sessions/{id}/input", post(press_key))
}

/// Deliver a key press to the session's current view.
#[utoipa::path(
    post,
    path = "/sessions/{id}/input",
    tag = "input",
    params(("id" = String, Path, description = "Live session identifier")),
    request_body = KeyPressRequest,
    responses(
        (status = 200, description = "Key delivered", body = InputOutcome),
        (status = 404, description = "No live session subscribed")
    )
)]
pub async fn press_key(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<KeyPressRequest>,
) -> Result<Json<InputOutcome>, AppError> {
    Ok(Json(input_service::press(&state, id, payload).await?))
}
