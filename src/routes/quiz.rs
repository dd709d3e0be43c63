use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        common::ActionResponse,
        quiz::{AnswerOutcome, AnswerRequest, QuizSnapshot, RestartRequest, StartQuizRequest},
    },
    error::AppError,
    services::quiz_service,
    state::SharedState,
};

/// HifzBuddy verse drill sessions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quiz/sessions", post(create_session))
        .route("/quiz/sessions/{id}", get(get_session).delete(delete_session))
        .route("/quiz/sessions/{id}/answer", post(answer))
        .route("/quiz/sessions/{id}/restart", post(restart))
}

/// Create a session; questions load in the background.
#[utoipa::path(
    post,
    path = "/quiz/sessions",
    tag = "quiz",
    request_body = StartQuizRequest,
    responses((status = 200, description = "Session loading", body = QuizSnapshot))
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<StartQuizRequest>,
) -> Result<Json<QuizSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(quiz_service::create(&state, payload).await?))
}

/// Current state of a session.
#[utoipa::path(
    get,
    path = "/quiz/sessions/{id}",
    tag = "quiz",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session", body = QuizSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizSnapshot>, AppError> {
    Ok(Json(quiz_service::get(&state, id).await?))
}

/// Grade a response to the current question.
#[utoipa::path(
    post,
    path = "/quiz/sessions/{id}/answer",
    tag = "quiz",
    params(("id" = String, Path, description = "Session identifier")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer graded", body = AnswerOutcome),
        (status = 400, description = "Response does not fit the question"),
        (status = 409, description = "Session not ready")
    )
)]
pub async fn answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerOutcome>, AppError> {
    Ok(Json(quiz_service::answer(&state, id, payload).await?))
}

/// Retry after an error, or play again.
#[utoipa::path(
    post,
    path = "/quiz/sessions/{id}/restart",
    tag = "quiz",
    params(("id" = String, Path, description = "Session identifier")),
    request_body = RestartRequest,
    responses(
        (status = 200, description = "Session restarted", body = QuizSnapshot),
        (status = 409, description = "Session still loading")
    )
)]
pub async fn restart(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestartRequest>,
) -> Result<Json<QuizSnapshot>, AppError> {
    Ok(Json(quiz_service::restart(&state, id, payload).await?))
}

/// Tear a session down.
#[utoipa::path(
    delete,
    path = "/quiz/sessions/{id}",
    tag = "quiz",
    params(("id" = String, Path, description = "Session identifier")),
    responses((status = 200, description = "Session closed", body = ActionResponse))
)]
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    quiz_service::delete(&state, id).await?;
    Ok(Json(ActionResponse::new(id, "session closed")))
}
