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
        matching::{MatchingSnapshot, SelectCardRequest, StartMatchingRequest},
    },
    error::AppError,
    services::matching_service,
    state::SharedState,
};

/// AraBuddy word matching rounds.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matching/rounds", post(start_round))
        .route("/matching/rounds/{id}", get(get_round).delete(delete_round))
        .route("/matching/rounds/{id}/select", post(select_card))
        .route("/matching/rounds/{id}/match", post(evaluate))
        .route("/matching/rounds/{id}/new-round", post(new_round))
}

/// Build a deck and start a round.
#[utoipa::path(
    post,
    path = "/matching/rounds",
    tag = "matching",
    request_body = StartMatchingRequest,
    responses(
        (status = 200, description = "Round started", body = MatchingSnapshot),
        (status = 400, description = "Invalid options")
    )
)]
pub async fn start_round(
    State(state): State<SharedState>,
    Json(payload): Json<StartMatchingRequest>,
) -> Result<Json<MatchingSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(matching_service::start(&state, payload).await?))
}

/// Current state of a round.
#[utoipa::path(
    get,
    path = "/matching/rounds/{id}",
    tag = "matching",
    params(("id" = String, Path, description = "Round identifier")),
    responses(
        (status = 200, description = "Round", body = MatchingSnapshot),
        (status = 404, description = "Unknown round")
    )
)]
pub async fn get_round(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchingSnapshot>, AppError> {
    Ok(Json(matching_service::get(&state, id).await?))
}

/// Toggle the selection of a card in its lane.
#[utoipa::path(
    post,
    path = "/matching/rounds/{id}/select",
    tag = "matching",
    params(("id" = String, Path, description = "Round identifier")),
    request_body = SelectCardRequest,
    responses(
        (status = 200, description = "Selection updated", body = MatchingSnapshot),
        (status = 400, description = "Unknown card"),
        (status = 409, description = "Card matched or round over")
    )
)]
pub async fn select_card(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectCardRequest>,
) -> Result<Json<MatchingSnapshot>, AppError> {
    Ok(Json(
        matching_service::select(&state, id, payload.card_id).await?,
    ))
}

/// Evaluate the current pair of selections.
#[utoipa::path(
    post,
    path = "/matching/rounds/{id}/match",
    tag = "matching",
    params(("id" = String, Path, description = "Round identifier")),
    responses(
        (status = 200, description = "Selection evaluated", body = MatchingSnapshot),
        (status = 409, description = "Round over")
    )
)]
pub async fn evaluate(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchingSnapshot>, AppError> {
    Ok(Json(matching_service::evaluate(&state, id).await?))
}

/// Rebuild the deck and reset lives and score.
#[utoipa::path(
    post,
    path = "/matching/rounds/{id}/new-round",
    tag = "matching",
    params(("id" = String, Path, description = "Round identifier")),
    responses((status = 200, description = "Round rebuilt", body = MatchingSnapshot))
)]
pub async fn new_round(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchingSnapshot>, AppError> {
    Ok(Json(matching_service::new_round(&state, id).await?))
}

/// Tear a round down.
#[utoipa::path(
    delete,
    path = "/matching/rounds/{id}",
    tag = "matching",
    params(("id" = String, Path, description = "Round identifier")),
    responses((status = 200, description = "Round closed", body = ActionResponse))
)]
pub async fn delete_round(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    matching_service::delete(&state, id).await?;
    Ok(Json(ActionResponse::new(id, "round closed")))
}
