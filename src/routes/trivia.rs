use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        common::ActionResponse,
        trivia::{
            CategoriesResponse, CreateBoardRequest, CustomBoardRequest, OpenClueRequest,
            RenameTeamsRequest, SavedGameSummary, ScoreRequest, TriviaSnapshot,
        },
    },
    error::AppError,
    services::trivia_service,
    state::SharedState,
};

/// TriviaBuddy boards, flashcards and saved games.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/trivia/categories", get(list_categories))
        .route("/trivia/games", get(list_games).post(create_game))
        .route("/trivia/games/custom", post(create_custom_game))
        .route("/trivia/games/{id}", get(get_game).delete(delete_game))
        .route("/trivia/games/{id}/teams", put(rename_teams))
        .route("/trivia/games/{id}/clue/open", post(open_clue))
        .route("/trivia/games/{id}/clue/flip", post(flip_clue))
        .route("/trivia/games/{id}/clue/close", post(close_clue))
        .route("/trivia/games/{id}/score", post(adjust_score))
        .route("/trivia/games/{id}/leave", post(leave_game))
}

/// Categories available in the clue table.
#[utoipa::path(
    get,
    path = "/trivia/categories",
    tag = "trivia",
    responses(
        (status = 200, description = "Distinct categories", body = CategoriesResponse),
        (status = 502, description = "Clue table unreachable")
    )
)]
pub async fn list_categories(
    State(state): State<SharedState>,
) -> Result<Json<CategoriesResponse>, AppError> {
    Ok(Json(trivia_service::categories(&state).await?))
}

/// Saved games, oldest first.
#[utoipa::path(
    get,
    path = "/trivia/games",
    tag = "trivia",
    responses((status = 200, description = "Saved games", body = [SavedGameSummary]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SavedGameSummary>>, AppError> {
    Ok(Json(trivia_service::list(&state).await?))
}

/// Build a board from the clue table.
#[utoipa::path(
    post,
    path = "/trivia/games",
    tag = "trivia",
    request_body = CreateBoardRequest,
    responses(
        (status = 200, description = "Board created", body = TriviaSnapshot),
        (status = 400, description = "Invalid setup")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateBoardRequest>,
) -> Result<Json<TriviaSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(trivia_service::create(&state, payload).await?))
}

/// Build a board from hand-authored clues.
#[utoipa::path(
    post,
    path = "/trivia/games/custom",
    tag = "trivia",
    request_body = CustomBoardRequest,
    responses(
        (status = 200, description = "Board created", body = TriviaSnapshot),
        (status = 400, description = "Invalid setup")
    )
)]
pub async fn create_custom_game(
    State(state): State<SharedState>,
    Json(payload): Json<CustomBoardRequest>,
) -> Result<Json<TriviaSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(trivia_service::create_custom(&state, payload).await?))
}

/// Open a board, resuming it from its save when it is not live.
#[utoipa::path(
    get,
    path = "/trivia/games/{id}",
    tag = "trivia",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Board", body = TriviaSnapshot),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TriviaSnapshot>, AppError> {
    Ok(Json(trivia_service::get(&state, id).await?))
}

/// Rename the teams before the first clue.
#[utoipa::path(
    put,
    path = "/trivia/games/{id}/teams",
    tag = "trivia",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = RenameTeamsRequest,
    responses(
        (status = 200, description = "Teams renamed", body = TriviaSnapshot),
        (status = 409, description = "Game already started")
    )
)]
pub async fn rename_teams(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenameTeamsRequest>,
) -> Result<Json<TriviaSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(
        trivia_service::rename_teams(&state, id, payload.teams).await?,
    ))
}

/// Show the front of a clue.
#[utoipa::path(
    post,
    path = "/trivia/games/{id}/clue/open",
    tag = "trivia",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = OpenClueRequest,
    responses(
        (status = 200, description = "Clue opened", body = TriviaSnapshot),
        (status = 404, description = "No clue in this cell"),
        (status = 409, description = "Clue already asked or another clue open")
    )
)]
pub async fn open_clue(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OpenClueRequest>,
) -> Result<Json<TriviaSnapshot>, AppError> {
    Ok(Json(
        trivia_service::open_clue(&state, id, &payload.category, payload.points).await?,
    ))
}

/// Turn the open flashcard over.
#[utoipa::path(
    post,
    path = "/trivia/games/{id}/clue/flip",
    tag = "trivia",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Clue flipped", body = TriviaSnapshot),
        (status = 409, description = "No clue open")
    )
)]
pub async fn flip_clue(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TriviaSnapshot>, AppError> {
    Ok(Json(trivia_service::flip_clue(&state, id).await?))
}

/// Close the flashcard, recording the clue when its answer was shown.
#[utoipa::path(
    post,
    path = "/trivia/games/{id}/clue/close",
    tag = "trivia",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Clue closed", body = TriviaSnapshot),
        (status = 409, description = "No clue open")
    )
)]
pub async fn close_clue(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TriviaSnapshot>, AppError> {
    Ok(Json(trivia_service::close_clue(&state, id).await?))
}

/// Add or remove points for a team.
#[utoipa::path(
    post,
    path = "/trivia/games/{id}/score",
    tag = "trivia",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = ScoreRequest,
    responses(
        (status = 200, description = "Score updated", body = TriviaSnapshot),
        (status = 400, description = "Unknown team")
    )
)]
pub async fn adjust_score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<TriviaSnapshot>, AppError> {
    Ok(Json(
        trivia_service::adjust_score(&state, id, payload.team, payload.delta).await?,
    ))
}

/// Leave the board; its progress is saved on the way out.
#[utoipa::path(
    post,
    path = "/trivia/games/{id}/leave",
    tag = "trivia",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game left", body = ActionResponse),
        (status = 404, description = "Game not open")
    )
)]
pub async fn leave_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    trivia_service::leave(&state, id).await?;
    Ok(Json(ActionResponse::new(id, "game saved")))
}

/// Delete a saved game.
#[utoipa::path(
    delete,
    path = "/trivia/games/{id}",
    tag = "trivia",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    trivia_service::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
