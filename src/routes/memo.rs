use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::memo::{AdjacentQuery, VerseQuery, VerseResponse},
    error::AppError,
    services::verse_service,
    state::SharedState,
};

/// MemoBuddy random verse picker.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/memo/verse", get(random_verse))
        .route("/memo/verse/adjacent", get(adjacent_verse))
}

/// Pick a random verse within a surah or juz range.
#[utoipa::path(
    get,
    path = "/memo/verse",
    tag = "memo",
    params(VerseQuery),
    responses(
        (status = 200, description = "Verse picked", body = VerseResponse),
        (status = 400, description = "Range out of bounds"),
        (status = 404, description = "No verse in range")
    )
)]
pub async fn random_verse(
    State(state): State<SharedState>,
    Query(query): Query<VerseQuery>,
) -> Result<Json<VerseResponse>, AppError> {
    Ok(Json(verse_service::random_verse(&state, query)?))
}

/// Step to the previous or next verse of the range.
#[utoipa::path(
    get,
    path = "/memo/verse/adjacent",
    tag = "memo",
    params(AdjacentQuery),
    responses(
        (status = 200, description = "Neighbouring verse", body = VerseResponse),
        (status = 400, description = "Range out of bounds"),
        (status = 404, description = "Verse not in range")
    )
)]
pub async fn adjacent_verse(
    State(state): State<SharedState>,
    Query(query): Query<AdjacentQuery>,
) -> Result<Json<VerseResponse>, AppError> {
    Ok(Json(verse_service::adjacent_verse(&state, query)?))
}
