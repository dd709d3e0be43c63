//! Trivia boards: setup from the hosted clue table or by hand, the flashcard
//! flow, team scores and saved games.
//!
//! Any operation on an id that is not live resumes the saved record first, so
//! a board can be picked up again just by revisiting its URL.

use std::{collections::BTreeMap, sync::Arc};

use dashmap::mapref::entry::Entry;
use indexmap::IndexSet;
use rand::rng;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::question_source::{Row, RowQuery},
    dto::trivia::{
        CategoriesResponse, CreateBoardRequest, CustomBoardRequest, SavedGameSummary,
        TriviaSnapshot,
    },
    error::ServiceError,
    state::{
        SharedState,
        deck::build_board,
        input::View,
        session::TriviaSession,
        trivia::{Board, Clue, TriviaGame},
    },
};

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn clue_from_row(row: &Row) -> Option<Clue> {
    let points = match row.get("points")? {
        Value::Number(points) => u32::try_from(points.as_u64()?).ok()?,
        Value::String(points) => points.trim().parse().ok()?,
        _ => return None,
    };
    Some(Clue {
        id: text(row.get("id")?)?,
        category: row.get("category")?.as_str()?.to_string(),
        points,
        question: row.get("question")?.as_str()?.to_string(),
        answer: row.get("answer")?.as_str()?.to_string(),
    })
}

fn snapshot(state: &SharedState, game: &TriviaGame) -> TriviaSnapshot {
    TriviaSnapshot::from_game(game, &state.config().trivia.tiers)
}

/// Best-effort progress write; the teardown autosave catches up on failure.
fn persist(state: &SharedState, game: &TriviaGame) {
    if let Err(err) = state.saves().save(game.id(), game.progress()) {
        warn!(game = %game.id(), error = %err, "failed to save trivia progress");
    }
}

fn mirror_asked(state: &SharedState, game: &TriviaGame) {
    if let Err(err) = state
        .saves()
        .save_asked(game.id(), &game.asked().asked_keys())
    {
        warn!(game = %game.id(), error = %err, "failed to mirror asked clues");
    }
}

/// Persist a new game and make it live.
fn open_new(state: &SharedState, game: TriviaGame) -> Result<TriviaSnapshot, ServiceError> {
    state.saves().create(&game.record())?;
    let id = game.id();
    let view = snapshot(state, &game);
    let session = TriviaSession::new(
        game,
        state.saves().clone(),
        state.input().subscribe(id, View::Trivia),
    );
    state.trivia().insert(id, Arc::new(Mutex::new(session)));
    Ok(view)
}

/// Live session for `id`, resumed from its saved record when needed.
fn live_or_resume(
    state: &SharedState,
    id: Uuid,
) -> Result<Arc<Mutex<TriviaSession>>, ServiceError> {
    match state.trivia().entry(id) {
        Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
        Entry::Vacant(entry) => {
            let record = state
                .saves()
                .load(id)
                .ok_or_else(|| ServiceError::NotFound(format!("trivia game `{id}` not found")))?;
            let mirrored = state.saves().load_asked(id);
            let game = TriviaGame::from_record(record, mirrored, state.config().trivia.score_floor);
            info!(
                game = %id,
                asked = game.asked().len(),
                "trivia game resumed"
            );
            let session = TriviaSession::new(
                game,
                state.saves().clone(),
                state.input().subscribe(id, View::Trivia),
            );
            Ok(Arc::clone(entry.insert(Arc::new(Mutex::new(session))).value()))
        }
    }
}

/// Distinct categories of the clue table, in table order.
pub async fn categories(state: &SharedState) -> Result<CategoriesResponse, ServiceError> {
    let table = state.config().trivia.table.as_str();
    let rows = state
        .source()
        .fetch(RowQuery::from(table).select(["category"]))
        .await?;
    let categories = rows
        .iter()
        .filter_map(|row| row.get("category").and_then(Value::as_str))
        .map(str::to_string)
        .collect::<IndexSet<_>>();
    Ok(CategoriesResponse {
        categories: categories.into_iter().collect(),
    })
}

/// Saved games, oldest first.
pub async fn list(state: &SharedState) -> Result<Vec<SavedGameSummary>, ServiceError> {
    Ok(state
        .saves()
        .list()?
        .into_iter()
        .map(SavedGameSummary::from)
        .collect())
}

/// Build a board with one random clue per cell from the hosted table.
pub async fn create(
    state: &SharedState,
    request: CreateBoardRequest,
) -> Result<TriviaSnapshot, ServiceError> {
    let config = &state.config().trivia;
    let categories = request
        .categories
        .iter()
        .map(|category| category.trim().to_string())
        .collect::<Vec<_>>();

    let mut clues = Vec::new();
    for category in &categories {
        let rows = state
            .source()
            .fetch(RowQuery::from(config.table.as_str()).eq("category", category.as_str()))
            .await?;
        let before = clues.len();
        clues.extend(rows.iter().filter_map(clue_from_row));
        if clues.len() - before < rows.len() {
            warn!(category = %category, "skipped malformed clue rows");
        }
    }

    let board = build_board(&categories, &config.tiers, &clues, &mut rng());
    let filled = board.values().map(BTreeMap::len).sum::<usize>();
    let game = TriviaGame::new(
        request.name.trim().to_string(),
        request.teams,
        categories,
        board,
        config.score_floor,
    );
    info!(game = %game.id(), name = game.name(), filled, "trivia board created");
    open_new(state, game)
}

/// Build a board from hand-authored clues; clues fill the point tiers in order.
pub async fn create_custom(
    state: &SharedState,
    request: CustomBoardRequest,
) -> Result<TriviaSnapshot, ServiceError> {
    let config = &state.config().trivia;
    let categories = request.category_names();

    let mut board = Board::new();
    for (category, input) in categories.iter().zip(&request.categories) {
        if input.clues.len() > config.tiers.len() {
            return Err(ServiceError::InvalidInput(format!(
                "category `{category}` has {} clues but the board has {} tiers",
                input.clues.len(),
                config.tiers.len()
            )));
        }
        let column = config
            .tiers
            .iter()
            .zip(&input.clues)
            .map(|(&points, clue)| {
                let clue = Clue {
                    id: Uuid::new_v4().to_string(),
                    category: category.clone(),
                    points,
                    question: clue.question.trim().to_string(),
                    answer: clue.answer.trim().to_string(),
                };
                (points, clue)
            })
            .collect();
        board.insert(category.clone(), column);
    }

    let game = TriviaGame::new(
        request.name.trim().to_string(),
        request.teams,
        categories,
        board,
        config.score_floor,
    );
    info!(game = %game.id(), name = game.name(), "custom trivia board created");
    open_new(state, game)
}

/// Open or resume a game.
pub async fn get(state: &SharedState, id: Uuid) -> Result<TriviaSnapshot, ServiceError> {
    let session = live_or_resume(state, id)?;
    let session = session.lock().await;
    Ok(snapshot(state, &session.game))
}

/// Rename the teams before the first clue is asked.
pub async fn rename_teams(
    state: &SharedState,
    id: Uuid,
    teams: Vec<String>,
) -> Result<TriviaSnapshot, ServiceError> {
    let session = live_or_resume(state, id)?;
    let mut session = session.lock().await;
    session.game.rename_teams(teams.clone())?;
    state.saves().update_teams(id, teams)?;
    persist(state, &session.game);
    debug!(game = %id, teams = session.game.teams().len(), "teams renamed");
    Ok(snapshot(state, &session.game))
}

/// Show the front of a clue.
pub async fn open_clue(
    state: &SharedState,
    id: Uuid,
    category: &str,
    points: u32,
) -> Result<TriviaSnapshot, ServiceError> {
    let session = live_or_resume(state, id)?;
    let mut session = session.lock().await;
    let key = session.game.open(category, points)?.key();
    debug!(game = %id, clue = %key, "clue opened");
    Ok(snapshot(state, &session.game))
}

/// Turn the open flashcard over.
pub async fn flip_clue(state: &SharedState, id: Uuid) -> Result<TriviaSnapshot, ServiceError> {
    let session = live_or_resume(state, id)?;
    let mut session = session.lock().await;
    let flipped = session.game.flip()?;
    debug!(game = %id, flipped, "clue flipped");
    Ok(snapshot(state, &session.game))
}

/// Close the flashcard; a clue whose answer was seen becomes asked.
pub async fn close_clue(state: &SharedState, id: Uuid) -> Result<TriviaSnapshot, ServiceError> {
    let session = live_or_resume(state, id)?;
    let mut session = session.lock().await;
    if session.game.close()? {
        mirror_asked(state, &session.game);
        persist(state, &session.game);
        debug!(game = %id, asked = session.game.asked().len(), "clue asked");
    }
    Ok(snapshot(state, &session.game))
}

/// Adjust a team score; `delta` defaults to the configured step.
pub async fn adjust_score(
    state: &SharedState,
    id: Uuid,
    team: usize,
    delta: Option<i32>,
) -> Result<TriviaSnapshot, ServiceError> {
    let delta = delta.unwrap_or(state.config().trivia.score_step);
    let session = live_or_resume(state, id)?;
    let mut session = session.lock().await;
    let score = session.game.adjust_score(team, delta)?;
    persist(state, &session.game);
    debug!(game = %id, team, delta, score, "score adjusted");
    Ok(snapshot(state, &session.game))
}

/// Leave the board. Dropping the live session autosaves it.
pub async fn leave(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    state
        .trivia()
        .remove(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("trivia game `{id}` is not open")))?;
    info!(game = %id, "left trivia game");
    Ok(())
}

/// Delete a saved game, closing it first when live.
pub async fn delete(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let was_live = state.trivia().remove(&id).is_some();
    let removed = state.saves().delete(id)?;
    if !removed && !was_live {
        return Err(ServiceError::NotFound(format!("trivia game `{id}` not found")));
    }
    info!(game = %id, "trivia game deleted");
    Ok(())
}
