//! Word matching rounds: deck building, selection, evaluation and feedback timers.

use std::sync::Arc;

use rand::rng;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{models::VocabPairEntity, question_source::{Row, RowQuery}},
    dto::matching::{MatchingSnapshot, StartMatchingRequest},
    error::ServiceError,
    services::timers,
    state::{
        Delayed, SharedState,
        deck::build_matching_deck,
        input::View,
        matching::{MatchingEvent, MatchingRound},
        session::MatchingSession,
    },
};

/// Built-in vocabulary used when no table is configured.
const STARTER_VOCAB: [(&str, &str, &str); 6] = [
    ("1", "Mercy", "رحمة"),
    ("2", "Guidance", "هدى"),
    ("3", "Light", "نور"),
    ("4", "Knowledge", "علم"),
    ("5", "Patience", "صبر"),
    ("6", "Truth", "حق"),
];

fn starter_vocab() -> Vec<VocabPairEntity> {
    STARTER_VOCAB
        .iter()
        .map(|(id, en, ar)| VocabPairEntity {
            id: (*id).to_string(),
            en: (*en).to_string(),
            ar: (*ar).to_string(),
        })
        .collect()
}

fn pair_from_row(row: &Row) -> Option<VocabPairEntity> {
    let id = match row.get("id")? {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };
    Some(VocabPairEntity {
        id,
        en: row.get("en")?.as_str()?.to_string(),
        ar: row.get("ar")?.as_str()?.to_string(),
    })
}

async fn vocabulary(state: &SharedState) -> Result<Vec<VocabPairEntity>, ServiceError> {
    let Some(table) = state.config().matching.table.clone() else {
        return Ok(starter_vocab());
    };
    let rows = state
        .source()
        .fetch(RowQuery::from(table.as_str()).select(["id", "en", "ar"]))
        .await?;
    let pairs = rows.iter().filter_map(pair_from_row).collect::<Vec<_>>();
    if pairs.is_empty() {
        warn!(table = %table, "vocabulary table is empty; using starter vocabulary");
        return Ok(starter_vocab());
    }
    Ok(pairs)
}

/// Deliver the feedback timer, inline when its delay is zero.
fn dispatch(
    state: &SharedState,
    id: Uuid,
    round: &mut MatchingRound,
    delayed: Option<Delayed<MatchingEvent>>,
) {
    let Some(Delayed { after, event }) = delayed else {
        return;
    };
    if after.is_zero() {
        if let Err(err) = round.apply(event) {
            debug!(session = %id, error = %err, "feedback event rejected");
        }
        return;
    }

    let state = state.clone();
    timers::schedule(after, move || async move {
        let Some(session) = timers::live_session(state.matching(), id) else {
            debug!(session = %id, "matching round gone; feedback timer dropped");
            return;
        };
        let mut session = session.lock().await;
        if let Err(err) = session.round.apply(event) {
            debug!(session = %id, error = %err, "feedback event rejected");
        }
    });
}

/// Start a round and register it for key presses.
pub async fn start(
    state: &SharedState,
    request: StartMatchingRequest,
) -> Result<MatchingSnapshot, ServiceError> {
    let config = &state.config().matching;
    let pairs = request.pairs.unwrap_or(config.pairs_per_round);
    let lives = request.lives.unwrap_or(config.lives);

    let vocab = vocabulary(state).await?;
    let deck = build_matching_deck(&vocab, pairs, &mut rng());

    let id = Uuid::new_v4();
    let round = MatchingRound::new(deck, lives, config.delays);
    let snapshot = MatchingSnapshot::from_round(id, &round);
    let subscription = state.input().subscribe(id, View::Matching);
    state.matching().insert(
        id,
        Arc::new(Mutex::new(MatchingSession::new(id, round, subscription))),
    );

    info!(session = %id, pairs = snapshot.remaining_pairs, lives, "matching round started");
    Ok(snapshot)
}

/// Current state of a round.
pub async fn get(state: &SharedState, id: Uuid) -> Result<MatchingSnapshot, ServiceError> {
    let session = timers::require_session(state.matching(), id, "matching round")?;
    let session = session.lock().await;
    Ok(MatchingSnapshot::from_round(id, &session.round))
}

/// Toggle a card in its lane.
pub async fn select(
    state: &SharedState,
    id: Uuid,
    card_id: String,
) -> Result<MatchingSnapshot, ServiceError> {
    let session = timers::require_session(state.matching(), id, "matching round")?;
    let mut session = session.lock().await;
    let delayed = session.round.apply(MatchingEvent::Select { card_id })?;
    dispatch(state, id, &mut session.round, delayed);
    Ok(MatchingSnapshot::from_round(id, &session.round))
}

/// Evaluate the current selection. A no-op unless both lanes are selected.
pub async fn evaluate(state: &SharedState, id: Uuid) -> Result<MatchingSnapshot, ServiceError> {
    let session = timers::require_session(state.matching(), id, "matching round")?;
    let mut session = session.lock().await;
    let lives_before = session.round.lives();
    let delayed = session.round.apply(MatchingEvent::Match)?;
    if delayed.is_some() {
        debug!(
            session = %id,
            correct = session.round.lives() == lives_before,
            status = ?session.round.status(),
            "selection evaluated"
        );
    }
    dispatch(state, id, &mut session.round, delayed);
    Ok(MatchingSnapshot::from_round(id, &session.round))
}

/// Rebuild the deck with the same number of pairs and reset the round.
pub async fn new_round(state: &SharedState, id: Uuid) -> Result<MatchingSnapshot, ServiceError> {
    let session = timers::require_session(state.matching(), id, "matching round")?;
    let vocab = vocabulary(state).await?;

    let mut session = session.lock().await;
    let pairs = match session.round.cards().len() / 2 {
        0 => state.config().matching.pairs_per_round,
        pairs => pairs,
    };
    let deck = build_matching_deck(&vocab, pairs, &mut rng());
    let delayed = session.round.apply(MatchingEvent::NewRound { deck })?;
    dispatch(state, id, &mut session.round, delayed);

    info!(session = %id, pairs, "matching round rebuilt");
    Ok(MatchingSnapshot::from_round(id, &session.round))
}

/// Tear a round down; pending timers find nothing afterwards.
pub async fn delete(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    state
        .matching()
        .remove(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("matching round `{id}` not found")))?;
    info!(session = %id, "matching round torn down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{kv_store::MemoryKeyValueStore, question_source::MemoryQuestionSource},
        dto::matching::{FeedbackDto, RoundStatusDto},
        state::{AppState, verse::VerseCatalog},
    };

    fn app(config: AppConfig) -> SharedState {
        AppState::new(
            config,
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(MemoryQuestionSource::new()),
            VerseCatalog::default(),
        )
    }

    fn pairs_by_id(snapshot: &MatchingSnapshot) -> HashMap<String, (String, String)> {
        let mut pairs: HashMap<String, (String, String)> = HashMap::new();
        for card in &snapshot.cards {
            let (pair, lang) = card.id.rsplit_once('-').unwrap();
            let entry = pairs.entry(pair.to_string()).or_default();
            if lang == "ar" {
                entry.0 = card.id.clone();
            } else {
                entry.1 = card.id.clone();
            }
        }
        pairs
    }

    #[tokio::test]
    async fn starter_round_can_be_won() {
        let state = app(AppConfig::in_memory());
        let round = start(&state, StartMatchingRequest::default()).await.unwrap();
        assert_eq!(round.remaining_pairs, STARTER_VOCAB.len());
        assert_eq!(state.input().view(round.id), Some(View::Matching));

        let mut last = round.clone();
        for (ar, en) in pairs_by_id(&round).into_values() {
            select(&state, round.id, ar).await.unwrap();
            select(&state, round.id, en).await.unwrap();
            last = evaluate(&state, round.id).await.unwrap();
        }
        assert_eq!(last.status, RoundStatusDto::Won);
        assert_eq!(last.lives, 3);
        assert!(last.feedback.is_none());
    }

    #[tokio::test]
    async fn wrong_feedback_clears_after_its_timer() {
        let mut config = AppConfig::in_memory();
        config.matching.delays.wrong = Duration::from_millis(20);
        let state = app(config);
        let round = start(&state, StartMatchingRequest { pairs: Some(2), lives: None })
            .await
            .unwrap();

        let pairs = pairs_by_id(&round).into_values().collect::<Vec<_>>();
        select(&state, round.id, pairs[0].0.clone()).await.unwrap();
        select(&state, round.id, pairs[1].1.clone()).await.unwrap();
        let wrong = evaluate(&state, round.id).await.unwrap();
        assert_eq!(wrong.feedback, Some(FeedbackDto::Wrong));
        assert_eq!(wrong.lives, 2);

        tokio::time::sleep(Duration::from_millis(80)).await;
        let cleared = get(&state, round.id).await.unwrap();
        assert!(cleared.feedback.is_none());
        assert!(cleared.cards.iter().all(|card| !card.selected));
    }

    #[tokio::test]
    async fn delete_unsubscribes_and_new_round_resets() {
        let state = app(AppConfig::in_memory());
        let round = start(&state, StartMatchingRequest { pairs: Some(3), lives: Some(1) })
            .await
            .unwrap();

        let rebuilt = new_round(&state, round.id).await.unwrap();
        assert_eq!(rebuilt.remaining_pairs, 3);
        assert_eq!(rebuilt.lives, 1);

        delete(&state, round.id).await.unwrap();
        assert!(state.input().view(round.id).is_none());
        assert!(matches!(
            get(&state, round.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn rows_with_numeric_ids_become_pairs() {
        let row = serde_json::json!({"id": 9, "en": "Peace", "ar": "سلام"});
        let Value::Object(row) = row else { unreachable!() };
        let pair = pair_from_row(&row).unwrap();
        assert_eq!(pair.id, "9");
        assert!(pair_from_row(&Row::new()).is_none());
    }
}
