//! Verse drill sessions: question loading, grading and advance timers.

use std::{collections::VecDeque, sync::Arc};

use rand::rng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::question_source::{Direction, QuestionSource, RowQuery},
    dto::quiz::{AnswerOutcome, AnswerRequest, QuizSnapshot, RestartRequest, StartQuizRequest},
    error::ServiceError,
    services::timers,
    state::{
        SharedState,
        question::{QUESTION_COLUMNS, QuizQuestion, Response},
        round::{RoundController, RoundEffect, RoundError, RoundEvent, RoundPhase},
        session::QuizSession,
    },
};

/// Banner shown when the question table could not be read.
pub const LOAD_FAILED_MESSAGE: &str = "Could not load questions.";

type QuizEffect = RoundEffect<QuizQuestion>;

/// Fetch the active questions of `table`, easiest first.
///
/// Malformed rows are skipped; a backend failure becomes the banner message.
pub async fn load_questions(
    source: Arc<dyn QuestionSource>,
    table: &str,
) -> Result<Vec<QuizQuestion>, String> {
    let query = RowQuery::from(table)
        .select(QUESTION_COLUMNS)
        .eq("active", true)
        .order("difficulty", Direction::Ascending);

    let rows = source.fetch(query).await.map_err(|err| {
        warn!(table, error = %err, "question fetch failed");
        LOAD_FAILED_MESSAGE.to_string()
    })?;

    let total = rows.len();
    let questions = rows
        .into_iter()
        .filter_map(|row| match QuizQuestion::from_row(row) {
            Ok(question) => Some(question),
            Err(err) => {
                warn!(table, error = %err, "skipping malformed question");
                None
            }
        })
        .collect::<Vec<_>>();
    debug!(table, total, decoded = questions.len(), "questions loaded");
    Ok(questions)
}

/// Run the effects of a transition. Zero-delay timers are applied in place.
fn drive(
    state: &SharedState,
    id: Uuid,
    round: &mut RoundController<QuizQuestion>,
    effects: Vec<QuizEffect>,
) {
    let mut queue = VecDeque::from(effects);
    while let Some(effect) = queue.pop_front() {
        match effect {
            RoundEffect::Fetch { generation } => {
                tokio::spawn(fetch_into(state.clone(), id, generation));
            }
            RoundEffect::Schedule(delayed) if delayed.after.is_zero() => {
                match round.apply(delayed.event, &mut rng()) {
                    Ok(more) => queue.extend(more),
                    Err(err) => debug!(session = %id, error = %err, "timer event rejected"),
                }
            }
            RoundEffect::Schedule(delayed) => {
                let state = state.clone();
                timers::schedule(delayed.after, move || deliver(state, id, delayed.event));
            }
        }
    }
}

async fn deliver(state: SharedState, id: Uuid, event: RoundEvent<QuizQuestion>) {
    let Some(session) = timers::live_session(state.quiz(), id) else {
        debug!(session = %id, "quiz session gone; event dropped");
        return;
    };
    let mut session = session.lock().await;
    let outcome = session.round.apply(event, &mut rng());
    match outcome {
        Ok(effects) => drive(&state, id, &mut session.round, effects),
        Err(RoundError::StaleFetch { expected, got }) => {
            debug!(session = %id, expected, got, "stale fetch result discarded");
        }
        Err(RoundError::StaleTimer) => debug!(session = %id, "stale timer discarded"),
        Err(err) => warn!(session = %id, error = %err, "event rejected"),
    }
}

/// Fetch for `generation` and hand the result back to the session.
async fn fetch_into(state: SharedState, id: Uuid, generation: u64) {
    let table = state.config().quiz.table.clone();
    let result = load_questions(state.source(), &table).await;
    if let Ok(questions) = &result {
        info!(session = %id, generation, count = questions.len(), "question set fetched");
    }
    deliver(state, id, RoundEvent::Loaded { generation, result }).await;
}

/// Create a session in `loading` and start fetching its questions.
pub async fn create(
    state: &SharedState,
    request: StartQuizRequest,
) -> Result<QuizSnapshot, ServiceError> {
    let config = &state.config().quiz;
    let lives = request.lives.or(config.lives);
    let (round, fetch) = RoundController::start(lives, config.delays);

    let id = Uuid::new_v4();
    let snapshot = QuizSnapshot::from_round(id, &round);
    let session = Arc::new(Mutex::new(QuizSession { id, round }));
    state.quiz().insert(id, Arc::clone(&session));

    let mut session = session.lock().await;
    drive(state, id, &mut session.round, vec![fetch]);
    info!(session = %id, ?lives, "quiz session created");
    Ok(snapshot)
}

/// Current state of a session.
pub async fn get(state: &SharedState, id: Uuid) -> Result<QuizSnapshot, ServiceError> {
    let session = timers::require_session(state.quiz(), id, "quiz session")?;
    let session = session.lock().await;
    Ok(QuizSnapshot::from_round(id, &session.round))
}

/// Grade a response to the current question.
pub async fn answer(
    state: &SharedState,
    id: Uuid,
    request: AnswerRequest,
) -> Result<AnswerOutcome, ServiceError> {
    let session = timers::require_session(state.quiz(), id, "quiz session")?;
    let mut session = session.lock().await;

    if *session.round.phase() != RoundPhase::Ready {
        return Err(ServiceError::InvalidState(format!(
            "answers are only accepted while ready, session is {}",
            session.round.phase().name()
        )));
    }
    let correct = match session.round.current() {
        Some(question) => question.grade(&Response::from(request))?,
        None => {
            return Err(ServiceError::InvalidState("no question to answer".into()));
        }
    };

    let effects = session.round.apply(RoundEvent::Grade { correct }, &mut rng())?;
    drive(state, id, &mut session.round, effects);
    debug!(session = %id, correct, score = session.round.score(), "answer graded");

    Ok(AnswerOutcome {
        correct,
        session: QuizSnapshot::from_round(id, &session.round),
    })
}

/// Retry after an error, or play again by reshuffling or re-fetching.
pub async fn restart(
    state: &SharedState,
    id: Uuid,
    request: RestartRequest,
) -> Result<QuizSnapshot, ServiceError> {
    let session = timers::require_session(state.quiz(), id, "quiz session")?;
    let mut session = session.lock().await;

    let refetch = request.refetch || matches!(session.round.phase(), RoundPhase::Error { .. });
    let event = if refetch {
        RoundEvent::Load
    } else {
        RoundEvent::Reshuffle
    };
    let effects = session.round.apply(event, &mut rng())?;
    drive(state, id, &mut session.round, effects);

    info!(session = %id, refetch, "quiz session restarted");
    Ok(QuizSnapshot::from_round(id, &session.round))
}

/// Tear a session down; an in-flight fetch is dropped when it completes.
pub async fn delete(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    state
        .quiz()
        .remove(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("quiz session `{id}` not found")))?;
    info!(session = %id, "quiz session torn down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{kv_store::MemoryKeyValueStore, question_source::MemoryQuestionSource},
        dto::quiz::QuizPhaseDto,
        state::{AppState, verse::VerseCatalog},
    };

    fn row(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    async fn app(rows: Vec<Value>) -> SharedState {
        let source = MemoryQuestionSource::with_tables(["hifzbuddy"]);
        source
            .insert("hifzbuddy", rows.into_iter().map(row).collect())
            .await
            .unwrap();
        AppState::new(
            AppConfig::in_memory(),
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(source),
            VerseCatalog::default(),
        )
    }

    fn which_surah(id: u32, answer: usize, difficulty: i64) -> Value {
        json!({
            "id": id,
            "qtype": "which_surah",
            "prompt": "قل هو الله أحد",
            "payload": {"options": ["Al-Ikhlas", "An-Nas"]},
            "answer": {"index": answer},
            "difficulty": difficulty,
            "active": true
        })
    }

    async fn settled(state: &SharedState, id: Uuid) -> QuizSnapshot {
        for _ in 0..100 {
            let snapshot = get(state, id).await.unwrap();
            if snapshot.phase != QuizPhaseDto::Loading {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("session never left loading");
    }

    #[tokio::test]
    async fn drill_runs_to_finished() {
        let state = app(vec![which_surah(1, 0, 1), which_surah(2, 0, 2)]).await;
        let created = create(&state, StartQuizRequest::default()).await.unwrap();
        assert_eq!(created.phase, QuizPhaseDto::Loading);

        let ready = settled(&state, created.id).await;
        assert_eq!(ready.phase, QuizPhaseDto::Ready);
        assert_eq!(ready.total, 2);

        let first = answer(&state, created.id, AnswerRequest::Choice { index: 0 })
            .await
            .unwrap();
        assert!(first.correct);
        assert_eq!(first.session.phase, QuizPhaseDto::Ready);
        assert_eq!(first.session.index, 1);

        let last = answer(&state, created.id, AnswerRequest::Choice { index: 1 })
            .await
            .unwrap();
        assert!(!last.correct);
        assert_eq!(last.session.phase, QuizPhaseDto::Finished);
        assert_eq!(last.session.score, 1);
        assert_eq!(last.session.index, 1);

        let again = restart(&state, created.id, RestartRequest { refetch: false })
            .await
            .unwrap();
        assert_eq!(again.phase, QuizPhaseDto::Ready);
        assert_eq!(again.score, 0);
    }

    #[tokio::test]
    async fn miss_with_lives_keeps_the_question_up() {
        let state = app(vec![which_surah(1, 0, 1), which_surah(2, 0, 2)]).await;
        let created = create(&state, StartQuizRequest { lives: Some(2) })
            .await
            .unwrap();
        settled(&state, created.id).await;

        let missed = answer(&state, created.id, AnswerRequest::Choice { index: 1 })
            .await
            .unwrap();
        assert!(!missed.correct);
        assert_eq!(missed.session.phase, QuizPhaseDto::Ready);
        assert_eq!(missed.session.index, 0);
        assert_eq!(missed.session.lives, Some(1));

        let lost = answer(&state, created.id, AnswerRequest::Choice { index: 1 })
            .await
            .unwrap();
        assert_eq!(lost.session.phase, QuizPhaseDto::Lost);
        assert_eq!(lost.session.lives, Some(0));
    }

    #[tokio::test]
    async fn empty_table_errors_and_malformed_rows_are_skipped() {
        let state = app(vec![json!({"id": 3, "qtype": "mystery", "active": true})]).await;
        let created = create(&state, StartQuizRequest::default()).await.unwrap();

        let failed = settled(&state, created.id).await;
        assert_eq!(failed.phase, QuizPhaseDto::Error);
        assert_eq!(failed.message.as_deref(), Some("No questions found."));
        assert!(failed.question.is_none());

        let err = answer(&state, created.id, AnswerRequest::Choice { index: 0 }).await;
        assert!(matches!(err, Err(ServiceError::InvalidState(_))));
    }

    #[tokio::test]
    async fn unknown_table_surfaces_as_load_failure() {
        let questions = load_questions(Arc::new(MemoryQuestionSource::new()), "hifzbuddy").await;
        assert_eq!(questions, Err(LOAD_FAILED_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn inactive_rows_are_not_loaded() {
        let mut inactive = which_surah(9, 0, 1);
        inactive["active"] = json!(false);
        let state = app(vec![inactive, which_surah(1, 0, 5)]).await;
        let questions = load_questions(state.source(), "hifzbuddy").await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "1");
    }

    #[tokio::test]
    async fn fetch_for_a_torn_down_session_is_dropped() {
        let state = app(vec![which_surah(1, 0, 1)]).await;
        let created = create(&state, StartQuizRequest::default()).await.unwrap();
        delete(&state, created.id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(state.quiz().is_empty());
        assert!(matches!(
            get(&state, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
