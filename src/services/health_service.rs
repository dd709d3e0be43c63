use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report live sessions and whether the question source answers.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let live_sessions = state.matching().len() + state.quiz().len() + state.trivia().len();

    match state.source().health_check().await {
        Ok(()) => HealthResponse::ok(live_sessions),
        Err(err) => {
            warn!(error = %err, "question source health check failed");
            HealthResponse::degraded(live_sessions)
        }
    }
}
