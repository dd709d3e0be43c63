//! Delayed delivery of session events.
//!
//! Timers only sequence cosmetic effects. Each one re-resolves its session
//! by id when it fires, so a timer outliving its session finds nothing and
//! is dropped.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::sleep};
use uuid::Uuid;

use crate::{error::ServiceError, state::SessionMap};

/// Run `deliver` on a detached task once `after` has elapsed.
pub fn schedule<F, Fut>(after: Duration, deliver: F)
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        sleep(after).await;
        deliver().await;
    });
}

/// Look up a live session without holding the map shard.
pub fn live_session<S>(sessions: &SessionMap<S>, id: Uuid) -> Option<Arc<Mutex<S>>> {
    sessions.get(&id).map(|entry| Arc::clone(entry.value()))
}

/// Like [`live_session`], with a not-found error naming the game.
pub fn require_session<S>(
    sessions: &SessionMap<S>,
    id: Uuid,
    kind: &str,
) -> Result<Arc<Mutex<S>>, ServiceError> {
    live_session(sessions, id)
        .ok_or_else(|| ServiceError::NotFound(format!("{kind} `{id}` not found")))
}

#[cfg(test)]
mod tests {
    use dashmap::DashMap;
    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn scheduled_work_runs_after_delay() {
        let (tx, rx) = oneshot::channel();
        schedule(Duration::from_millis(5), move || async move {
            let _ = tx.send(42);
        });
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[test]
    fn missing_sessions_are_reported() {
        let sessions: SessionMap<u32> = DashMap::new();
        let id = Uuid::new_v4();
        assert!(live_session(&sessions, id).is_none());
        assert!(matches!(
            require_session(&sessions, id, "round"),
            Err(ServiceError::NotFound(_))
        ));

        sessions.insert(id, Arc::new(Mutex::new(7)));
        assert!(live_session(&sessions, id).is_some());
    }
}
