//! Key bindings scoped to live sessions.
//!
//! A session registers its view with [`InputRouter::subscribe`] and keeps the
//! returned [`Subscription`]; dropping it (when the session is torn down)
//! removes the binding, so no key is ever delivered to a dead session.
//! A newer subscription for the same id replaces the binding; the older guard
//! then leaves it alone when dropped.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

/// Screen a session is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Word matching board.
    Matching,
    /// Trivia board with its flashcard overlay.
    Trivia,
}

/// Keys the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Key {
    /// Enter / Return.
    Enter,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
}

/// Action a key press resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Evaluate the current matching selection.
    Match,
    /// Turn the open flashcard over.
    FlipClue,
    /// Close the open flashcard.
    CloseClue,
}

/// Static key map per view.
pub fn bind(view: View, key: Key) -> Option<InputAction> {
    match (view, key) {
        (View::Matching, Key::Enter) => Some(InputAction::Match),
        (View::Trivia, Key::Space) => Some(InputAction::FlipClue),
        (View::Trivia, Key::Enter | Key::Escape) => Some(InputAction::CloseClue),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    view: View,
    token: u64,
}

/// Registry of sessions currently accepting key presses.
#[derive(Debug, Default)]
pub struct InputRouter {
    views: DashMap<Uuid, Binding>,
    next_token: AtomicU64,
}

impl InputRouter {
    /// Empty router.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bind `session` to `view` until the returned guard is dropped.
    pub fn subscribe(self: &Arc<Self>, session: Uuid, view: View) -> Subscription {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        if self.views.insert(session, Binding { view, token }).is_some() {
            debug!(%session, ?view, "input subscription replaced");
        } else {
            debug!(%session, ?view, "input subscription added");
        }
        Subscription {
            router: Arc::clone(self),
            session,
            token,
        }
    }

    /// View bound to `session`, if subscribed.
    pub fn view(&self, session: Uuid) -> Option<View> {
        self.views.get(&session).map(|entry| entry.view)
    }

    /// Resolve a key press. `None` when the session is not subscribed.
    pub fn resolve(&self, session: Uuid, key: Key) -> Option<(View, Option<InputAction>)> {
        self.view(session).map(|view| (view, bind(view, key)))
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no session is subscribed.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Guard keeping a session subscribed.
#[derive(Debug)]
pub struct Subscription {
    router: Arc<InputRouter>,
    session: Uuid,
    token: u64,
}

impl Subscription {
    /// Subscribed session.
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// False once a newer subscription took over the same session id.
    pub fn is_current(&self) -> bool {
        self.router
            .views
            .get(&self.session)
            .is_some_and(|binding| binding.token == self.token)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let removed = self
            .router
            .views
            .remove_if(&self.session, |_, binding| binding.token == self.token);
        if removed.is_some() {
            debug!(session = %self.session, "input subscription removed");
        }
    }
}
