//! In-memory search sessions, one per identity.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use xinyue_core::session::Session;

type Slot = Arc<Mutex<Option<Session>>>;

/// Maps identities to their latest search session.
///
/// Each identity gets its own slot lock. Holding a slot guard serializes
/// every command for that identity (search, paging, transfer) while other
/// identities proceed untouched.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, identity: &str) -> Slot {
        if let Some(slot) = self.sessions.read().await.get(identity) {
            return Arc::clone(slot);
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(identity.to_string()).or_default())
    }

    /// Locks the session slot of `identity`, creating an empty one if needed.
    pub async fn lock(&self, identity: &str) -> OwnedMutexGuard<Option<Session>> {
        self.slot(identity).await.lock_owned().await
    }

    /// Replaces the session of `identity` wholesale.
    pub async fn replace(&self, identity: &str, session: Session) {
        *self.lock(identity).await = Some(session);
    }

    /// Copy of the current session of `identity`.
    pub async fn snapshot(&self, identity: &str) -> Option<Session> {
        let slot = self.sessions.read().await.get(identity).cloned()?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Number of identities with a slot.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
