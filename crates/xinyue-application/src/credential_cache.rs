//! Time-bounded cache of per-backend drive credentials.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::join_all;
use strum::EnumCount;
use tokio::sync::Mutex;
use tokio::time::Instant;
use xinyue_core::backend::Backend;
use xinyue_core::credential::{CredentialError, CredentialGateway};

/// A token and the moment it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CredentialEntry {
    token: String,
    fetched_at: Instant,
}

impl CredentialEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

#[derive(Default)]
struct SlotState {
    entry: Option<CredentialEntry>,
    /// Error of the most recent refresh, cleared by a successful one.
    last_failure: Option<CredentialError>,
}

#[derive(Default)]
struct Slot {
    /// Number of finished refreshes, successful or not.
    generation: AtomicU64,
    state: Mutex<SlotState>,
}

/// Caches one credential per backend for `ttl`.
///
/// Every backend has its own slot lock, and a refresh runs while holding
/// it. Callers that queued behind a refresh take its outcome, token or
/// error, instead of issuing their own. Different backends refresh
/// independently.
pub struct CredentialCache {
    gateway: Arc<dyn CredentialGateway>,
    ttl: Duration,
    timeout: Duration,
    slots: [Slot; Backend::COUNT],
}

impl CredentialCache {
    pub fn new(gateway: Arc<dyn CredentialGateway>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            gateway,
            ttl,
            timeout,
            slots: std::array::from_fn(|_| Slot::default()),
        }
    }

    fn slot(&self, backend: Backend) -> &Slot {
        &self.slots[backend.index()]
    }

    /// Returns a fresh token for `backend`, refreshing it if needed.
    ///
    /// A failed refresh leaves the previous entry (if any) in place. Callers
    /// already waiting get the same error; the next call after that tries
    /// again.
    pub async fn get(&self, backend: Backend) -> Result<String, CredentialError> {
        let slot = self.slot(backend);
        let seen = slot.generation.load(Ordering::Acquire);
        let mut state = slot.state.lock().await;

        if let Some(entry) = state.entry.as_ref().filter(|entry| entry.is_fresh(self.ttl)) {
            return Ok(entry.token.clone());
        }

        if slot.generation.load(Ordering::Acquire) != seen {
            if let Some(err) = &state.last_failure {
                tracing::debug!("Sharing failed {} refresh with a waiting caller", backend);
                return Err(err.clone());
            }
        }

        let outcome = self.refresh(backend).await;
        match &outcome {
            Ok(token) => {
                state.entry = Some(CredentialEntry {
                    token: token.clone(),
                    fetched_at: Instant::now(),
                });
                state.last_failure = None;
            }
            Err(err) => state.last_failure = Some(err.clone()),
        }
        slot.generation.fetch_add(1, Ordering::Release);
        outcome
    }

    async fn refresh(&self, backend: Backend) -> Result<String, CredentialError> {
        tracing::debug!("Refreshing {} credential", backend);

        let refresh = async {
            self.gateway.probe(backend).await?;
            self.gateway.fetch(backend).await
        };

        match tokio::time::timeout(self.timeout, refresh).await {
            Ok(Ok(token)) => {
                tracing::info!("Refreshed {} credential", backend);
                Ok(token)
            }
            Ok(Err(err)) => {
                tracing::warn!("Credential refresh failed: {}", err);
                Err(err)
            }
            Err(_) => {
                tracing::warn!("Credential refresh for {} timed out", backend);
                Err(CredentialError::Timeout(backend))
            }
        }
    }

    /// Warms every backend in `backends` concurrently.
    ///
    /// Failures are logged and otherwise ignored; a later [`get`] retries.
    ///
    /// [`get`]: CredentialCache::get
    pub async fn prefetch(&self, backends: &BTreeSet<Backend>) {
        let results = join_all(backends.iter().map(|backend| self.get(*backend))).await;
        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed > 0 {
            tracing::debug!("{} of {} credential prefetches failed", failed, backends.len());
        }
    }
}
