//! Per-identity sliding-window rate limiting.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use xinyue_core::config::RateLimitConfig;

type Window = Arc<Mutex<VecDeque<Instant>>>;

/// Result of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Rejected; the oldest request leaves the window after `wait_secs`.
    Limited { wait_secs: u64 },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Sliding-window limiter keyed by identity.
///
/// Each identity owns its own window behind its own lock, so a busy
/// identity never stalls another. The outer map lock is only held long
/// enough to find (or create) that window.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    fn window_for(&self, identity: &str) -> Window {
        let mut windows = lock(&self.windows);
        Arc::clone(windows.entry(identity.to_string()).or_default())
    }

    fn prune(&self, timestamps: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn wait_from(&self, timestamps: &VecDeque<Instant>, now: Instant) -> u64 {
        let Some(oldest) = timestamps.front() else {
            return 0;
        };
        let remaining = self.window.saturating_sub(now.duration_since(*oldest));
        // Round up so a limited caller is never told to wait 0 seconds.
        let secs = remaining.as_secs();
        if remaining.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }

    /// Records a request for `identity` if the window has room.
    ///
    /// Rejected requests are not recorded.
    pub fn admit(&self, identity: &str) -> bool {
        self.check(identity).is_allowed()
    }

    /// Seconds until `identity` may be admitted again; 0 when it may be now.
    pub fn wait_seconds(&self, identity: &str) -> u64 {
        let window = self.window_for(identity);
        let mut timestamps = lock(&window);
        let now = Instant::now();
        self.prune(&mut timestamps, now);

        if timestamps.len() < self.max_requests {
            0
        } else {
            self.wait_from(&timestamps, now)
        }
    }

    /// Admits or rejects in one step, reporting the wait on rejection.
    pub fn check(&self, identity: &str) -> Admission {
        let window = self.window_for(identity);
        let mut timestamps = lock(&window);
        let now = Instant::now();
        self.prune(&mut timestamps, now);

        if timestamps.len() < self.max_requests {
            timestamps.push_back(now);
            Admission::Allowed
        } else {
            let wait_secs = self.wait_from(&timestamps, now);
            tracing::debug!("Rate limited '{}' for {}s", identity, wait_secs);
            Admission::Limited { wait_secs }
        }
    }

    /// Number of identities seen so far.
    pub fn tracked_identities(&self) -> usize {
        lock(&self.windows).len()
    }
}
