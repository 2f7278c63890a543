//! Search gateway trait definition.

use async_trait::async_trait;

use crate::backend::SearchTarget;

/// One upstream search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keyword: String,
    pub target: SearchTarget,
}

impl SearchRequest {
    pub fn new(keyword: impl Into<String>, target: SearchTarget) -> Self {
        Self {
            keyword: keyword.into(),
            target,
        }
    }
}

/// Classified result of a single HTTP attempt.
///
/// Expected upstream answers are variants, not errors, so the retry loop can
/// match on them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// HTTP 200 with its body and `Content-Type`.
    Body { content_type: String, body: String },
    /// HTTP 200 whose body could not be read.
    Unreadable(String),
    /// HTTP 404.
    NotFound,
    /// HTTP 429.
    TooManyRequests,
    /// Any other status.
    Status(u16),
    /// The per-call deadline passed.
    Timeout,
    /// Connection-level failure.
    Transport(String),
}

/// Service for issuing upstream search calls.
///
/// Implementations perform exactly one HTTP attempt per call; retrying is
/// the caller's job.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Runs a narrow or full-network search.
    async fn search(&self, request: &SearchRequest) -> SearchOutcome;

    /// Queries the upstream's own index only (no live crawl).
    async fn local_search(&self, keyword: &str) -> SearchOutcome;
}
