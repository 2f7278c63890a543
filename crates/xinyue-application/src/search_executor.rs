//! Upstream search with retry, and session replacement on success.

use std::sync::Arc;
use std::time::Duration;

use xinyue_core::backend::SearchTarget;
use xinyue_core::messages::{MessageKey, MessageTable};
use xinyue_core::search::{SearchGateway, SearchOutcome, SearchRequest, SourceEncoding};
use xinyue_core::session::Session;

use crate::normalizer;
use crate::renderer::PageRenderer;
use crate::session_store::SessionStore;

/// How long to wait before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backoff {
    /// `2^n` seconds after the n-th failure.
    Exponential,
    Fixed,
}

impl Backoff {
    fn delay(self, retry_count: u32) -> Duration {
        match self {
            Backoff::Exponential => Duration::from_secs(1u64 << retry_count.min(16)),
            Backoff::Fixed => Duration::from_secs(1),
        }
    }
}

/// Where an attempt leaves the retry loop.
enum Attempt {
    /// Terminal reply; no further attempts.
    Done(String),
    /// Retryable failure; `message` is the reply if no attempts remain.
    Retry { backoff: Backoff, message: String },
}

/// Executes keyword searches against the upstream service.
pub struct SearchExecutor {
    gateway: Arc<dyn SearchGateway>,
    store: Arc<SessionStore>,
    renderer: Arc<PageRenderer>,
    messages: Arc<MessageTable>,
    max_retries: u32,
    max_keyword_chars: usize,
    page_size: usize,
}

impl SearchExecutor {
    pub fn new(
        gateway: Arc<dyn SearchGateway>,
        store: Arc<SessionStore>,
        renderer: Arc<PageRenderer>,
        messages: Arc<MessageTable>,
        max_retries: u32,
        max_keyword_chars: usize,
        page_size: usize,
    ) -> Self {
        Self {
            gateway,
            store,
            renderer,
            messages,
            max_retries,
            max_keyword_chars,
            page_size,
        }
    }

    /// Trims `keyword` and checks it, returning the rejection text on failure.
    pub fn validate<'a>(&self, keyword: &'a str) -> Result<&'a str, String> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(self.messages.get(MessageKey::EmptyKeyword).to_string());
        }
        if keyword.chars().count() > self.max_keyword_chars {
            return Err(self
                .messages
                .render(MessageKey::KeywordTooLong, &[&self.max_keyword_chars]));
        }
        Ok(keyword)
    }

    /// Searches `keyword` and, on success, replaces the identity's session
    /// and renders its first page.
    ///
    /// Every outcome is a user-facing string; nothing is raised.
    pub async fn execute(&self, identity: &str, keyword: &str, target: SearchTarget) -> String {
        let keyword = match self.validate(keyword) {
            Ok(keyword) => keyword,
            Err(reply) => return reply,
        };

        let request = SearchRequest::new(keyword, target);
        let mut retry_count: u32 = 0;

        while retry_count < self.max_retries {
            let outcome = self.gateway.search(&request).await;
            let (backoff, message) = match self.classify(identity, &request, outcome).await {
                Attempt::Done(reply) => return reply,
                Attempt::Retry { backoff, message } => (backoff, message),
            };

            retry_count += 1;
            if retry_count >= self.max_retries {
                tracing::warn!(
                    "Search for '{}' gave up after {} attempts",
                    keyword,
                    retry_count
                );
                return message;
            }

            let delay = backoff.delay(retry_count);
            tracing::debug!(
                "Search attempt {} for '{}' failed, retrying in {:?}",
                retry_count,
                keyword,
                delay
            );
            tokio::time::sleep(delay).await;
        }

        self.messages
            .get(MessageKey::TemporarilyUnavailable)
            .to_string()
    }

    async fn classify(&self, identity: &str, request: &SearchRequest, outcome: SearchOutcome) -> Attempt {
        match outcome {
            SearchOutcome::Body { content_type, body } => {
                Attempt::Done(self.accept(identity, request, &content_type, &body).await)
            }
            SearchOutcome::Unreadable(reason) => {
                tracing::warn!("Search body could not be read: {}", reason);
                Attempt::Done(self.messages.get(MessageKey::ParseFailed).to_string())
            }
            SearchOutcome::NotFound => Attempt::Done(
                self.messages
                    .render(MessageKey::NoResults, &[&request.keyword]),
            ),
            SearchOutcome::TooManyRequests => Attempt::Retry {
                backoff: Backoff::Exponential,
                message: self.messages.get(MessageKey::TooManyRequests).to_string(),
            },
            SearchOutcome::Timeout => Attempt::Retry {
                backoff: Backoff::Exponential,
                message: self.messages.get(MessageKey::Timeout).to_string(),
            },
            SearchOutcome::Transport(reason) => {
                tracing::warn!("Search request failed: {}", reason);
                Attempt::Retry {
                    backoff: Backoff::Exponential,
                    message: self.messages.get(MessageKey::NetworkError).to_string(),
                }
            }
            SearchOutcome::Status(status) => Attempt::Retry {
                backoff: Backoff::Fixed,
                message: self
                    .messages
                    .render(MessageKey::ServiceUnavailable, &[&status]),
            },
        }
    }

    async fn accept(
        &self,
        identity: &str,
        request: &SearchRequest,
        content_type: &str,
        body: &str,
    ) -> String {
        let encoding = SourceEncoding::from_content_type(content_type);
        let records = match normalizer::decode(body, encoding) {
            Ok(payload) => payload.into_records(),
            Err(err) => {
                tracing::warn!("Search for '{}': {}", request.keyword, err);
                return self.messages.get(MessageKey::ParseFailed).to_string();
            }
        };

        tracing::info!(
            "Search for '{}' ({}) returned {} results",
            request.keyword,
            request.target,
            records.len()
        );

        let session = Session::new(
            records,
            request.keyword.clone(),
            request.target,
            encoding,
            self.page_size,
        );

        let mut slot = self.store.lock(identity).await;
        let session = slot.insert(session);
        self.renderer.render(session, 1).await
    }
}
