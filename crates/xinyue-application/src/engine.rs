//! Entry point wiring rate limiting, searching, paging and transfers.

use std::sync::Arc;

use xinyue_core::backend::SearchTarget;
use xinyue_core::config::EngineConfig;
use xinyue_core::credential::CredentialGateway;
use xinyue_core::entitlement::EntitlementGate;
use xinyue_core::messages::{MessageKey, MessageTable};
use xinyue_core::search::SearchGateway;
use xinyue_core::transfer::TransferGateway;

use crate::credential_cache::CredentialCache;
use crate::local_search::LocalSearch;
use crate::pagination::Paginator;
use crate::rate_limiter::{Admission, RateLimiter};
use crate::renderer::PageRenderer;
use crate::search_executor::SearchExecutor;
use crate::session_store::SessionStore;
use crate::transfer::TransferOrchestrator;

/// Upstream seams the engine talks through.
#[derive(Clone)]
pub struct Gateways {
    pub search: Arc<dyn SearchGateway>,
    pub credentials: Arc<dyn CredentialGateway>,
    pub transfer: Arc<dyn TransferGateway>,
    pub entitlement: Arc<dyn EntitlementGate>,
}

/// The search-session engine.
///
/// Every operation takes the caller's identity and returns user-facing
/// text. Searches and transfers are gated by the entitlement check and,
/// for searches, by the per-identity rate limit.
pub struct SearchEngine {
    config: EngineConfig,
    messages: Arc<MessageTable>,
    entitlement: Arc<dyn EntitlementGate>,
    rate_limiter: RateLimiter,
    sessions: Arc<SessionStore>,
    credentials: Arc<CredentialCache>,
    transfers: TransferOrchestrator,
    executor: SearchExecutor,
    paginator: Paginator,
    local: LocalSearch,
}

impl SearchEngine {
    pub fn new(config: EngineConfig, gateways: Gateways) -> Self {
        let messages = Arc::new(config.message_table());
        let sessions = Arc::new(SessionStore::new());
        let credentials = Arc::new(CredentialCache::new(
            gateways.credentials,
            config.credential_ttl(),
            config.credential_timeout(),
        ));
        let transfers = TransferOrchestrator::new(
            Arc::clone(&credentials),
            gateways.transfer,
            Arc::clone(&messages),
            config.transfer_timeout(),
            config.transfer_delay(),
            config.transfer_active(),
        );
        let renderer = Arc::new(PageRenderer::new(
            Arc::clone(&messages),
            transfers.clone(),
            config.base_url.clone(),
            config.enable_pagination,
        ));
        let executor = SearchExecutor::new(
            Arc::clone(&gateways.search),
            Arc::clone(&sessions),
            Arc::clone(&renderer),
            Arc::clone(&messages),
            config.max_retries,
            config.max_keyword_chars,
            config.page_size,
        );
        let paginator = Paginator::new(
            Arc::clone(&sessions),
            renderer,
            Arc::clone(&messages),
            config.enable_pagination,
        );
        let local = LocalSearch::new(gateways.search, Arc::clone(&messages));

        Self {
            rate_limiter: RateLimiter::from_config(&config.rate_limit),
            entitlement: gateways.entitlement,
            config,
            messages,
            sessions,
            credentials,
            transfers,
            executor,
            paginator,
            local,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn messages(&self) -> &MessageTable {
        &self.messages
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    fn denied(&self) -> Option<String> {
        match self.entitlement.check() {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!("Entitlement check failed: {}", err);
                Some(self.messages.get(MessageKey::EntitlementDenied).to_string())
            }
        }
    }

    /// Runs a search and returns the replies in send order: a progress
    /// notice, then the first page (or the failure text).
    ///
    /// Rate-limited callers and rejected keywords get a single reply and no
    /// upstream call is made. A rejected keyword still counts against the
    /// caller's rate limit.
    pub async fn search(&self, identity: &str, keyword: &str, target: SearchTarget) -> Vec<String> {
        if let Some(reply) = self.denied() {
            return vec![reply];
        }
        if let Admission::Limited { wait_secs } = self.rate_limiter.check(identity) {
            return vec![self.messages.render(MessageKey::RateLimited, &[&wait_secs])];
        }
        if let Err(reply) = self.executor.validate(keyword) {
            return vec![reply];
        }

        let page = self.executor.execute(identity, keyword, target).await;
        vec![self.messages.get(MessageKey::Searching).to_string(), page]
    }

    /// Next page, or `None` when the request is silently ignored.
    pub async fn next_page(&self, identity: &str) -> Option<String> {
        if let Some(reply) = self.denied() {
            return Some(reply);
        }
        self.paginator.next_page(identity).await
    }

    /// Previous page, or `None` when the request is silently ignored.
    pub async fn previous_page(&self, identity: &str) -> Option<String> {
        if let Some(reply) = self.denied() {
            return Some(reply);
        }
        self.paginator.previous_page(identity).await
    }

    /// Renders an explicit page and makes it current.
    pub async fn render(&self, identity: &str, page: usize) -> String {
        if let Some(reply) = self.denied() {
            return reply;
        }
        self.paginator.render(identity, page).await
    }

    /// Transfers the `index`-th result (1-based, across all pages) of the
    /// identity's current session.
    pub async fn transfer(&self, identity: &str, index: usize) -> Vec<String> {
        if let Some(reply) = self.denied() {
            return vec![reply];
        }
        if !self.config.enable_transfer {
            return vec![self.messages.get(MessageKey::TransferDisabled).to_string()];
        }
        if self.config.api_key.is_empty() {
            return vec![self.messages.get(MessageKey::ApiKeyRequired).to_string()];
        }

        let record = {
            let slot = self.sessions.lock(identity).await;
            let Some(session) = slot.as_ref() else {
                return vec![self.messages.get(MessageKey::NoSearchForTransfer).to_string()];
            };
            if session.is_empty() {
                return vec![self.messages.get(MessageKey::SearchExpired).to_string()];
            }
            let total = session.results().len();
            if index < 1 || index > total {
                return vec![self
                    .messages
                    .render(MessageKey::InvalidResourceIndex, &[&total])];
            }
            session.results()[index - 1].clone()
        };

        self.transfers.transfer_resource(&record).await
    }

    /// Searches the upstream's own index. Rate limited like a search.
    pub async fn local_search(&self, identity: &str, keyword: &str) -> Vec<String> {
        if let Some(reply) = self.denied() {
            return vec![reply];
        }
        if let Admission::Limited { wait_secs } = self.rate_limiter.check(identity) {
            return vec![self.messages.render(MessageKey::RateLimited, &[&wait_secs])];
        }
        let keyword = match self.executor.validate(keyword) {
            Ok(keyword) => keyword,
            Err(reply) => return vec![reply],
        };

        vec![self.local.search(keyword).await]
    }
}
