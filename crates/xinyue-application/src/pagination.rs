//! Page navigation over stored sessions.

use std::sync::Arc;

use xinyue_core::messages::{MessageKey, MessageTable};
use xinyue_core::session::{PageDirection, PageStep};

use crate::renderer::PageRenderer;
use crate::session_store::SessionStore;

/// Moves through an identity's session and renders the page it lands on.
///
/// The identity's session slot stays locked for the whole operation,
/// rendering included.
pub struct Paginator {
    store: Arc<SessionStore>,
    renderer: Arc<PageRenderer>,
    messages: Arc<MessageTable>,
    enabled: bool,
}

impl Paginator {
    pub fn new(
        store: Arc<SessionStore>,
        renderer: Arc<PageRenderer>,
        messages: Arc<MessageTable>,
        enabled: bool,
    ) -> Self {
        Self {
            store,
            renderer,
            messages,
            enabled,
        }
    }

    /// Renders `page` and makes it the current page when it exists.
    pub async fn render(&self, identity: &str, page: usize) -> String {
        let mut slot = self.store.lock(identity).await;
        let Some(session) = slot.as_mut() else {
            return self.messages.get(MessageKey::NoSearchSession).to_string();
        };

        session.jump_to(page);
        self.renderer.render(session, page).await
    }

    /// Steps one page in `direction`.
    ///
    /// Returns `None` when the request is silently dropped: pagination is
    /// disabled, there is no session, or there is only one page.
    pub async fn advance(&self, identity: &str, direction: PageDirection) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let mut slot = self.store.lock(identity).await;
        let session = slot.as_mut()?;

        match session.step(direction) {
            PageStep::Ignored => None,
            PageStep::AtBoundary => {
                let key = match direction {
                    PageDirection::Forward => MessageKey::LastPage,
                    PageDirection::Backward => MessageKey::FirstPage,
                };
                Some(self.messages.get(key).to_string())
            }
            PageStep::Moved(page) => {
                tracing::debug!("'{}' moved to page {}", identity, page);
                Some(self.renderer.render(session, page).await)
            }
        }
    }

    pub async fn next_page(&self, identity: &str) -> Option<String> {
        self.advance(identity, PageDirection::Forward).await
    }

    pub async fn previous_page(&self, identity: &str) -> Option<String> {
        self.advance(identity, PageDirection::Backward).await
    }
}
