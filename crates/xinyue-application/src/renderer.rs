//! Composes one rendered result page.

use std::fmt::Write;
use std::sync::Arc;

use xinyue_core::error::{Result, XinyueError};
use xinyue_core::messages::{MessageKey, MessageTable};
use xinyue_core::session::Session;

use crate::transfer::TransferOrchestrator;

/// Frames a page of result lines with header, footer and page info.
pub struct PageRenderer {
    messages: Arc<MessageTable>,
    transfers: TransferOrchestrator,
    base_url: String,
    show_page_info: bool,
}

impl PageRenderer {
    pub fn new(
        messages: Arc<MessageTable>,
        transfers: TransferOrchestrator,
        base_url: impl Into<String>,
        show_page_info: bool,
    ) -> Self {
        Self {
            messages,
            transfers,
            base_url: base_url.into(),
            show_page_info,
        }
    }

    pub fn transfers(&self) -> &TransferOrchestrator {
        &self.transfers
    }

    /// Renders `page` of `session`. Does not move the current page.
    ///
    /// Empty sessions and out-of-range pages produce their own messages;
    /// a formatting failure produces the generic format-failed text.
    pub async fn render(&self, session: &Session, page: usize) -> String {
        match self.try_render(session, page).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!("Failed to render page {}: {}", page, err);
                self.messages.get(MessageKey::FormatFailed).to_string()
            }
        }
    }

    async fn try_render(&self, session: &Session, page: usize) -> Result<String> {
        if session.is_empty() {
            return Ok(self
                .messages
                .render(MessageKey::NoResults, &[&session.keyword()]));
        }

        let Some(range) = session.page_range(page) else {
            return Ok(self
                .messages
                .render(MessageKey::InvalidPageNumber, &[&session.total_pages()]));
        };

        let lines = self
            .transfers
            .render_page(&session.results()[range.clone()], range.start)
            .await;

        self.frame(session, page, &lines)
            .map_err(|err| XinyueError::render(err.to_string()))
    }

    fn frame(&self, session: &Session, page: usize, lines: &[String]) -> std::result::Result<String, std::fmt::Error> {
        let separator = self.messages.get(MessageKey::ResultsSeparator);
        let mut out = String::new();

        writeln!(
            out,
            "{}\n",
            self.messages
                .render(MessageKey::ResultsHeader, &[&session.results().len()])
        )?;
        writeln!(out, "{}\n", lines.join("\n\n"))?;
        writeln!(out, "{}", separator)?;
        writeln!(out, "{}", self.messages.get(MessageKey::ResultsFooter))?;
        writeln!(out, "{}", separator)?;
        writeln!(
            out,
            "{}",
            self.messages.render(MessageKey::ResultsPromo, &[&self.base_url])
        )?;
        write!(out, "{}", separator)?;

        if self.show_page_info {
            write!(
                out,
                "\n{}\n{}",
                self.messages
                    .render(MessageKey::PageInfo, &[&page, &session.total_pages()]),
                self.messages.get(MessageKey::Navigation)
            )?;
        }

        Ok(out)
    }
}
