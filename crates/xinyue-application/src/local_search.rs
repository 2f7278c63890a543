//! Search of the upstream's own index, rendered as a numbered listing.

use std::sync::Arc;

use serde_json::Value;
use xinyue_core::backend::Backend;
use xinyue_core::messages::{MessageKey, MessageTable};
use xinyue_core::search::{ResultRecord, SearchGateway, SearchOutcome};

use crate::normalizer;

const UPSTREAM_OK: i64 = 200;
const UNKNOWN_BACKEND: &str = "Unknown";

/// Runs local-index searches. No retry, no session.
pub struct LocalSearch {
    gateway: Arc<dyn SearchGateway>,
    messages: Arc<MessageTable>,
}

impl LocalSearch {
    pub fn new(gateway: Arc<dyn SearchGateway>, messages: Arc<MessageTable>) -> Self {
        Self { gateway, messages }
    }

    /// One-shot lookup; any failure becomes a single reply line.
    pub async fn search(&self, keyword: &str) -> String {
        let keyword = keyword.trim();
        match self.gateway.local_search(keyword).await {
            SearchOutcome::Body { body, .. } => match hits(&body) {
                Some(records) if !records.is_empty() => self.listing(keyword, &records),
                Some(_) => self.messages.render(MessageKey::LocalNoResults, &[&keyword]),
                None => {
                    tracing::warn!("Local search for '{}' returned an unreadable body", keyword);
                    self.messages.get(MessageKey::LocalFailed).to_string()
                }
            },
            SearchOutcome::NotFound | SearchOutcome::Timeout => {
                self.messages.render(MessageKey::LocalNoResults, &[&keyword])
            }
            other => {
                tracing::warn!("Local search for '{}' failed: {:?}", keyword, other);
                self.messages.get(MessageKey::LocalFailed).to_string()
            }
        }
    }

    fn listing(&self, keyword: &str, records: &[ResultRecord]) -> String {
        let default_title = self.messages.get(MessageKey::DefaultTitle);
        let mut any_temporary = false;

        let lines: Vec<String> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let label = record
                    .url
                    .as_deref()
                    .and_then(Backend::match_url)
                    .map(Backend::label)
                    .unwrap_or(UNKNOWN_BACKEND);
                let mut title = record.title_or(default_title).to_string();
                if is_temporary(record) {
                    any_temporary = true;
                    title.push_str(self.messages.get(MessageKey::LocalTemporaryTag));
                }
                let url = record.url.as_deref().unwrap_or_default();
                self.messages
                    .render(MessageKey::LocalLine, &[&(i + 1), &label, &title, &url])
            })
            .collect();

        let separator = self.messages.get(MessageKey::ResultsSeparator);
        let mut sections = vec![
            self.messages.render(MessageKey::LocalHeader, &[&records.len()]),
            lines.join("\n\n"),
            separator.to_string(),
        ];
        if any_temporary {
            sections.push(self.messages.get(MessageKey::LocalTemporaryNote).to_string());
        }
        sections.push(self.messages.render(MessageKey::LocalHint, &[&keyword]));
        sections.join("\n\n")
    }
}

/// Records from a local-index envelope, or `None` if the body is not JSON.
///
/// A JSON body whose `code` is present and not 200 counts as no hits.
fn hits(body: &str) -> Option<Vec<ResultRecord>> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("code").and_then(Value::as_i64) {
        Some(code) if code != UPSTREAM_OK => {
            tracing::debug!("Local search answered code {}", code);
            return Some(Vec::new());
        }
        _ => {}
    }
    Some(normalizer::unwrap_value(value).into_records())
}

fn is_temporary(record: &ResultRecord) -> bool {
    match record.field("is_time") {
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "1",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hits_shapes() {
        let body = json!({"code": 200, "data": {"items": [{"title": "a"}]}}).to_string();
        assert_eq!(hits(&body).unwrap().len(), 1);

        let body = json!({"code": 200, "data": [{"title": "a"}, {"title": "b"}]}).to_string();
        assert_eq!(hits(&body).unwrap().len(), 2);

        let body = json!({"code": 500, "data": [{"title": "a"}]}).to_string();
        assert!(hits(&body).unwrap().is_empty());

        assert!(hits("<html>").is_none());
    }

    #[test]
    fn test_temporary_marker() {
        let temp = ResultRecord::from_value(json!({"title": "t", "is_time": 1})).unwrap();
        let kept = ResultRecord::from_value(json!({"title": "k", "is_time": 0})).unwrap();
        assert!(is_temporary(&temp));
        assert!(!is_temporary(&kept));
    }
}
