//! Search domain models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Wire encoding of a search response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEncoding {
    Json,
    Sse,
}

impl SourceEncoding {
    /// Dispatches on the `Content-Type` header; anything that is not an
    /// event stream is treated as JSON.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type
            .to_ascii_lowercase()
            .contains("text/event-stream")
        {
            Self::Sse
        } else {
            Self::Json
        }
    }
}

/// A single search hit.
///
/// `title` and `url` are lifted out of the upstream object; every other
/// field is carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
            extra: Map::new(),
        }
    }

    /// Builds a record from an upstream JSON object.
    ///
    /// Returns `None` for non-object values. A `title` or `url` that is not a
    /// string stays in `extra`; an empty `url` counts as absent.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut extra) = value else {
            return None;
        };

        let title = take_string(&mut extra, "title");
        let url = take_string(&mut extra, "url").filter(|u| !u.trim().is_empty());

        Some(Self { title, url, extra })
    }

    /// Title, or the given fallback when upstream sent none.
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(fallback)
    }

    /// The percent-decoded `pwd` query parameter of the share URL, if any.
    pub fn share_code(&self) -> Option<String> {
        let url = Url::parse(self.url.as_deref()?).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "pwd")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    /// Passthrough field lookup.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) => match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_type_dispatch() {
        assert_eq!(
            SourceEncoding::from_content_type("text/event-stream; charset=utf-8"),
            SourceEncoding::Sse
        );
        assert_eq!(
            SourceEncoding::from_content_type("application/json"),
            SourceEncoding::Json
        );
        assert_eq!(SourceEncoding::from_content_type(""), SourceEncoding::Json);
    }

    #[test]
    fn test_from_value_keeps_passthrough_fields() {
        let record = ResultRecord::from_value(json!({
            "title": "Movie",
            "url": "https://pan.quark.cn/s/1",
            "is_time": 1,
            "size": "2GB"
        }))
        .unwrap();

        assert_eq!(record.title.as_deref(), Some("Movie"));
        assert_eq!(record.url.as_deref(), Some("https://pan.quark.cn/s/1"));
        assert_eq!(record.field("is_time"), Some(&json!(1)));
        assert!(record.field("title").is_none());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(ResultRecord::from_value(json!("just a string")).is_none());
        assert!(ResultRecord::from_value(json!([1, 2])).is_none());
    }

    #[test]
    fn test_empty_url_is_absent() {
        let record = ResultRecord::from_value(json!({"title": "x", "url": ""})).unwrap();
        assert!(record.url.is_none());
    }

    #[test]
    fn test_share_code() {
        let record = ResultRecord::new("t", "https://pan.baidu.com/s/1abc?pwd=x9y8&from=share");
        assert_eq!(record.share_code().as_deref(), Some("x9y8"));

        let record = ResultRecord::new("t", "https://pan.quark.cn/s/1abc");
        assert_eq!(record.share_code(), None);
    }

    #[test]
    fn test_share_code_is_percent_decoded() {
        let record = ResultRecord::new("t", "https://pan.baidu.com/s/1abc?pwd=a%2Bb%20c#frag");
        assert_eq!(record.share_code().as_deref(), Some("a+b c"));

        let record = ResultRecord::new("t", "https://pan.baidu.com/s/1abc?pwd=a+b");
        assert_eq!(record.share_code().as_deref(), Some("a b"));

        let record = ResultRecord::new("t", "https://pan.baidu.com/s/1abc?pwd=");
        assert_eq!(record.share_code(), None);

        let record = ResultRecord::new("t", "not a url?pwd=zz");
        assert_eq!(record.share_code(), None);
    }

    #[test]
    fn test_title_fallback() {
        let record = ResultRecord::from_value(json!({"url": "https://pan.quark.cn/s/1"})).unwrap();
        assert_eq!(record.title_or("Untitled"), "Untitled");
    }
}
