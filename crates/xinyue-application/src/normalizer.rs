//! Turns raw upstream search bodies into [`ResultRecord`] lists.
//!
//! Two wire shapes reach us: a JSON document (a bare array, or an object
//! wrapping one) and a Server-Sent-Events stream whose `data:` lines each
//! carry a JSON fragment. [`decode`] recognizes the shape and can fail on a
//! broken JSON document; [`normalize`] never fails and yields an empty list
//! for anything it cannot read.

use serde_json::{Map, Value};
use thiserror::Error;
use xinyue_core::search::{ResultRecord, SourceEncoding};

/// Object keys that may wrap the result list, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperField {
    Result,
    Data,
    List,
    Items,
}

impl WrapperField {
    pub fn key(self) -> &'static str {
        match self {
            WrapperField::Result => "result",
            WrapperField::Data => "data",
            WrapperField::List => "list",
            WrapperField::Items => "items",
        }
    }
}

const TOP_LEVEL_ORDER: [WrapperField; 3] =
    [WrapperField::Result, WrapperField::Data, WrapperField::List];
/// `{"code": 0, "data": ...}` puts `data` first.
const CODE_ZERO_ORDER: [WrapperField; 3] =
    [WrapperField::Data, WrapperField::Result, WrapperField::List];
/// Keys searched inside a wrapper whose value is itself an object.
const NESTED_ORDER: [WrapperField; 4] = [
    WrapperField::Items,
    WrapperField::List,
    WrapperField::Data,
    WrapperField::Result,
];

/// A recognized upstream body, before record extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
    /// Top-level JSON array.
    List(Vec<Value>),
    /// JSON object with the list under `field`.
    Wrapped { field: WrapperField, items: Vec<Value> },
    /// JSON that carries no list (scalar, or object without a known wrapper).
    Empty,
    /// Values folded from an SSE stream.
    Events(Vec<Value>),
}

impl UpstreamPayload {
    /// Raw values in upstream order.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            UpstreamPayload::List(items)
            | UpstreamPayload::Wrapped { items, .. }
            | UpstreamPayload::Events(items) => items,
            UpstreamPayload::Empty => Vec::new(),
        }
    }

    /// Records in upstream order; values that are not objects are dropped.
    pub fn into_records(self) -> Vec<ResultRecord> {
        let values = self.into_values();
        let total = values.len();
        let records: Vec<_> = values.into_iter().filter_map(ResultRecord::from_value).collect();

        if records.len() < total {
            tracing::debug!(
                "Dropped {} non-object search items",
                total - records.len()
            );
        }
        records
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("search body is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Recognizes the shape of `body` according to its wire encoding.
pub fn decode(body: &str, encoding: SourceEncoding) -> Result<UpstreamPayload, DecodeError> {
    match encoding {
        SourceEncoding::Json => decode_json(body),
        SourceEncoding::Sse => Ok(decode_sse(body)),
    }
}

/// Parses a JSON body and locates its result list.
pub fn decode_json(body: &str) -> Result<UpstreamPayload, DecodeError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
    Ok(unwrap_value(value))
}

/// Locates the result list inside an already-parsed JSON value.
pub fn unwrap_value(value: Value) -> UpstreamPayload {
    match value {
        Value::Array(items) => UpstreamPayload::List(items),
        Value::Object(object) => unwrap_object(object),
        _ => UpstreamPayload::Empty,
    }
}

fn unwrap_object(mut object: Map<String, Value>) -> UpstreamPayload {
    let code_zero = object.get("code").and_then(Value::as_i64) == Some(0);
    let order = if code_zero && object.contains_key(WrapperField::Data.key()) {
        CODE_ZERO_ORDER
    } else {
        TOP_LEVEL_ORDER
    };

    // The first wrapper key present decides, even when it holds no list.
    let Some(field) = order.into_iter().find(|f| object.contains_key(f.key())) else {
        return UpstreamPayload::Empty;
    };

    match object.remove(field.key()) {
        Some(Value::Array(items)) => UpstreamPayload::Wrapped { field, items },
        Some(Value::Object(mut inner)) => NESTED_ORDER
            .into_iter()
            .find_map(|nested| match inner.remove(nested.key()) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .map(|items| UpstreamPayload::Wrapped { field, items })
            .unwrap_or(UpstreamPayload::Empty),
        _ => UpstreamPayload::Empty,
    }
}

/// Folds an SSE body into a value list.
///
/// Only lines starting with `data:` count. `[DONE]`, blank payloads and
/// payloads that fail to parse are skipped. An object with a `url` is one
/// result; an object whose `data` is an array contributes that array; any
/// other object is one result; an array contributes its elements.
pub fn decode_sse(body: &str) -> UpstreamPayload {
    let mut values = Vec::new();
    let mut skipped = 0usize;

    for line in body.lines() {
        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() || payload == "[DONE]" {
            continue;
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(value) => fold_event(value, &mut values),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} unparseable SSE data lines", skipped);
    }
    UpstreamPayload::Events(values)
}

fn fold_event(value: Value, values: &mut Vec<Value>) {
    match value {
        Value::Object(mut object) => {
            if !object.contains_key("url")
                && matches!(object.get("data"), Some(Value::Array(_)))
            {
                if let Some(Value::Array(items)) = object.remove("data") {
                    values.extend(items);
                }
            } else {
                values.push(Value::Object(object));
            }
        }
        Value::Array(items) => values.extend(items),
        _ => {}
    }
}

/// Decodes and extracts records in one step; never fails.
///
/// A body that cannot be decoded yields an empty list and a warning.
pub fn normalize(body: &str, content_type: &str) -> Vec<ResultRecord> {
    match decode(body, SourceEncoding::from_content_type(content_type)) {
        Ok(payload) => payload.into_records(),
        Err(err) => {
            tracing::warn!("Discarding undecodable search body: {}", err);
            Vec::new()
        }
    }
}
