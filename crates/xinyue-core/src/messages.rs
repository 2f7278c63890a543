//! User-facing message table.
//!
//! Every reply the engine produces is looked up here by [`MessageKey`] and
//! filled with positional arguments (`{0}`, `{1}`, ...). Operators may
//! override any text through the `messages` section of the configuration;
//! the key set and the substitution points are fixed.

use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageKey {
    Searching,
    NoResults,
    RateLimited,
    EmptyKeyword,
    KeywordTooLong,
    ParseFailed,
    TooManyRequests,
    ServiceUnavailable,
    Timeout,
    NetworkError,
    TemporarilyUnavailable,
    LastPage,
    FirstPage,
    InvalidPageNumber,
    NoSearchSession,
    FormatFailed,
    ResultsHeader,
    ResultsSeparator,
    ResultsFooter,
    ResultsPromo,
    PageInfo,
    Navigation,
    DefaultTitle,
    ResultLine,
    ResultTitleLine,
    TransferredLine,
    TransferFailedLine,
    ProcessingFailed,
    TransferDisabled,
    ApiKeyRequired,
    NoSearchForTransfer,
    SearchExpired,
    InvalidResourceIndex,
    NoValidLink,
    UnsupportedBackend,
    Transferring,
    TransferSucceeded,
    TransferFailed,
    TransferServiceError,
    TransferTimeout,
    CredentialUnavailable,
    LocalNoResults,
    LocalHeader,
    LocalLine,
    LocalTemporaryTag,
    LocalTemporaryNote,
    LocalHint,
    LocalFailed,
    EntitlementDenied,
}

impl MessageKey {
    /// Built-in text for this key.
    pub fn default_text(self) -> &'static str {
        use MessageKey::*;
        match self {
            Searching => "Searching the whole network, please wait...",
            NoResults => "No resources found for '{0}'\n\nTip: try searching another drive",
            RateLimited => "Too many requests, please retry in {0} seconds",
            EmptyKeyword => "Search keyword cannot be empty",
            KeywordTooLong => "Search keyword is too long (more than {0} characters)",
            ParseFailed => "Failed to parse search results",
            TooManyRequests => "Requests are too frequent, please try again later",
            ServiceUnavailable => "Search service unavailable (status={0})",
            Timeout => "Search timed out, please try again later",
            NetworkError => "Network error, please check the connection",
            TemporarilyUnavailable => "Search service temporarily unavailable",
            LastPage => "Already on the last page",
            FirstPage => "Already on the first page",
            InvalidPageNumber => "Page number out of range, total pages: {0}",
            NoSearchSession => "No search session found, please search first",
            FormatFailed => "Failed to format search results",
            ResultsHeader => "Found {0} resources:",
            ResultsSeparator => "──────────────",
            ResultsFooter => "Links are valid for 5 minutes, search again once expired",
            ResultsPromo => "More resources at {0}",
            PageInfo => "Page {0}/{1}",
            Navigation => "Reply \"prev/next\" or \"0/1\" to turn pages",
            DefaultTitle => "Untitled",
            ResultLine => "{0}. {1}\nLink: {2}",
            ResultTitleLine => "{0}. {1}",
            TransferredLine => "{0}. {1}\nLink: {2}",
            TransferFailedLine => "{0}. {1}\nTransfer failed, try searching another drive",
            ProcessingFailed => "Processing failed",
            TransferDisabled => "Transfer is disabled",
            ApiKeyRequired => "An API key is required to transfer resources",
            NoSearchForTransfer => "No search results available to transfer",
            SearchExpired => "Search session expired, please search again",
            InvalidResourceIndex => "Invalid resource index, enter a number between 1 and {0}",
            NoValidLink => "This resource has no valid share link",
            UnsupportedBackend => "Transfer is not supported for this drive",
            Transferring => "Transferring \"{0}\", please wait...",
            TransferSucceeded => "Transfer succeeded\nTitle: {0}\nShare link: {1}",
            TransferFailed => "Transfer failed: {0}",
            TransferServiceError => "Transfer service error (status={0})",
            TransferTimeout => "Transfer timed out, please try again later",
            CredentialUnavailable => "Drive credentials are unavailable, please contact the operator",
            LocalNoResults => "No local resources found for '{0}'\n\nTip: try a full network search",
            LocalHeader => "Found {0} local resources:",
            LocalLine => "{0}. [{1}] {2}\nLink: {3}",
            LocalTemporaryTag => " (temporary)",
            LocalTemporaryNote => "Network-sourced resources are removed after 30 minutes",
            LocalHint => "Not satisfied? Run a full network search for '{0}'",
            LocalFailed => "Local search failed, please try again later",
            EntitlementDenied => "This service is not licensed",
        }
    }
}

/// Resolved message texts, defaults merged with operator overrides.
#[derive(Debug, Clone)]
pub struct MessageTable {
    entries: HashMap<MessageKey, String>,
}

impl Default for MessageTable {
    fn default() -> Self {
        let entries = MessageKey::iter()
            .map(|key| (key, key.default_text().to_string()))
            .collect();
        Self { entries }
    }
}

impl MessageTable {
    /// Builds a table from defaults plus overrides keyed by snake_case name.
    ///
    /// Unknown keys are skipped with a warning.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut table = Self::default();
        for (name, text) in overrides {
            match name.parse::<MessageKey>() {
                Ok(key) => {
                    table.entries.insert(key, text.clone());
                }
                Err(_) => {
                    tracing::warn!("Ignoring override for unknown message key '{}'", name);
                }
            }
        }
        table
    }

    /// Raw text for a key, placeholders untouched.
    pub fn get(&self, key: MessageKey) -> &str {
        self.entries
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_text())
    }

    /// Text for a key with `{n}` replaced by the n-th argument.
    pub fn render(&self, key: MessageKey, args: &[&dyn Display]) -> String {
        substitute(self.get(key), args)
    }
}

/// Replaces `{0}`, `{1}`, ... in `template`; placeholders without a matching
/// argument are left as-is.
pub fn substitute(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|idx| (idx, close)));

        match placeholder {
            Some((idx, close)) if idx < args.len() => {
                out.push_str(&args[idx].to_string());
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
