//! Engine configuration model.
//!
//! Every field has a default so a partial (or missing) config file yields a
//! working engine. Loading from disk lives in `xinyue-infrastructure`.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XinyueError};
use crate::messages::MessageTable;

pub const DEFAULT_BASE_URL: &str = "https://youdomain.com";

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_retries: u32,
    pub search_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
    pub credential_timeout_secs: u64,
    pub local_search_timeout_secs: u64,
    pub page_size: usize,
    pub enable_transfer: bool,
    pub enable_pagination: bool,
    pub transfer_delay_secs: u64,
    pub credential_ttl_secs: u64,
    pub max_keyword_chars: usize,
    pub rate_limit: RateLimitConfig,
    pub endpoints: EndpointConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_token: Option<String>,
    pub allow_trial: bool,
    /// Overrides keyed by message name (e.g. `last_page`).
    pub messages: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            max_retries: 3,
            search_timeout_secs: 10,
            transfer_timeout_secs: 30,
            credential_timeout_secs: 10,
            local_search_timeout_secs: 5,
            page_size: 5,
            enable_transfer: true,
            enable_pagination: true,
            transfer_delay_secs: 1,
            credential_ttl_secs: 300,
            max_keyword_chars: 50,
            rate_limit: RateLimitConfig::default(),
            endpoints: EndpointConfig::default(),
            license_token: None,
            allow_trial: true,
            messages: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Checks invariants the engine relies on and normalizes the base URL.
    pub fn validated(mut self) -> Result<Self> {
        if self.page_size == 0 {
            return Err(XinyueError::config("page_size must be at least 1"));
        }
        if self.max_retries == 0 {
            return Err(XinyueError::config("max_retries must be at least 1"));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(XinyueError::config(
                "rate_limit.max_requests must be at least 1",
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(XinyueError::config("base_url must not be empty"));
        }
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Transfer needs both the switch and an API key.
    pub fn transfer_active(&self) -> bool {
        self.enable_transfer && !self.api_key.is_empty()
    }

    pub fn message_table(&self) -> MessageTable {
        MessageTable::with_overrides(&self.messages)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }

    pub fn credential_timeout(&self) -> Duration {
        Duration::from_secs(self.credential_timeout_secs)
    }

    pub fn local_search_timeout(&self) -> Duration {
        Duration::from_secs(self.local_search_timeout_secs)
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_secs)
    }

    pub fn transfer_delay(&self) -> Duration {
        Duration::from_secs(self.transfer_delay_secs)
    }
}

/// Sliding-window admission limits per identity.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Upstream endpoint paths, relative to `base_url`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct EndpointConfig {
    pub search: String,
    pub all_search: String,
    pub local_search: String,
    pub credential: String,
    pub transfer: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            search: "/search".to_string(),
            all_search: "/all_search".to_string(),
            local_search: "/search/index".to_string(),
            credential: "/credential".to_string(),
            transfer: "/transfer".to_string(),
        }
    }
}
