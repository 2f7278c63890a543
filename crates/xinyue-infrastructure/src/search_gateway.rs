//! HTTP implementation of the search gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERER};
use reqwest::{Client, RequestBuilder, StatusCode};

use xinyue_core::backend::SearchTarget;
use xinyue_core::config::{EndpointConfig, EngineConfig};
use xinyue_core::search::{SearchGateway, SearchOutcome, SearchRequest};

use crate::http::{build_client, join_url};

const LOCAL_PAGE_SIZE: u32 = 10;

/// Search gateway that talks to the upstream search API over HTTP.
///
/// Each call is a single attempt bounded by its own timeout; the outcome is
/// classified into [`SearchOutcome`] instead of surfacing `reqwest` errors.
#[derive(Clone)]
pub struct HttpSearchGateway {
    client: Client,
    base_url: String,
    api_key: String,
    endpoints: EndpointConfig,
    search_timeout: Duration,
    local_timeout: Duration,
}

impl HttpSearchGateway {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            client: build_client(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            endpoints: config.endpoints.clone(),
            search_timeout: config.search_timeout(),
            local_timeout: config.local_search_timeout(),
        }
    }

    /// Replaces the underlying client (shared connection pool).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Endpoint URL and query pairs for a search request.
    fn search_query(&self, request: &SearchRequest) -> (String, Vec<(&'static str, String)>) {
        match request.target {
            SearchTarget::FullNetwork => (
                join_url(&self.base_url, &self.endpoints.all_search),
                vec![("title", request.keyword.clone())],
            ),
            SearchTarget::Narrow(narrow) => (
                join_url(&self.base_url, &self.endpoints.search),
                vec![
                    ("title", request.keyword.clone()),
                    ("is_type", narrow.code().to_string()),
                    ("is_show", "1".to_string()),
                ],
            ),
        }
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(ACCEPT, "text/event-stream")
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8")
            .header(REFERER, format!("{}/", self.base_url))
            .header(ORIGIN, &self.base_url);

        if self.api_key.is_empty() {
            builder
        } else {
            builder.header(AUTHORIZATION, format!("Bearer {}", self.api_key))
        }
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        timeout: Duration,
    ) -> SearchOutcome {
        tracing::debug!("GET {} ({} query params)", url, query.len());

        let request = self
            .with_headers(self.client.get(url))
            .query(query)
            .timeout(timeout);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => return SearchOutcome::Timeout,
            Err(err) => return SearchOutcome::Transport(err.to_string()),
        };

        match response.status() {
            StatusCode::OK => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();

                match response.text().await {
                    Ok(body) => SearchOutcome::Body { content_type, body },
                    Err(err) if err.is_timeout() => SearchOutcome::Timeout,
                    Err(err) => SearchOutcome::Unreadable(err.to_string()),
                }
            }
            StatusCode::NOT_FOUND => SearchOutcome::NotFound,
            StatusCode::TOO_MANY_REQUESTS => SearchOutcome::TooManyRequests,
            status => SearchOutcome::Status(status.as_u16()),
        }
    }
}

#[async_trait]
impl SearchGateway for HttpSearchGateway {
    async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let (url, query) = self.search_query(request);
        self.get(&url, &query, self.search_timeout).await
    }

    async fn local_search(&self, keyword: &str) -> SearchOutcome {
        let url = join_url(&self.base_url, &self.endpoints.local_search);
        let query = vec![
            ("title", keyword.to_string()),
            ("page", "1".to_string()),
            ("page_size", LOCAL_PAGE_SIZE.to_string()),
        ];
        self.get(&url, &query, self.local_timeout).await
    }
}
