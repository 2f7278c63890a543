//! Shared HTTP client setup for the upstream gateways.

use reqwest::Client;

/// Browser-like user agent; some upstream deployments reject bare clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// `code` value upstream uses to signal success in JSON envelopes.
pub const UPSTREAM_OK: i64 = 200;

/// Builds the client shared by all gateways. Deadlines are set per request.
pub fn build_client() -> Client {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Falling back to default HTTP client: {}", err);
            Client::new()
        })
}

/// Joins a base URL and an endpoint path with exactly one slash.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
