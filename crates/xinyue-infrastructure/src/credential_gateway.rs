//! HTTP implementation of the credential gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use xinyue_core::backend::Backend;
use xinyue_core::config::EngineConfig;
use xinyue_core::credential::{CredentialError, CredentialGateway};

use crate::http::{UPSTREAM_OK, build_client, join_url};

/// Envelope of `GET {base}/credential/{backend}`.
#[derive(Debug, Deserialize)]
struct CredentialResponse {
    code: i64,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

#[derive(Clone)]
pub struct HttpCredentialGateway {
    client: Client,
    base_url: String,
    path: String,
    timeout: Duration,
}

impl HttpCredentialGateway {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            client: build_client(),
            base_url: config.base_url.clone(),
            path: config.endpoints.credential.clone(),
            timeout: config.credential_timeout(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, backend: Backend) -> String {
        join_url(&join_url(&self.base_url, &self.path), backend.as_ref())
    }

    async fn send(&self, backend: Backend) -> Result<reqwest::Response, CredentialError> {
        self.client
            .get(self.url(backend))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| map_transport(backend, err))
    }
}

fn map_transport(backend: Backend, err: reqwest::Error) -> CredentialError {
    if err.is_timeout() {
        CredentialError::Timeout(backend)
    } else {
        CredentialError::Transport {
            backend,
            message: err.to_string(),
        }
    }
}

/// Pulls `{backend}_token` out of a decoded envelope.
fn extract_token(backend: Backend, response: CredentialResponse) -> Result<String, CredentialError> {
    if response.code != UPSTREAM_OK {
        return Err(CredentialError::FetchRejected {
            backend,
            code: response.code,
        });
    }

    let key = format!("{}_token", backend);
    response
        .data
        .as_ref()
        .and_then(|data| data.get(&key))
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(CredentialError::MissingToken(backend))
}

#[async_trait]
impl CredentialGateway for HttpCredentialGateway {
    async fn probe(&self, backend: Backend) -> Result<(), CredentialError> {
        let response = self.send(backend).await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(CredentialError::ProbeRejected {
                backend,
                status: status.as_u16(),
            }),
        }
    }

    async fn fetch(&self, backend: Backend) -> Result<String, CredentialError> {
        let response = self.send(backend).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(CredentialError::FetchRejected {
                backend,
                code: i64::from(status.as_u16()),
            });
        }

        let envelope: CredentialResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                CredentialError::Timeout(backend)
            } else {
                CredentialError::Malformed {
                    backend,
                    message: err.to_string(),
                }
            }
        })?;

        let token = extract_token(backend, envelope)?;
        tracing::debug!("Fetched {} credential ({} chars)", backend, token.len());
        Ok(token)
    }
}
