//! HTTP implementation of the transfer gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use xinyue_core::config::EngineConfig;
use xinyue_core::transfer::{TransferError, TransferGateway, TransferReceipt, TransferRequest};

use crate::http::{UPSTREAM_OK, build_client, join_url};

/// Temporary resource (the upstream deletes it after a while).
const EXPIRED_TYPE_TEMPORARY: u8 = 2;
/// Transfer and share, rather than only reading resource info.
const MODE_TRANSFER_AND_SHARE: u8 = 0;
/// Ask upstream to record the result in its own index.
const PERSIST: u8 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferBody<'a> {
    url: &'a str,
    code: &'a str,
    expired_type: u8,
    mode: u8,
    api_key: &'a str,
    persist: u8,
}

#[derive(Debug, Deserialize)]
struct TransferResponse {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<TransferData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferData {
    title: String,
    #[serde(alias = "share_url")]
    share_url: String,
}

#[derive(Clone)]
pub struct HttpTransferGateway {
    client: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpTransferGateway {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            client: build_client(),
            url: join_url(&config.base_url, &config.endpoints.transfer),
            api_key: config.api_key.clone(),
            timeout: config.transfer_timeout(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

fn into_receipt(response: TransferResponse) -> Result<TransferReceipt, TransferError> {
    if response.code != UPSTREAM_OK {
        return Err(TransferError::Rejected(
            response
                .message
                .unwrap_or_else(|| format!("upstream code {}", response.code)),
        ));
    }

    let data = response
        .data
        .ok_or_else(|| TransferError::Malformed("success without data".to_string()))?;

    Ok(TransferReceipt {
        title: data.title,
        share_url: data.share_url,
    })
}

#[async_trait]
impl TransferGateway for HttpTransferGateway {
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        if self.api_key.is_empty() {
            return Err(TransferError::Rejected("API key is not configured".to_string()));
        }

        let body = TransferBody {
            url: &request.url,
            code: &request.code,
            expired_type: EXPIRED_TYPE_TEMPORARY,
            mode: MODE_TRANSFER_AND_SHARE,
            api_key: &self.api_key,
            persist: PERSIST,
        };

        tracing::debug!("POST {} ({} resource)", self.url, request.backend);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    TransferError::Timeout
                } else {
                    TransferError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransferError::Status(status.as_u16()));
        }

        let envelope: TransferResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                TransferError::Timeout
            } else {
                TransferError::Malformed(err.to_string())
            }
        })?;

        into_receipt(envelope)
    }
}
