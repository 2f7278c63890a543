//! Transfer (re-host and re-share) of a found resource.

use async_trait::async_trait;
use thiserror::Error;

use crate::backend::Backend;
use crate::credential::CredentialError;

/// A single transfer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub url: String,
    /// Share code taken from the `pwd` query parameter, empty when absent.
    pub code: String,
    pub backend: Backend,
}

/// Fresh share information returned by a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub title: String,
    pub share_url: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Upstream answered 200 but refused, with its own message.
    #[error("transfer rejected: {0}")]
    Rejected(String),

    #[error("transfer service answered status {0}")]
    Status(u16),

    #[error("transfer timed out")]
    Timeout,

    #[error("transfer request failed: {0}")]
    Transport(String),

    #[error("transfer response was malformed: {0}")]
    Malformed(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Service for the upstream transfer endpoint.
#[async_trait]
pub trait TransferGateway: Send + Sync {
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError>;
}
