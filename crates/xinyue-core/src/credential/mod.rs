//! Short-lived drive credentials ("cookies") issued per backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::backend::Backend;

/// Why a credential could not be obtained.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential probe for {backend} answered status {status}")]
    ProbeRejected { backend: Backend, status: u16 },

    #[error("credential fetch for {backend} answered code {code}")]
    FetchRejected { backend: Backend, code: i64 },

    #[error("credential response for {0} carried no token")]
    MissingToken(Backend),

    #[error("credential request for {0} timed out")]
    Timeout(Backend),

    #[error("credential request for {backend} failed: {message}")]
    Transport { backend: Backend, message: String },

    #[error("credential response for {backend} was malformed: {message}")]
    Malformed { backend: Backend, message: String },
}

/// Service for the credential-issuing endpoint.
///
/// A refresh is two calls: `probe` checks liveness, then `fetch` reads the
/// token value. Neither call caches anything.
#[async_trait]
pub trait CredentialGateway: Send + Sync {
    /// Liveness check; success means the endpoint answered 200.
    async fn probe(&self, backend: Backend) -> Result<(), CredentialError>;

    /// Reads the current token for `backend`.
    async fn fetch(&self, backend: Backend) -> Result<String, CredentialError>;
}
