//! Application layer for Xinyue.
//!
//! Coordinates the domain types of `xinyue-core` with whatever gateway
//! implementations are injected: rate limiting, searching with retry,
//! per-identity sessions and pagination, and concurrent transfers.

pub mod credential_cache;
pub mod engine;
pub mod local_search;
pub mod normalizer;
pub mod pagination;
pub mod rate_limiter;
pub mod renderer;
pub mod search_executor;
pub mod session_store;
pub mod transfer;

pub use credential_cache::CredentialCache;
pub use engine::{Gateways, SearchEngine};
pub use normalizer::{UpstreamPayload, normalize};
pub use rate_limiter::{Admission, RateLimiter};
pub use session_store::SessionStore;
pub use transfer::TransferOrchestrator;
