pub mod backend;
pub mod config;
pub mod credential;
pub mod entitlement;
pub mod error;
pub mod messages;
pub mod search;
pub mod session;
pub mod transfer;

// Re-export common types
pub use backend::{Backend, SearchTarget};
pub use config::EngineConfig;
pub use error::{Result, XinyueError};
pub use messages::{MessageKey, MessageTable};
pub use search::{ResultRecord, SourceEncoding};
pub use session::Session;
