pub mod config_storage;
pub mod credential_gateway;
pub mod entitlement;
pub mod http;
pub mod paths;
pub mod search_gateway;
pub mod transfer_gateway;

pub use crate::config_storage::ConfigStorage;
pub use crate::credential_gateway::HttpCredentialGateway;
pub use crate::entitlement::ConfiguredEntitlement;
pub use crate::paths::XinyuePaths;
pub use crate::search_gateway::HttpSearchGateway;
pub use crate::transfer_gateway::HttpTransferGateway;
