pub mod repl;
pub mod router;
pub mod search;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use xinyue_application::{Gateways, SearchEngine};
use xinyue_infrastructure::http::build_client;
use xinyue_infrastructure::{
    ConfigStorage, ConfiguredEntitlement, HttpCredentialGateway, HttpSearchGateway,
    HttpTransferGateway,
};

/// Loads configuration and wires the HTTP gateways into an engine.
pub fn build_engine(config_path: Option<&Path>) -> Result<SearchEngine> {
    let storage = match config_path {
        Some(path) => ConfigStorage::with_path(path.to_path_buf()),
        None => ConfigStorage::new().context("Failed to resolve config directory")?,
    };
    let config = storage
        .load()
        .with_context(|| format!("Failed to load config from {}", storage.path().display()))?;

    let client = build_client();
    let gateways = Gateways {
        search: Arc::new(HttpSearchGateway::new(&config).with_client(client.clone())),
        credentials: Arc::new(HttpCredentialGateway::new(&config).with_client(client.clone())),
        transfer: Arc::new(HttpTransferGateway::new(&config).with_client(client)),
        entitlement: Arc::new(ConfiguredEntitlement::from_config(&config)),
    };

    Ok(SearchEngine::new(config, gateways))
}

/// Prints engine replies separated by blank lines.
pub fn print_replies(replies: &[String]) {
    for reply in replies {
        println!("{}\n", reply);
    }
}
