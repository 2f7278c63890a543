//! Configuration-backed entitlement gate.

use xinyue_core::config::EngineConfig;
use xinyue_core::entitlement::EntitlementGate;
use xinyue_core::error::{Result, XinyueError};

/// Grants service when a license token is configured or trial use is
/// allowed. Token contents are not verified here.
#[derive(Debug, Clone)]
pub struct ConfiguredEntitlement {
    license_token: Option<String>,
    allow_trial: bool,
}

impl ConfiguredEntitlement {
    pub fn new(license_token: Option<String>, allow_trial: bool) -> Self {
        Self {
            license_token: license_token.filter(|token| !token.trim().is_empty()),
            allow_trial,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.license_token.clone(), config.allow_trial)
    }
}

impl EntitlementGate for ConfiguredEntitlement {
    fn check(&self) -> Result<()> {
        if self.license_token.is_some() || self.allow_trial {
            Ok(())
        } else {
            Err(XinyueError::Entitlement(
                "no license token configured and trial use is disabled".to_string(),
            ))
        }
    }
}
