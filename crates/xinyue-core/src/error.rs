//! Error types for the Xinyue search engine.

use thiserror::Error;

/// Failures that escape a component boundary.
///
/// Expected upstream outcomes of a search call (404, 429, timeouts) are not
/// errors; see [`crate::search::SearchOutcome`].
#[derive(Error, Debug, Clone)]
pub enum XinyueError {
    #[error("IO error: {message}")]
    Io { message: String },

    /// Malformed configuration file.
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The license gate refused the caller.
    #[error("Entitlement error: {0}")]
    Entitlement(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl XinyueError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<toml::de::Error> for XinyueError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, XinyueError>`.
pub type Result<T> = std::result::Result<T, XinyueError>;
