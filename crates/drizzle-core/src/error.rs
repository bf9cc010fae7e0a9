//! Error types for Drizzle

use thiserror::Error;

/// The main error type for Drizzle operations
#[derive(Debug, Error)]
pub enum DrizzleError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Physics error: {0}")]
    PhysicsError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Engine has been torn down")]
    TornDown,
}

/// Result type alias for Drizzle operations
pub type Result<T> = std::result::Result<T, DrizzleError>;

impl From<toml::de::Error> for DrizzleError {
    fn from(err: toml::de::Error) -> Self {
        DrizzleError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for DrizzleError {
    fn from(err: toml::ser::Error) -> Self {
        DrizzleError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for DrizzleError {
    fn from(err: serde_json::Error) -> Self {
        DrizzleError::JsonError(err.to_string())
    }
}
