//! Domain error types

use thiserror::Error;

/// Error when parsing a maximum recording length
#[derive(Debug, Clone, Error)]
#[error("Invalid max hours: \"{input}\". Expected a positive whole number of hours (e.g., 1, 2h)")]
pub struct MaxHoursParseError {
    pub input: String,
}

/// Error when a download link target cannot be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUrlError {
    #[error("Link target is not a data URL")]
    NotADataUrl,

    #[error("Data URL has no payload")]
    MissingPayload,

    #[error("Data URL is not base64 encoded")]
    NotBase64,

    #[error("Data URL payload is invalid: {0}")]
    InvalidPayload(String),
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
