//! Core error types for alertwatch-core.
//!
//! One enum per failure domain (fetch, decode, delivery, configuration),
//! all folded into [`CoreError`] so callers can propagate with `?`.
//! None of these are fatal to the running loops; they are logged and the
//! affected cycle is skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for alertwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Feed retrieval failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Feed payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Notification could not be delivered
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Network/transport failures while retrieving the feed.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read
    #[error("request to feed failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request exceeded the configured timeout
    #[error("feed request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The feed answered with a non-success status
    #[error("feed answered with HTTP {status}")]
    Status { status: u16 },
}

/// Malformed feed payloads.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload was empty
    #[error("feed payload is empty")]
    Empty,

    /// The XML declaration names an encoding we do not know
    #[error("unsupported feed charset '{label}'")]
    Charset { label: String },

    /// The document does not match the expected RSS shape
    #[error("malformed feed document: {0}")]
    Xml(#[from] quick_xml::DeError),
}

/// A single item timestamp that does not match the feed timestamp format.
///
/// Only the affected boundary is dropped; the item itself stays in the snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("item '{guid}': cannot parse {field} '{value}': {reason}")]
pub struct TimestampParseError {
    pub guid: String,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

/// Failures of the outbound notification channel.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// No webhook target is configured
    #[error("delivery target is not configured")]
    NotConfigured,

    /// The request could not be sent
    #[error("delivery request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The receiving end refused the message
    #[error("delivery rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status {
                status: status.as_u16(),
            },
            None => FetchError::Transport(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
