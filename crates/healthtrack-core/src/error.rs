//! Core error types for healthtrack-core.
//!
//! Each concern gets its own thiserror enum; `CoreError` aggregates them
//! so callers can use `?` across module boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for healthtrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local JSON storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote API errors (food database, cloud backend)
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Run tracking state errors
    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the per-day JSON document store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read a document
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a document
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document exists but is not valid JSON for its type
    #[error("Corrupt document {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No data directory could be determined
    #[error("Data directory unavailable: {0}")]
    NoDataDir(String),
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

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from HTTP-backed services.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {service}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Unexpected response from {service}: {message}")]
    BadResponse {
        service: &'static str,
        message: String,
    },

    /// Operation requires a signed-in user
    #[error("Not authenticated with cloud backend")]
    NotAuthenticated,

    /// Credential storage failure
    #[error("Credential store error: {0}")]
    Keyring(String),
}

/// Run tracking state machine errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrackingError {
    #[error("No run in progress")]
    NotRunning,

    #[error("A run is already in progress")]
    AlreadyRunning,

    #[error("Run is not paused")]
    NotPaused,

    #[error("Run is already paused")]
    AlreadyPaused,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// No record with this id in the day's document
    #[error("No food record with id {0}")]
    UnknownRecord(uuid::Uuid),

    /// No run with this id in the day's document
    #[error("No run with id {0}")]
    UnknownRun(uuid::Uuid),

    /// Out of bounds
    #[error("Value {value} out of range for '{field}' ({min}..={max})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<keyring::Error> for ApiError {
    fn from(err: keyring::Error) -> Self {
        ApiError::Keyring(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
