//! Error types for the probe CLI
//!
//! Errors here are harness-level failures: bad configuration, an unreachable
//! service, a report that cannot be written. Assertion failures against the
//! remote API are never errors; they are recorded as data by the recorder.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the probe CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Transport Errors ===
    #[error("No response from {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Unknown step '{name}'. Available steps: {available}")]
    UnknownStep { name: String, available: String },

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write report '{path}': {error}")]
    ReportWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a transport error for a request that never got a response
    pub fn transport(url: &str, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an unknown step error listing the valid names
    pub fn unknown_step<S: AsRef<str>>(name: &str, available: &[S]) -> Self {
        Self::UnknownStep {
            name: name.to_string(),
            available: available
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
