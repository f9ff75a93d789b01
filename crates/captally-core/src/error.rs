// Rust guideline compliant 2026-10-17

//! Error types for the Captally core library.

use thiserror::Error;

/// Result type alias for Captally operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Captally operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value or file.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Revision history could not be queried.
    #[error("History error: {0}")]
    History(String),
}
