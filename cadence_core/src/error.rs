//! Error types for the cadence_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cadence_core operations
///
/// The statistics engine itself is total and never produces one of these;
/// they come from the validation, history and configuration seams.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A cycle observation violated its recorded constraints
    #[error("Invalid cycle observation: {0}")]
    Validation(String),

    /// History file could not be interpreted
    #[error("History error: {0}")]
    History(String),
}
