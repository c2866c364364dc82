//! Application-wide error types using thiserror.

use bikeshare_common::BikeshareError;
use bikeshare_config::ConfigError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum DashError {
    /// Error from the data, chart or logging layers.
    #[error(transparent)]
    Core(#[from] BikeshareError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking render task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Command line arguments that parse but make no sense together.
    #[error("Invalid arguments: {0}")]
    Usage(String),
}

/// Result type for the dashboard application.
pub type DashResult<T> = Result<T, DashError>;
