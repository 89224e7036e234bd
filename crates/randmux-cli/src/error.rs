//! CLI error types.

use randmux_core::RandomError;
use thiserror::Error;

/// Startup and runtime errors for the `randmux` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A stream operation was rejected.
    #[error("random stream error: {0}")]
    Random(#[from] RandomError),

    /// A report could not be serialized.
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
}
