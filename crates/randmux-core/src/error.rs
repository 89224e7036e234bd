//! Error types.

use thiserror::Error;

/// Top-level error type for random stream operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RandomError {
    /// A caller-supplied range, element type or serialized state was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A snapshot cannot be loaded into the engine it was handed to.
    #[error("incompatible engine state: expected {expected}, found {found}")]
    IncompatibleState {
        /// What the engine accepts.
        expected: String,
        /// What the snapshot contained.
        found: String,
    },
}

impl RandomError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
