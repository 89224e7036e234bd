//! Engine state snapshots.

use serde::{Deserialize, Serialize};

use crate::error::RandomError;

/// Serializable snapshot of a PRNG engine's internal state.
///
/// The fields are opaque to everything except the engine that produced the
/// snapshot: an algorithm identifier, the engine's key material, a stream
/// selector and a position counter. Loading a snapshot back into an engine of
/// the same algorithm resumes its sequence exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    algorithm: String,
    key: Vec<u8>,
    stream: u64,
    position: u128,
}

impl EngineState {
    /// Creates a snapshot from its raw parts.
    #[must_use]
    pub fn new(algorithm: impl Into<String>, key: Vec<u8>, stream: u64, position: u128) -> Self {
        Self {
            algorithm: algorithm.into(),
            key,
            stream,
            position,
        }
    }

    /// Identifier of the algorithm that produced this snapshot.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Engine key material.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Stream selector.
    #[must_use]
    pub fn stream(&self) -> u64 {
        self.stream
    }

    /// Position within the stream.
    #[must_use]
    pub fn position(&self) -> u128 {
        self.position
    }

    /// Fails unless this snapshot was produced by `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::IncompatibleState` on an algorithm mismatch.
    pub fn expect_algorithm(&self, algorithm: &str) -> Result<(), RandomError> {
        if self.algorithm == algorithm {
            Ok(())
        } else {
            Err(RandomError::IncompatibleState {
                expected: algorithm.to_owned(),
                found: self.algorithm.clone(),
            })
        }
    }

    /// Serializes the snapshot to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `RandomError::InvalidArgument` if serialization fails.
    pub fn to_json(&self) -> Result<String, RandomError> {
        serde_json::to_string(self)
            .map_err(|e| RandomError::invalid(format!("state serialization failed: {e}")))
    }

    /// Parses a snapshot previously written by [`EngineState::to_json`].
    ///
    /// # Errors
    ///
    /// Returns `RandomError::InvalidArgument` if `json` is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, RandomError> {
        serde_json::from_str(json)
            .map_err(|e| RandomError::invalid(format!("state deserialization failed: {e}")))
    }
}
