//! Error types for the decision engine.
//!
//! Scoring itself never fails; these errors only arise at the edges, where
//! snapshots are looked up, parameters validated or state serialized.

use thiserror::Error;

use crate::agent::CivId;

/// Result type alias using [`CasusError`].
pub type Result<T> = std::result::Result<T, CasusError>;

/// Top-level error type for the decision engine.
#[derive(Debug, Error)]
pub enum CasusError {
    /// Civilization is not part of the snapshot.
    #[error("Unknown civilization: {0}")]
    UnknownCiv(CivId),

    /// Scoring parameters failed validation.
    #[error("Invalid scoring parameters: {}", .0.join("; "))]
    InvalidParameters(Vec<String>),

    /// Invalid snapshot state.
    #[error("Invalid world state: {0}")]
    InvalidState(String),
}
