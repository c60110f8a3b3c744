//! Error taxonomy for the plan engine's service boundary.
//!
//! Three classes: missing records, rejected input (nothing persisted), and
//! failures propagated from the catalog or persistence store. Store errors
//! arrive as `anyhow::Error` with their context chain intact and convert
//! via `?`.

use thiserror::Error;

/// Failure classes reported by plan operations.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A referenced plan, collection, or settings record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Required input was missing or invalid; no persistence was performed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A catalog or persistence call failed; the underlying message is
    /// surfaced to the caller, without retry.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl PlanError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
