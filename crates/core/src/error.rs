//! Domain error taxonomy.
//!
//! Every error a caller can act on has its own variant carrying the ids
//! needed to render an actionable message. The API layer maps these onto
//! HTTP statuses; this crate stays transport-agnostic.

use crate::types::DbId;

/// Domain-level error for the review engine.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup failed.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The actor lacks the permission the operation requires.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Input failed validation before any state mutation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The assignment was already closed by an earlier decision.
    ///
    /// Never downgraded to a silent success: accepting a second decide
    /// would double-count in performance scoring.
    #[error("Assignment {assignment_id} has already been decided")]
    AlreadyDecided { assignment_id: DbId },

    /// The acting reviewer does not own the assignment.
    #[error("Assignment {assignment_id} is not owned by the acting reviewer")]
    NotOwner { assignment_id: DbId },

    /// The actor does not meet the batch-operation eligibility gate.
    #[error("Not eligible for batch operations: {0}")]
    InsufficientEligibility(String),

    /// No reviewer can currently accept a new assignment. Retryable.
    #[error("No eligible reviewer is available")]
    NoEligibleReviewer,

    /// An invariant the engine relies on was broken.
    #[error("Internal error: {0}")]
    Internal(String),
}
