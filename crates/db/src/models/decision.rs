//! Decision models and the anonymized stat rows consumed by the
//! performance scorer.

use revq_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `decisions` table. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Decision {
    pub id: DbId,
    pub assignment_id: DbId,
    pub item_id: DbId,
    pub reviewer_id: String,
    pub kind: String,
    pub quality: String,
    pub rationale: String,
    pub suggestions: Vec<String>,
    pub score_content_accuracy: i32,
    pub score_educational_value: i32,
    pub score_file_quality: i32,
    pub score_organization: i32,
    pub score_appropriateness: i32,
    pub latency_hours: f64,
    pub decided_at: Timestamp,
}

/// DTO for inserting a decision inside the decide transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDecision {
    pub assignment_id: DbId,
    pub item_id: DbId,
    pub reviewer_id: String,
    pub kind: String,
    pub quality: String,
    pub rationale: String,
    pub suggestions: Vec<String>,
    pub score_content_accuracy: i32,
    pub score_educational_value: i32,
    pub score_file_quality: i32,
    pub score_organization: i32,
    pub score_appropriateness: i32,
    pub latency_hours: f64,
}

/// Scorer input row: one decision with identity-bearing fields reduced to
/// the measures the scoring math needs.
#[derive(Debug, Clone, FromRow)]
pub struct DecisionStatRow {
    pub kind: String,
    pub quality: String,
    pub latency_hours: f64,
    pub rationale_len: i32,
    pub suggestion_count: i32,
    pub decided_at: Timestamp,
}
