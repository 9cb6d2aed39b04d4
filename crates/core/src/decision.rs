//! Decision state machine: assignment closure, decision kinds, quality
//! ratings, and category-score validation.
//!
//! The atomic part of a decision (guarded status update plus decision
//! insert) lives in `revq-db`; this module owns everything that can be
//! checked before touching the store.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::item::ItemStatus;

// ---------------------------------------------------------------------------
// AssignmentStatus
// ---------------------------------------------------------------------------

/// Status of a review assignment.
///
/// `Transferred` is a non-terminal audit marker written by rebalancing;
/// it closes the row without producing a decision and is invisible to the
/// performance scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Decided,
    Transferred,
}

impl AssignmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Decided => "decided",
            AssignmentStatus::Transferred => "transferred",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "pending" => Some(AssignmentStatus::Pending),
            "decided" => Some(AssignmentStatus::Decided),
            "transferred" => Some(AssignmentStatus::Transferred),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DecisionKind
// ---------------------------------------------------------------------------

/// Terminal outcome recorded against an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Approved,
    Rejected,
    NeedsRevision,
}

impl DecisionKind {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionKind::Approved => "approved",
            DecisionKind::Rejected => "rejected",
            DecisionKind::NeedsRevision => "needs_revision",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "approved" => Some(DecisionKind::Approved),
            "rejected" => Some(DecisionKind::Rejected),
            "needs_revision" => Some(DecisionKind::NeedsRevision),
            _ => None,
        }
    }

    /// The item status this decision kind transitions the item into.
    pub fn terminal_status(&self) -> ItemStatus {
        match self {
            DecisionKind::Approved => ItemStatus::Approved,
            DecisionKind::Rejected => ItemStatus::Rejected,
            DecisionKind::NeedsRevision => ItemStatus::NeedsRevision,
        }
    }
}

// ---------------------------------------------------------------------------
// QualityRating
// ---------------------------------------------------------------------------

/// Ordinal quality rating attached to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRating {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl QualityRating {
    pub fn label(&self) -> &'static str {
        match self {
            QualityRating::Excellent => "excellent",
            QualityRating::Good => "good",
            QualityRating::Acceptable => "acceptable",
            QualityRating::Poor => "poor",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "excellent" => Some(QualityRating::Excellent),
            "good" => Some(QualityRating::Good),
            "acceptable" => Some(QualityRating::Acceptable),
            "poor" => Some(QualityRating::Poor),
            _ => None,
        }
    }

    /// Numeric value used by the performance scorer.
    pub fn numeric(&self) -> f64 {
        match self {
            QualityRating::Excellent => 1.0,
            QualityRating::Good => 0.8,
            QualityRating::Acceptable => 0.6,
            QualityRating::Poor => 0.2,
        }
    }
}

// ---------------------------------------------------------------------------
// Category scores
// ---------------------------------------------------------------------------

/// The five fixed review categories, in canonical order.
pub const CATEGORY_KEYS: [&str; 5] = [
    "content_accuracy",
    "educational_value",
    "file_quality",
    "organization",
    "appropriateness",
];

/// Per-category numeric scores on a 1-5 scale. All five are required;
/// a payload with a missing key fails deserialization at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub content_accuracy: i32,
    pub educational_value: i32,
    pub file_quality: i32,
    pub organization: i32,
    pub appropriateness: i32,
}

impl CategoryScores {
    pub fn values(&self) -> [i32; 5] {
        [
            self.content_accuracy,
            self.educational_value,
            self.file_quality,
            self.organization,
            self.appropriateness,
        ]
    }

    /// Each score must be an integer 1-5. Zeroed or defaulted payloads are
    /// rejected here so the scorer never consumes synthetic data.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (key, value) in CATEGORY_KEYS.iter().zip(self.values()) {
            if !(1..=5).contains(&value) {
                return Err(CoreError::Validation(format!(
                    "Category score '{key}' must be between 1 and 5, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn average(&self) -> f64 {
        self.values().iter().sum::<i32>() as f64 / 5.0
    }
}

/// Derive a quality rating from the category average when the caller did
/// not supply one explicitly.
pub fn quality_from_average(average: f64) -> QualityRating {
    if average >= 4.5 {
        QualityRating::Excellent
    } else if average >= 3.5 {
        QualityRating::Good
    } else if average >= 2.5 {
        QualityRating::Acceptable
    } else {
        QualityRating::Poor
    }
}

// ---------------------------------------------------------------------------
// Decision validation
// ---------------------------------------------------------------------------

/// Maximum rationale length accepted at the boundary.
const MAX_RATIONALE_LEN: usize = 4000;

/// Maximum number of improvement suggestions per decision.
const MAX_SUGGESTIONS: usize = 10;

/// Validate a decision payload before any state mutation.
///
/// Rules:
/// - Category scores must each be 1-5.
/// - Rejections and revision requests must carry a non-empty rationale,
///   since the contributor has to act on them.
/// - Rationale and suggestion counts are bounded.
pub fn validate_decision(
    kind: DecisionKind,
    rationale: &str,
    suggestions: &[String],
    scores: &CategoryScores,
) -> Result<(), CoreError> {
    scores.validate()?;

    let needs_rationale = matches!(kind, DecisionKind::Rejected | DecisionKind::NeedsRevision);
    if needs_rationale && rationale.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "A '{}' decision requires a rationale",
            kind.label()
        )));
    }
    if rationale.len() > MAX_RATIONALE_LEN {
        return Err(CoreError::Validation(format!(
            "Rationale must not exceed {MAX_RATIONALE_LEN} characters"
        )));
    }
    if suggestions.len() > MAX_SUGGESTIONS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_SUGGESTIONS} suggestions are accepted"
        )));
    }
    if suggestions.iter().any(|s| s.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Suggestions must not be empty strings".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(v: i32) -> CategoryScores {
        CategoryScores {
            content_accuracy: v,
            educational_value: v,
            file_quality: v,
            organization: v,
            appropriateness: v,
        }
    }

    // -- category scores ---------------------------------------------------------

    #[test]
    fn all_zero_scores_rejected() {
        assert!(scores(0).validate().is_err());
    }

    #[test]
    fn out_of_range_score_rejected() {
        let mut s = scores(3);
        s.organization = 6;
        assert!(s.validate().is_err());
    }

    #[test]
    fn in_range_scores_accepted() {
        assert!(scores(1).validate().is_ok());
        assert!(scores(5).validate().is_ok());
    }

    #[test]
    fn average_of_mixed_scores() {
        let s = CategoryScores {
            content_accuracy: 5,
            educational_value: 4,
            file_quality: 4,
            organization: 3,
            appropriateness: 4,
        };
        assert!((s.average() - 4.0).abs() < f64::EPSILON);
    }

    // -- quality derivation --------------------------------------------------------

    #[test]
    fn quality_bands_from_average() {
        assert_eq!(quality_from_average(4.5), QualityRating::Excellent);
        assert_eq!(quality_from_average(4.0), QualityRating::Good);
        assert_eq!(quality_from_average(3.5), QualityRating::Good);
        assert_eq!(quality_from_average(3.0), QualityRating::Acceptable);
        assert_eq!(quality_from_average(2.0), QualityRating::Poor);
    }

    // -- decision validation ---------------------------------------------------------

    #[test]
    fn rejection_without_rationale_fails() {
        let err = validate_decision(DecisionKind::Rejected, "  ", &[], &scores(2));
        assert!(err.is_err());
    }

    #[test]
    fn approval_without_rationale_is_fine() {
        assert!(validate_decision(DecisionKind::Approved, "", &[], &scores(4)).is_ok());
    }

    #[test]
    fn empty_suggestion_rejected() {
        let suggestions = vec!["tighten the summary".to_string(), "".to_string()];
        assert!(
            validate_decision(DecisionKind::NeedsRevision, "see notes", &suggestions, &scores(3))
                .is_err()
        );
    }

    #[test]
    fn too_many_suggestions_rejected() {
        let suggestions: Vec<String> = (0..11).map(|i| format!("point {i}")).collect();
        assert!(
            validate_decision(DecisionKind::Approved, "", &suggestions, &scores(4)).is_err()
        );
    }

    // -- kinds and statuses ------------------------------------------------------------

    #[test]
    fn kind_maps_to_terminal_status() {
        assert_eq!(
            DecisionKind::Approved.terminal_status(),
            ItemStatus::Approved
        );
        assert_eq!(
            DecisionKind::NeedsRevision.terminal_status(),
            ItemStatus::NeedsRevision
        );
    }

    #[test]
    fn assignment_status_labels_round_trip() {
        for s in [
            AssignmentStatus::Pending,
            AssignmentStatus::Decided,
            AssignmentStatus::Transferred,
        ] {
            assert_eq!(AssignmentStatus::from_label(s.label()), Some(s));
        }
    }
}
