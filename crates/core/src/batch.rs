//! Batch operation rules: typed filter predicates, the eligibility gate,
//! selection size limits, and the advisory categorization heuristic.
//!
//! Filters are a tagged predicate type rather than SQL fragments; the
//! persistence layer translates them into parameterized queries and this
//! module can evaluate them directly against in-memory candidates.

use serde::{Deserialize, Serialize};

use crate::actor::ReviewerLevel;
use crate::error::CoreError;
use crate::item::ContributorReputation;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hard ceiling on items in one batch. Larger selections are truncated and
/// the overflow reported as skipped, never silently dropped.
pub const MAX_BATCH_SIZE: usize = 50;

/// Minimum overall performance score for batch eligibility.
pub const MIN_BATCH_SCORE: f64 = 60.0;

/// Minimum lifetime decided-item count for batch eligibility.
pub const MIN_BATCH_DECIDED: u32 = 20;

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Predicate over the item category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CategoryPredicate {
    Equals { value: String },
    InSet { values: Vec<String> },
}

/// Comparison predicate over an integer field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ComparePredicate {
    Equals { value: i64 },
    GreaterThan { value: i64 },
    LessThan { value: i64 },
}

/// Comparison or inclusive-range predicate over a count field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CountPredicate {
    GreaterThan { value: i64 },
    LessThan { value: i64 },
    Range { min: i64, max: i64 },
}

/// One conjunct of a batch selection. All supplied filters must hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "field", content = "predicate", rename_all = "snake_case")]
pub enum BatchFilter {
    Category(CategoryPredicate),
    Priority(ComparePredicate),
    WaitingHours(ComparePredicate),
    AttachmentCount(CountPredicate),
}

impl BatchFilter {
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            BatchFilter::Category(CategoryPredicate::Equals { value }) => {
                if value.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "Category filter value must not be empty".to_string(),
                    ));
                }
            }
            BatchFilter::Category(CategoryPredicate::InSet { values }) => {
                if values.is_empty() {
                    return Err(CoreError::Validation(
                        "Category in-set filter requires at least one value".to_string(),
                    ));
                }
            }
            BatchFilter::AttachmentCount(CountPredicate::Range { min, max }) => {
                if min > max {
                    return Err(CoreError::Validation(format!(
                        "Attachment-count range is inverted: {min} > {max}"
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Candidate fields the pure filter evaluation reads.
#[derive(Debug, Clone)]
pub struct CandidateView {
    pub category: String,
    pub priority: i32,
    pub waiting_hours: f64,
    pub attachment_count: i32,
}

/// Evaluate one filter against a candidate.
pub fn filter_matches(filter: &BatchFilter, candidate: &CandidateView) -> bool {
    match filter {
        BatchFilter::Category(CategoryPredicate::Equals { value }) => candidate.category == *value,
        BatchFilter::Category(CategoryPredicate::InSet { values }) => {
            values.iter().any(|v| *v == candidate.category)
        }
        BatchFilter::Priority(p) => compare_matches(p, candidate.priority as i64),
        BatchFilter::WaitingHours(p) => match p {
            ComparePredicate::Equals { value } => candidate.waiting_hours == *value as f64,
            ComparePredicate::GreaterThan { value } => candidate.waiting_hours > *value as f64,
            ComparePredicate::LessThan { value } => candidate.waiting_hours < *value as f64,
        },
        BatchFilter::AttachmentCount(p) => {
            let n = candidate.attachment_count as i64;
            match p {
                CountPredicate::GreaterThan { value } => n > *value,
                CountPredicate::LessThan { value } => n < *value,
                CountPredicate::Range { min, max } => (*min..=*max).contains(&n),
            }
        }
    }
}

fn compare_matches(p: &ComparePredicate, actual: i64) -> bool {
    match p {
        ComparePredicate::Equals { value } => actual == *value,
        ComparePredicate::GreaterThan { value } => actual > *value,
        ComparePredicate::LessThan { value } => actual < *value,
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// How a batch call names its items: an explicit id list or a conjunction
/// of filters evaluated over the actor's own pending assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSelection {
    Ids(Vec<DbId>),
    Criteria(Vec<BatchFilter>),
}

impl BatchSelection {
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            BatchSelection::Ids(ids) => {
                if ids.is_empty() {
                    return Err(CoreError::Validation(
                        "Batch selection must name at least one item".to_string(),
                    ));
                }
            }
            BatchSelection::Criteria(filters) => {
                if filters.is_empty() {
                    return Err(CoreError::Validation(
                        "Batch criteria must include at least one filter".to_string(),
                    ));
                }
                for filter in filters {
                    filter.validate()?;
                }
            }
        }
        Ok(())
    }
}

/// Truncate a selection to [`MAX_BATCH_SIZE`], returning the kept items and
/// the number cut off.
pub fn truncate_selection<T>(mut items: Vec<T>) -> (Vec<T>, usize) {
    if items.len() > MAX_BATCH_SIZE {
        let skipped = items.len() - MAX_BATCH_SIZE;
        items.truncate(MAX_BATCH_SIZE);
        (items, skipped)
    } else {
        (items, 0)
    }
}

// ---------------------------------------------------------------------------
// Eligibility gate
// ---------------------------------------------------------------------------

/// Hard authorization boundary for batch operations.
///
/// All three conditions must hold; the error names the first one that
/// failed so the front-end can render an actionable message.
pub fn check_batch_eligibility(
    level: ReviewerLevel,
    overall_score: f64,
    decided_count: u32,
) -> Result<(), CoreError> {
    if !level.qualifies_for_batch() {
        return Err(CoreError::InsufficientEligibility(format!(
            "reviewer level '{}' does not qualify (requires experienced or above)",
            level.label()
        )));
    }
    if overall_score < MIN_BATCH_SCORE {
        return Err(CoreError::InsufficientEligibility(format!(
            "performance score {overall_score:.1} is below the required {MIN_BATCH_SCORE}"
        )));
    }
    if decided_count < MIN_BATCH_DECIDED {
        return Err(CoreError::InsufficientEligibility(format!(
            "{decided_count} lifetime decisions is below the required {MIN_BATCH_DECIDED}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Advisory categorization
// ---------------------------------------------------------------------------

/// Advisory bucket suggested for a batch candidate. Purely informational
/// for the front-end; the engine never applies a decision from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchCategory {
    BulkApprovable,
    NeedsAttention,
    QuickRejectable,
    RequiresIndividualReview,
}

/// Inputs to the categorization heuristic.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub attachment_count: i32,
    pub waiting_hours: f64,
    pub contributor_reputation: ContributorReputation,
}

/// Bucket a candidate for batch suggestions. Checked in fixed order so
/// overlapping conditions resolve deterministically.
pub fn categorize_candidate(profile: &CandidateProfile) -> BatchCategory {
    let trusted = matches!(
        profile.contributor_reputation,
        ContributorReputation::Verified | ContributorReputation::Expert
    );
    if profile.attachment_count >= 5 && profile.waiting_hours > 48.0 && trusted {
        return BatchCategory::BulkApprovable;
    }
    if profile.attachment_count < 2 || profile.waiting_hours > 168.0 {
        return BatchCategory::NeedsAttention;
    }
    if profile.attachment_count < 3
        && profile.contributor_reputation == ContributorReputation::New
    {
        return BatchCategory::QuickRejectable;
    }
    BatchCategory::RequiresIndividualReview
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn candidate(category: &str, priority: i32, waiting: f64, attachments: i32) -> CandidateView {
        CandidateView {
            category: category.to_string(),
            priority,
            waiting_hours: waiting,
            attachment_count: attachments,
        }
    }

    // -- filters ------------------------------------------------------------

    #[test]
    fn category_equals_and_in_set() {
        let c = candidate("science", 2, 10.0, 3);
        assert!(filter_matches(
            &BatchFilter::Category(CategoryPredicate::Equals {
                value: "science".to_string()
            }),
            &c
        ));
        assert!(filter_matches(
            &BatchFilter::Category(CategoryPredicate::InSet {
                values: vec!["math".to_string(), "science".to_string()]
            }),
            &c
        ));
        assert!(!filter_matches(
            &BatchFilter::Category(CategoryPredicate::Equals {
                value: "math".to_string()
            }),
            &c
        ));
    }

    #[test]
    fn priority_comparisons() {
        let c = candidate("x", 3, 1.0, 1);
        assert!(filter_matches(
            &BatchFilter::Priority(ComparePredicate::GreaterThan { value: 2 }),
            &c
        ));
        assert!(filter_matches(
            &BatchFilter::Priority(ComparePredicate::Equals { value: 3 }),
            &c
        ));
        assert!(!filter_matches(
            &BatchFilter::Priority(ComparePredicate::LessThan { value: 3 }),
            &c
        ));
    }

    #[test]
    fn attachment_range_is_inclusive() {
        let c = candidate("x", 1, 1.0, 5);
        let range = BatchFilter::AttachmentCount(CountPredicate::Range { min: 5, max: 7 });
        assert!(filter_matches(&range, &c));
        let below = candidate("x", 1, 1.0, 4);
        assert!(!filter_matches(&range, &below));
    }

    #[test]
    fn inverted_range_rejected() {
        let bad = BatchFilter::AttachmentCount(CountPredicate::Range { min: 7, max: 5 });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn empty_in_set_rejected() {
        let bad = BatchFilter::Category(CategoryPredicate::InSet { values: vec![] });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn empty_selection_rejected() {
        assert!(BatchSelection::Ids(vec![]).validate().is_err());
        assert!(BatchSelection::Criteria(vec![]).validate().is_err());
        assert!(BatchSelection::Ids(vec![1]).validate().is_ok());
    }

    #[test]
    fn selection_json_shapes() {
        let ids: BatchSelection = serde_json::from_str(r#"{"ids": [1, 2, 3]}"#).unwrap();
        assert_matches!(ids, BatchSelection::Ids(v) if v == vec![1, 2, 3]);

        let criteria: BatchSelection = serde_json::from_str(
            r#"{"criteria": [
                {"field": "category", "predicate": {"op": "equals", "value": "math"}},
                {"field": "waiting_hours", "predicate": {"op": "greater_than", "value": 48}}
            ]}"#,
        )
        .unwrap();
        assert_matches!(criteria, BatchSelection::Criteria(f) if f.len() == 2);
    }

    // -- truncation ------------------------------------------------------------

    #[test]
    fn oversized_selection_truncates_and_reports() {
        let items: Vec<i64> = (0..60).collect();
        let (kept, skipped) = truncate_selection(items);
        assert_eq!(kept.len(), MAX_BATCH_SIZE);
        assert_eq!(skipped, 10);
    }

    #[test]
    fn small_selection_not_truncated() {
        let (kept, skipped) = truncate_selection(vec![1, 2, 3]);
        assert_eq!(kept.len(), 3);
        assert_eq!(skipped, 0);
    }

    // -- eligibility gate ----------------------------------------------------------

    #[test]
    fn level_failure_blocks_even_with_high_score() {
        let err = check_batch_eligibility(ReviewerLevel::New, 80.0, 50);
        assert_matches!(err, Err(CoreError::InsufficientEligibility(_)));
    }

    #[test]
    fn score_failure_blocks() {
        let err = check_batch_eligibility(ReviewerLevel::Experienced, 59.0, 30);
        assert_matches!(err, Err(CoreError::InsufficientEligibility(_)));
    }

    #[test]
    fn count_failure_blocks() {
        let err = check_batch_eligibility(ReviewerLevel::Expert, 90.0, 19);
        assert_matches!(err, Err(CoreError::InsufficientEligibility(_)));
    }

    #[test]
    fn qualified_reviewer_passes() {
        assert!(check_batch_eligibility(ReviewerLevel::Experienced, 61.0, 25).is_ok());
    }

    // -- categorization -------------------------------------------------------------

    fn profile(attachments: i32, waiting: f64, rep: ContributorReputation) -> CandidateProfile {
        CandidateProfile {
            attachment_count: attachments,
            waiting_hours: waiting,
            contributor_reputation: rep,
        }
    }

    #[test]
    fn bulk_approvable_needs_trust_volume_and_age() {
        assert_eq!(
            categorize_candidate(&profile(6, 50.0, ContributorReputation::Verified)),
            BatchCategory::BulkApprovable
        );
        // Same shape from an unverified contributor is not bulk approvable.
        assert_ne!(
            categorize_candidate(&profile(6, 50.0, ContributorReputation::Established)),
            BatchCategory::BulkApprovable
        );
    }

    #[test]
    fn sparse_or_stale_items_need_attention() {
        assert_eq!(
            categorize_candidate(&profile(1, 10.0, ContributorReputation::Verified)),
            BatchCategory::NeedsAttention
        );
        assert_eq!(
            categorize_candidate(&profile(4, 200.0, ContributorReputation::Established)),
            BatchCategory::NeedsAttention
        );
    }

    #[test]
    fn thin_submissions_from_new_contributors_quick_rejectable() {
        assert_eq!(
            categorize_candidate(&profile(2, 10.0, ContributorReputation::New)),
            BatchCategory::QuickRejectable
        );
    }

    #[test]
    fn everything_else_requires_individual_review() {
        assert_eq!(
            categorize_candidate(&profile(3, 10.0, ContributorReputation::Established)),
            BatchCategory::RequiresIndividualReview
        );
    }
}
