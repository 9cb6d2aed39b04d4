//! Review item lifecycle: status transitions, priority, urgency, and
//! contributor reputation tiers.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest accepted priority level.
pub const MIN_PRIORITY: i32 = 1;

/// Highest accepted priority level.
pub const MAX_PRIORITY: i32 = 4;

/// Maximum length of an item title.
const MAX_TITLE_LEN: usize = 256;

/// Maximum length of an item category label.
const MAX_CATEGORY_LEN: usize = 64;

/// Pending longer than this is annotated `urgent`.
pub const URGENT_AFTER_HOURS: f64 = 24.0;

/// Pending longer than this is annotated `overdue`.
pub const OVERDUE_AFTER_HOURS: f64 = 72.0;

/// Lifetime cap on how many times one item may be transferred between
/// reviewers by rebalancing. Bounds churn.
pub const MAX_ITEM_TRANSFERS: i32 = 3;

// ---------------------------------------------------------------------------
// ItemStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a review item.
///
/// `PendingReview` is the only non-terminal state. A `needs_revision`
/// outcome invites a resubmission, which is a brand-new item id, never a
/// re-entry into this item's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    PendingReview,
    Approved,
    Rejected,
    NeedsRevision,
}

impl ItemStatus {
    /// Stable string label as stored in the `review_items` table.
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::PendingReview => "pending_review",
            ItemStatus::Approved => "approved",
            ItemStatus::Rejected => "rejected",
            ItemStatus::NeedsRevision => "needs_revision",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "pending_review" => Some(ItemStatus::PendingReview),
            "approved" => Some(ItemStatus::Approved),
            "rejected" => Some(ItemStatus::Rejected),
            "needs_revision" => Some(ItemStatus::NeedsRevision),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemStatus::PendingReview)
    }
}

/// Legal target statuses from a given status.
pub fn valid_transitions(from: ItemStatus) -> &'static [ItemStatus] {
    match from {
        ItemStatus::PendingReview => &[
            ItemStatus::Approved,
            ItemStatus::Rejected,
            ItemStatus::NeedsRevision,
        ],
        // Terminal states have no outgoing transitions.
        ItemStatus::Approved | ItemStatus::Rejected | ItemStatus::NeedsRevision => &[],
    }
}

pub fn can_transition(from: ItemStatus, to: ItemStatus) -> bool {
    valid_transitions(from).contains(&to)
}

pub fn validate_transition(from: ItemStatus, to: ItemStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Illegal item transition: {} -> {}",
            from.label(),
            to.label()
        )))
    }
}

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// Presentation-only urgency annotation derived from pending age.
/// Carries no side effects and is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Urgent,
    Overdue,
}

/// Classify how long an assignment has been pending.
pub fn classify_urgency(pending_hours: f64) -> Urgency {
    if pending_hours > OVERDUE_AFTER_HOURS {
        Urgency::Overdue
    } else if pending_hours > URGENT_AFTER_HOURS {
        Urgency::Urgent
    } else {
        Urgency::Normal
    }
}

// ---------------------------------------------------------------------------
// Contributor reputation
// ---------------------------------------------------------------------------

/// Reputation tier of the contributor who submitted an item.
///
/// Informs the advisory batch categorization only; it never gates anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorReputation {
    New,
    Established,
    Verified,
    Expert,
}

impl ContributorReputation {
    pub fn label(&self) -> &'static str {
        match self {
            ContributorReputation::New => "new",
            ContributorReputation::Established => "established",
            ContributorReputation::Verified => "verified",
            ContributorReputation::Expert => "expert",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "new" => Some(ContributorReputation::New),
            "established" => Some(ContributorReputation::Established),
            "verified" => Some(ContributorReputation::Verified),
            "expert" => Some(ContributorReputation::Expert),
            _ => None,
        }
    }

    /// Tier from the contributor's lifetime approved-item count.
    pub fn from_approved_count(approved: u32) -> Self {
        if approved >= 25 {
            ContributorReputation::Expert
        } else if approved >= 10 {
            ContributorReputation::Verified
        } else if approved >= 3 {
            ContributorReputation::Established
        } else {
            ContributorReputation::New
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a priority level is within the accepted range.
pub fn validate_priority(priority: i32) -> Result<(), CoreError> {
    if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {priority}"
        )))
    }
}

/// Validate an item title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Item title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Item title must not exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an item category label.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if category.trim().is_empty() {
        return Err(CoreError::Validation(
            "Item category must not be empty".to_string(),
        ));
    }
    if category.len() > MAX_CATEGORY_LEN {
        return Err(CoreError::Validation(format!(
            "Item category must not exceed {MAX_CATEGORY_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- transitions -----------------------------------------------------------

    #[test]
    fn pending_can_reach_all_terminals() {
        for to in [
            ItemStatus::Approved,
            ItemStatus::Rejected,
            ItemStatus::NeedsRevision,
        ] {
            assert!(can_transition(ItemStatus::PendingReview, to));
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [
            ItemStatus::Approved,
            ItemStatus::Rejected,
            ItemStatus::NeedsRevision,
        ] {
            assert!(valid_transitions(from).is_empty());
            assert!(validate_transition(from, ItemStatus::PendingReview).is_err());
        }
    }

    #[test]
    fn status_labels_round_trip() {
        for s in [
            ItemStatus::PendingReview,
            ItemStatus::Approved,
            ItemStatus::Rejected,
            ItemStatus::NeedsRevision,
        ] {
            assert_eq!(ItemStatus::from_label(s.label()), Some(s));
        }
    }

    // -- urgency ----------------------------------------------------------------

    #[test]
    fn urgency_bands() {
        assert_eq!(classify_urgency(0.5), Urgency::Normal);
        assert_eq!(classify_urgency(24.0), Urgency::Normal);
        assert_eq!(classify_urgency(24.1), Urgency::Urgent);
        assert_eq!(classify_urgency(72.0), Urgency::Urgent);
        assert_eq!(classify_urgency(72.1), Urgency::Overdue);
    }

    // -- reputation --------------------------------------------------------------

    #[test]
    fn reputation_thresholds() {
        assert_eq!(
            ContributorReputation::from_approved_count(0),
            ContributorReputation::New
        );
        assert_eq!(
            ContributorReputation::from_approved_count(3),
            ContributorReputation::Established
        );
        assert_eq!(
            ContributorReputation::from_approved_count(10),
            ContributorReputation::Verified
        );
        assert_eq!(
            ContributorReputation::from_approved_count(25),
            ContributorReputation::Expert
        );
    }

    // -- validation ----------------------------------------------------------------

    #[test]
    fn priority_bounds() {
        assert!(validate_priority(MIN_PRIORITY).is_ok());
        assert!(validate_priority(MAX_PRIORITY).is_ok());
        assert!(validate_priority(0).is_err());
        assert!(validate_priority(5).is_err());
    }

    #[test]
    fn empty_title_rejected() {
        assert!(validate_title("  ").is_err());
        assert!(validate_title("Algebra worksheet pack").is_ok());
    }

    #[test]
    fn oversized_category_rejected() {
        assert!(validate_category(&"c".repeat(65)).is_err());
        assert!(validate_category("mathematics").is_ok());
    }
}
