//! Row models and create DTOs for the persistence layer.

pub mod assignment;
pub mod decision;
pub mod review_item;
pub mod reviewer;

pub use assignment::{
    CandidateRow, MovableRow, PendingQueueRow, ReviewAssignment, WorkloadRow,
};
pub use decision::{CreateDecision, Decision, DecisionStatRow};
pub use review_item::{CreateReviewItem, ReviewItem};
pub use reviewer::{CreateReviewer, Reviewer};
