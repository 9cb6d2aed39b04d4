//! Assignment models and the derived rows used by workload snapshots,
//! queue projections, rebalancing, and batch candidate selection.

use revq_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `review_assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewAssignment {
    pub id: DbId,
    pub item_id: DbId,
    pub reviewer_id: String,
    pub priority: i32,
    pub status: String,
    pub assigned_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

/// Aggregated pending workload for one reviewer. Derived, never stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkloadRow {
    pub reviewer_id: String,
    pub pending_count: i64,
    pub weighted_workload: i64,
    pub last_assigned_at: Option<Timestamp>,
}

/// A pending queue entry joined with its item, for the reviewer queue view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingQueueRow {
    pub assignment_id: DbId,
    pub item_id: DbId,
    pub title: String,
    pub category: String,
    pub priority: i32,
    pub attachment_count: i32,
    pub contributor_reputation: String,
    pub assigned_at: Timestamp,
    pub submitted_at: Timestamp,
}

/// A pending assignment eligible for rebalancing.
#[derive(Debug, Clone, FromRow)]
pub struct MovableRow {
    pub assignment_id: DbId,
    pub item_id: DbId,
    pub priority: i32,
    pub assigned_at: Timestamp,
    pub transfer_count: i32,
}

/// A batch candidate: a pending assignment joined with item fields the
/// filter predicates and the categorization heuristic read.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CandidateRow {
    pub assignment_id: DbId,
    pub item_id: DbId,
    pub title: String,
    pub category: String,
    pub priority: i32,
    pub attachment_count: i32,
    pub contributor_reputation: String,
    pub waiting_hours: f64,
    pub assigned_at: Timestamp,
}
