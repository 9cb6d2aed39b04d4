//! Assignment of newly submitted items to reviewers.

use revq_core::actor::ReviewerId;
use revq_core::error::CoreError;
use revq_core::workload::{select_reviewer, WorkloadSnapshot};
use revq_db::models::assignment::ReviewAssignment;
use revq_db::models::review_item::ReviewItem;
use revq_db::models::WorkloadRow;
use revq_db::repositories::{AssignmentRepo, ReviewerRepo};
use revq_events::{ReviewEvent, EVENT_ITEM_ASSIGNED};

use crate::error::AppResult;
use crate::state::AppState;

/// Convert aggregate rows into the snapshot shape the pure selection and
/// rebalancing functions consume.
pub fn to_snapshots(rows: Vec<WorkloadRow>) -> Vec<WorkloadSnapshot> {
    rows.into_iter()
        .map(|row| WorkloadSnapshot {
            reviewer_id: ReviewerId::new(row.reviewer_id),
            pending_count: row.pending_count.max(0) as u32,
            weighted_workload: row.weighted_workload,
            last_assigned_at: row.last_assigned_at,
        })
        .collect()
}

/// Bind a pending item to the least-loaded eligible reviewer.
///
/// Fails with [`CoreError::NoEligibleReviewer`] when every reviewer sits at
/// or above the workload ceiling; the item stays persisted and unassigned.
pub async fn assign_item(state: &AppState, item: &ReviewItem) -> AppResult<ReviewAssignment> {
    let snapshots = to_snapshots(ReviewerRepo::workload_snapshots(&state.pool).await?);

    let picked = select_reviewer(&snapshots, state.config.workload_ceiling)
        .ok_or(CoreError::NoEligibleReviewer)?;

    let assignment = AssignmentRepo::create(
        &state.pool,
        item.id,
        picked.reviewer_id.as_str(),
        item.priority,
    )
    .await?;

    state.event_bus.publish(
        ReviewEvent::new(EVENT_ITEM_ASSIGNED)
            .with_item(item.id)
            .with_assignment(assignment.id)
            .with_actor(picked.reviewer_id.as_str())
            .with_payload(serde_json::json!({ "priority": item.priority })),
    );

    tracing::info!(
        item_id = item.id,
        reviewer_id = %picked.reviewer_id,
        assignment_id = assignment.id,
        "Item assigned"
    );

    Ok(assignment)
}
