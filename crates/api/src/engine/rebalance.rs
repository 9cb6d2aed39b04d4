//! Workload rebalancing: a periodic background pass plus the manual
//! trigger exposed to queue administrators.
//!
//! Planning is pure (`revq_core::workload::plan_rebalance`); this module
//! reads the snapshots, prefetches movable assignments for overloaded
//! reviewers, and executes each planned move with the same guarded close a
//! decide uses. A move that loses a race against a concurrent decision is
//! skipped, never forced.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use revq_core::actor::ReviewerId;
use revq_core::decision::AssignmentStatus;
use revq_core::types::DbId;
use revq_core::workload::{mean_weighted_workload, plan_rebalance, MovableAssignment};
use revq_db::repositories::{AssignmentRepo, ReviewItemRepo, ReviewerRepo, TransferRepo};
use revq_db::DbPool;
use revq_events::{EventBus, ReviewEvent, EVENT_ASSIGNMENT_TRANSFERRED};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::engine::assignment::to_snapshots;
use crate::error::AppResult;

/// Audit reason recorded for rebalancing transfers.
const TRANSFER_REASON: &str = "rebalance";

/// One transfer that actually committed.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutedTransfer {
    pub item_id: DbId,
    pub closed_assignment_id: DbId,
    pub new_assignment_id: DbId,
    pub from_reviewer_id: String,
    pub to_reviewer_id: String,
}

/// Periodic rebalancing task.
pub struct Rebalancer {
    pool: DbPool,
    event_bus: Arc<EventBus>,
    interval: Duration,
    overload_factor: f64,
}

impl Rebalancer {
    pub fn new(
        pool: DbPool,
        event_bus: Arc<EventBus>,
        interval: Duration,
        overload_factor: f64,
    ) -> Self {
        Self {
            pool,
            event_bus,
            interval,
            overload_factor,
        }
    }

    /// Run until cancelled. The first tick fires after one full interval so
    /// startup never races migrations or the health check.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;

        tracing::info!(interval_secs = self.interval.as_secs(), "Rebalancer started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Rebalancer shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    match rebalance_once(&self.pool, &self.event_bus, self.overload_factor).await {
                        Ok(transfers) if !transfers.is_empty() => {
                            tracing::info!(count = transfers.len(), "Rebalancing pass moved assignments");
                        }
                        Ok(_) => {}
                        Err(err) => {
                            tracing::error!(error = %err, "Rebalancing pass failed");
                        }
                    }
                }
            }
        }
    }
}

/// One full rebalancing pass: snapshot, plan, execute.
pub async fn rebalance_once(
    pool: &DbPool,
    event_bus: &EventBus,
    overload_factor: f64,
) -> AppResult<Vec<ExecutedTransfer>> {
    let snapshots = to_snapshots(ReviewerRepo::workload_snapshots(pool).await?);
    let threshold = mean_weighted_workload(&snapshots) * overload_factor;

    // Prefetch movable assignments only for reviewers the plan can pull from.
    let mut movable: HashMap<ReviewerId, Vec<MovableAssignment>> = HashMap::new();
    for snapshot in &snapshots {
        if snapshot.weighted_workload as f64 > threshold {
            let rows =
                AssignmentRepo::movable_for_reviewer(pool, snapshot.reviewer_id.as_str()).await?;
            movable.insert(
                snapshot.reviewer_id.clone(),
                rows.into_iter()
                    .map(|row| MovableAssignment {
                        assignment_id: row.assignment_id,
                        item_id: row.item_id,
                        priority: row.priority,
                        assigned_at: row.assigned_at,
                        transfer_count: row.transfer_count,
                    })
                    .collect(),
            );
        }
    }

    let plan = plan_rebalance(
        &snapshots,
        |id| movable.get(id).cloned().unwrap_or_default(),
        overload_factor,
    );

    let mut executed = Vec::with_capacity(plan.len());
    for transfer in plan {
        let mut tx = pool.begin().await?;

        let closed = AssignmentRepo::close_pending(
            &mut tx,
            transfer.assignment_id,
            AssignmentStatus::Transferred.label(),
        )
        .await?;
        let Some(closed) = closed else {
            // Decided (or moved) since the snapshot; drop this move.
            tracing::debug!(
                assignment_id = transfer.assignment_id,
                "Skipping transfer of assignment no longer pending"
            );
            continue;
        };

        let opened = AssignmentRepo::open_in_tx(
            &mut tx,
            transfer.item_id,
            transfer.to.as_str(),
            transfer.priority,
        )
        .await?;
        ReviewItemRepo::increment_transfer_count(&mut tx, transfer.item_id).await?;
        TransferRepo::record(
            &mut tx,
            transfer.item_id,
            closed.id,
            opened.id,
            transfer.from.as_str(),
            transfer.to.as_str(),
            TRANSFER_REASON,
        )
        .await?;

        tx.commit().await?;

        event_bus.publish(
            ReviewEvent::new(EVENT_ASSIGNMENT_TRANSFERRED)
                .with_item(transfer.item_id)
                .with_assignment(opened.id)
                .with_payload(serde_json::json!({
                    "from": transfer.from.as_str(),
                    "to": transfer.to.as_str(),
                    "closed_assignment_id": closed.id,
                })),
        );

        executed.push(ExecutedTransfer {
            item_id: transfer.item_id,
            closed_assignment_id: closed.id,
            new_assignment_id: opened.id,
            from_reviewer_id: transfer.from.as_str().to_string(),
            to_reviewer_id: transfer.to.as_str().to_string(),
        });
    }

    Ok(executed)
}
