//! Repository for the `review_assignments` table and the transfer audit
//! trail.
//!
//! The guarded close (`status = 'pending'` in the WHERE clause) is the
//! single-writer mechanism the whole engine leans on: decides and
//! rebalancing transfers both go through it, so whichever commits first
//! wins and the loser observes a missed update instead of clobbering it.

use revq_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::assignment::{MovableRow, PendingQueueRow, ReviewAssignment};

/// Column list for review_assignments queries.
const COLUMNS: &str = "id, item_id, reviewer_id, priority, status, assigned_at, closed_at";

/// Provides operations over review assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Open a new pending assignment.
    ///
    /// The partial unique index on pending item ids makes a second open
    /// assignment for the same item a constraint violation.
    pub async fn create(
        pool: &PgPool,
        item_id: DbId,
        reviewer_id: &str,
        priority: i32,
    ) -> Result<ReviewAssignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO review_assignments (item_id, reviewer_id, priority)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewAssignment>(&query)
            .bind(item_id)
            .bind(reviewer_id)
            .bind(priority)
            .fetch_one(pool)
            .await
    }

    /// Open a new pending assignment inside an existing transaction
    /// (used by the transfer path).
    pub async fn open_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        item_id: DbId,
        reviewer_id: &str,
        priority: i32,
    ) -> Result<ReviewAssignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO review_assignments (item_id, reviewer_id, priority)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewAssignment>(&query)
            .bind(item_id)
            .bind(reviewer_id)
            .bind(priority)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an assignment by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReviewAssignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM review_assignments WHERE id = $1");
        sqlx::query_as::<_, ReviewAssignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically close a pending assignment, moving it to `to_status`
    /// (`decided` or `transferred`).
    ///
    /// Returns `None` when the assignment was not pending anymore, which
    /// the caller classifies (already decided, transferred, or missing).
    pub async fn close_pending(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        to_status: &str,
    ) -> Result<Option<ReviewAssignment>, sqlx::Error> {
        let query = format!(
            "UPDATE review_assignments
             SET status = $2, closed_at = now()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewAssignment>(&query)
            .bind(id)
            .bind(to_status)
            .fetch_optional(&mut **tx)
            .await
    }

    /// A reviewer's pending assignments joined with item fields for the
    /// queue view. Presentation ordering is applied by the caller.
    pub async fn list_pending_for_reviewer(
        pool: &PgPool,
        reviewer_id: &str,
    ) -> Result<Vec<PendingQueueRow>, sqlx::Error> {
        sqlx::query_as::<_, PendingQueueRow>(
            "SELECT a.id AS assignment_id, i.id AS item_id, i.title, i.category,
                    a.priority, i.attachment_count, i.contributor_reputation,
                    a.assigned_at, i.submitted_at
             FROM review_assignments a
             JOIN review_items i ON i.id = a.item_id
             WHERE a.status = 'pending' AND a.reviewer_id = $1",
        )
        .bind(reviewer_id)
        .fetch_all(pool)
        .await
    }

    /// Pending assignments rebalancing may move away from a reviewer,
    /// with each item's lifetime transfer count.
    pub async fn movable_for_reviewer(
        pool: &PgPool,
        reviewer_id: &str,
    ) -> Result<Vec<MovableRow>, sqlx::Error> {
        sqlx::query_as::<_, MovableRow>(
            "SELECT a.id AS assignment_id, a.item_id, a.priority, a.assigned_at,
                    i.transfer_count
             FROM review_assignments a
             JOIN review_items i ON i.id = a.item_id
             WHERE a.status = 'pending' AND a.reviewer_id = $1",
        )
        .bind(reviewer_id)
        .fetch_all(pool)
        .await
    }
}

/// Provides the rebalancing audit trail.
pub struct TransferRepo;

impl TransferRepo {
    /// Record one executed transfer inside the transfer transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        tx: &mut Transaction<'_, Postgres>,
        item_id: DbId,
        from_assignment_id: DbId,
        to_assignment_id: DbId,
        from_reviewer_id: &str,
        to_reviewer_id: &str,
        reason: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO assignment_transfers
                (item_id, from_assignment_id, to_assignment_id,
                 from_reviewer_id, to_reviewer_id, reason)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(item_id)
        .bind(from_assignment_id)
        .bind(to_assignment_id)
        .bind(from_reviewer_id)
        .bind(to_reviewer_id)
        .bind(reason)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
