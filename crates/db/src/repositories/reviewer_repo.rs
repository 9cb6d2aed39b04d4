//! Repository for the `reviewers` table and derived workload snapshots.

use revq_core::actor::Permission;
use sqlx::PgPool;

use crate::models::reviewer::{CreateReviewer, Reviewer};
use crate::models::WorkloadRow;

/// Column list for reviewers queries.
const COLUMNS: &str = "id, level, permissions, active, created_at";

/// Provides operations over registered reviewers.
pub struct ReviewerRepo;

impl ReviewerRepo {
    /// Register a reviewer, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateReviewer) -> Result<Reviewer, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviewers (id, level, permissions)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reviewer>(&query)
            .bind(&input.id)
            .bind(&input.level)
            .bind(&input.permissions)
            .fetch_one(pool)
            .await
    }

    /// Find a reviewer by its opaque token.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Reviewer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviewers WHERE id = $1");
        sqlx::query_as::<_, Reviewer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Workload snapshots for every active reviewer holding the
    /// `approve_items` permission, including those with nothing pending.
    ///
    /// Weighted workload is the sum of priority levels across pending
    /// assignments. `last_assigned_at` spans all assignments, not only
    /// pending ones, so the assignment tie-break stays fair after a
    /// reviewer empties their queue.
    pub async fn workload_snapshots(pool: &PgPool) -> Result<Vec<WorkloadRow>, sqlx::Error> {
        sqlx::query_as::<_, WorkloadRow>(
            "SELECT
                r.id AS reviewer_id,
                COUNT(a.id) FILTER (WHERE a.status = 'pending') AS pending_count,
                COALESCE(SUM(a.priority) FILTER (WHERE a.status = 'pending'), 0)
                    AS weighted_workload,
                MAX(a.assigned_at) AS last_assigned_at
             FROM reviewers r
             LEFT JOIN review_assignments a ON a.reviewer_id = r.id
             WHERE r.active AND $1 = ANY(r.permissions)
             GROUP BY r.id",
        )
        .bind(Permission::ApproveItems.label())
        .fetch_all(pool)
        .await
    }
}
