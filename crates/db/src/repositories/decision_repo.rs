//! Repository for the `decisions` table and the anonymized stat queries
//! feeding the performance scorer.

use revq_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::decision::{CreateDecision, Decision, DecisionStatRow};

/// Column list for decisions queries.
const COLUMNS: &str = "id, assignment_id, item_id, reviewer_id, kind, quality, rationale, \
    suggestions, score_content_accuracy, score_educational_value, score_file_quality, \
    score_organization, score_appropriateness, latency_hours, decided_at";

/// Provides operations over recorded decisions.
pub struct DecisionRepo;

impl DecisionRepo {
    /// Insert a decision inside the decide transaction. The unique index on
    /// `assignment_id` backs up the guarded close: a duplicate insert can
    /// never commit.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateDecision,
    ) -> Result<Decision, sqlx::Error> {
        let query = format!(
            "INSERT INTO decisions
                (assignment_id, item_id, reviewer_id, kind, quality, rationale, suggestions,
                 score_content_accuracy, score_educational_value, score_file_quality,
                 score_organization, score_appropriateness, latency_hours)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Decision>(&query)
            .bind(input.assignment_id)
            .bind(input.item_id)
            .bind(&input.reviewer_id)
            .bind(&input.kind)
            .bind(&input.quality)
            .bind(&input.rationale)
            .bind(&input.suggestions)
            .bind(input.score_content_accuracy)
            .bind(input.score_educational_value)
            .bind(input.score_file_quality)
            .bind(input.score_organization)
            .bind(input.score_appropriateness)
            .bind(input.latency_hours)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find the decision recorded against an assignment, if any.
    pub async fn find_by_assignment(
        pool: &PgPool,
        assignment_id: DbId,
    ) -> Result<Option<Decision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decisions WHERE assignment_id = $1");
        sqlx::query_as::<_, Decision>(&query)
            .bind(assignment_id)
            .fetch_optional(pool)
            .await
    }

    /// Scorer input for one reviewer within a window. Only measures leave
    /// this query; rationale text stays in the store.
    pub async fn stats_for_reviewer(
        pool: &PgPool,
        reviewer_id: &str,
        since: Timestamp,
    ) -> Result<Vec<DecisionStatRow>, sqlx::Error> {
        sqlx::query_as::<_, DecisionStatRow>(
            "SELECT kind, quality, latency_hours,
                    char_length(rationale) AS rationale_len,
                    COALESCE(array_length(suggestions, 1), 0) AS suggestion_count,
                    decided_at
             FROM decisions
             WHERE reviewer_id = $1 AND decided_at >= $2
             ORDER BY decided_at DESC",
        )
        .bind(reviewer_id)
        .bind(since)
        .fetch_all(pool)
        .await
    }

    /// Lifetime decided-item count, used by the batch eligibility gate.
    pub async fn lifetime_count(pool: &PgPool, reviewer_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM decisions WHERE reviewer_id = $1")
            .bind(reviewer_id)
            .fetch_one(pool)
            .await
    }

    /// Reviewers with at least one decision in the window, for the
    /// leaderboard.
    pub async fn reviewers_with_decisions_since(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT reviewer_id FROM decisions WHERE decided_at >= $1",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
