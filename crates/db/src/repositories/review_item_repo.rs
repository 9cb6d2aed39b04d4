//! Repository for the `review_items` table, including the typed-filter
//! batch candidate query.

use revq_core::batch::{BatchFilter, CategoryPredicate, ComparePredicate, CountPredicate};
use revq_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::models::review_item::{CreateReviewItem, ReviewItem};
use crate::models::CandidateRow;

/// Column list for review_items queries.
const COLUMNS: &str = "id, title, category, attachment_count, total_size_bytes, priority, \
    status, contributor_id, contributor_reputation, transfer_count, submitted_at";

/// SQL expression for how long an item has waited, in hours.
const WAITING_HOURS_EXPR: &str =
    "(EXTRACT(EPOCH FROM (now() - i.submitted_at)) / 3600.0)::float8";

/// Provides CRUD operations for review items.
pub struct ReviewItemRepo;

impl ReviewItemRepo {
    /// Insert a new item in `pending_review` status, returning the row.
    pub async fn create(pool: &PgPool, input: &CreateReviewItem) -> Result<ReviewItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO review_items
                (title, category, attachment_count, total_size_bytes, priority,
                 contributor_id, contributor_reputation)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewItem>(&query)
            .bind(&input.title)
            .bind(&input.category)
            .bind(input.attachment_count)
            .bind(input.total_size_bytes)
            .bind(input.priority)
            .bind(&input.contributor_id)
            .bind(&input.contributor_reputation)
            .fetch_one(pool)
            .await
    }

    /// Find an item by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ReviewItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM review_items WHERE id = $1");
        sqlx::query_as::<_, ReviewItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set an item's lifecycle status inside the decide transaction.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE review_items SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Bump an item's lifetime transfer counter inside a transfer transaction.
    pub async fn increment_transfer_count(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE review_items SET transfer_count = transfer_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Batch candidates: the reviewer's own pending assignments matching a
    /// conjunction of typed filter predicates.
    ///
    /// Every filter value travels as a bind parameter. Results come back
    /// oldest-assigned first and are capped at `limit + 1` so the caller
    /// can detect truncation.
    pub async fn batch_candidates(
        pool: &PgPool,
        reviewer_id: &str,
        filters: &[BatchFilter],
        limit: usize,
    ) -> Result<Vec<CandidateRow>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT a.id AS assignment_id, i.id AS item_id, i.title, i.category,
                    a.priority, i.attachment_count, i.contributor_reputation,
                    {WAITING_HOURS_EXPR} AS waiting_hours, a.assigned_at
             FROM review_assignments a
             JOIN review_items i ON i.id = a.item_id
             WHERE a.status = 'pending' AND a.reviewer_id = "
        ));
        qb.push_bind(reviewer_id.to_string());

        for filter in filters {
            match filter {
                BatchFilter::Category(CategoryPredicate::Equals { value }) => {
                    qb.push(" AND i.category = ");
                    qb.push_bind(value.clone());
                }
                BatchFilter::Category(CategoryPredicate::InSet { values }) => {
                    qb.push(" AND i.category = ANY(");
                    qb.push_bind(values.clone());
                    qb.push(")");
                }
                BatchFilter::Priority(p) => push_compare(&mut qb, "a.priority", p),
                BatchFilter::WaitingHours(p) => push_compare(&mut qb, WAITING_HOURS_EXPR, p),
                BatchFilter::AttachmentCount(p) => match p {
                    CountPredicate::GreaterThan { value } => {
                        qb.push(" AND i.attachment_count > ");
                        qb.push_bind(*value);
                    }
                    CountPredicate::LessThan { value } => {
                        qb.push(" AND i.attachment_count < ");
                        qb.push_bind(*value);
                    }
                    CountPredicate::Range { min, max } => {
                        qb.push(" AND i.attachment_count BETWEEN ");
                        qb.push_bind(*min);
                        qb.push(" AND ");
                        qb.push_bind(*max);
                    }
                },
            }
        }

        qb.push(" ORDER BY a.assigned_at ASC LIMIT ");
        qb.push_bind((limit + 1) as i64);

        qb.build_query_as::<CandidateRow>().fetch_all(pool).await
    }

    /// Batch candidates named by explicit item ids, still restricted to the
    /// reviewer's own pending assignments.
    pub async fn candidates_by_ids(
        pool: &PgPool,
        reviewer_id: &str,
        item_ids: &[DbId],
    ) -> Result<Vec<CandidateRow>, sqlx::Error> {
        let query = format!(
            "SELECT a.id AS assignment_id, i.id AS item_id, i.title, i.category,
                    a.priority, i.attachment_count, i.contributor_reputation,
                    {WAITING_HOURS_EXPR} AS waiting_hours, a.assigned_at
             FROM review_assignments a
             JOIN review_items i ON i.id = a.item_id
             WHERE a.status = 'pending' AND a.reviewer_id = $1 AND i.id = ANY($2)
             ORDER BY a.assigned_at ASC"
        );
        sqlx::query_as::<_, CandidateRow>(&query)
            .bind(reviewer_id)
            .bind(item_ids)
            .fetch_all(pool)
            .await
    }
}

fn push_compare(qb: &mut QueryBuilder<'_, Postgres>, column: &str, predicate: &ComparePredicate) {
    match predicate {
        ComparePredicate::Equals { value } => {
            qb.push(format!(" AND {column} = "));
            qb.push_bind(*value);
        }
        ComparePredicate::GreaterThan { value } => {
            qb.push(format!(" AND {column} > "));
            qb.push_bind(*value);
        }
        ComparePredicate::LessThan { value } => {
            qb.push(format!(" AND {column} < "));
            qb.push_bind(*value);
        }
    }
}
