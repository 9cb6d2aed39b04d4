//! Review item models.

use revq_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `review_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewItem {
    pub id: DbId,
    pub title: String,
    pub category: String,
    pub attachment_count: i32,
    pub total_size_bytes: i64,
    pub priority: i32,
    pub status: String,
    pub contributor_id: String,
    pub contributor_reputation: String,
    pub transfer_count: i32,
    pub submitted_at: Timestamp,
}

/// DTO for submitting a new review item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewItem {
    pub title: String,
    pub category: String,
    pub attachment_count: i32,
    pub total_size_bytes: i64,
    pub priority: i32,
    pub contributor_id: String,
    pub contributor_reputation: String,
}
