//! Reviewer models. The `id` column is the opaque anonymous token minted
//! by the external identity boundary; no real-world identity is stored.

use revq_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reviewers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reviewer {
    pub id: String,
    pub level: String,
    pub permissions: Vec<String>,
    pub active: bool,
    pub created_at: Timestamp,
}

/// DTO for registering a reviewer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewer {
    pub id: String,
    pub level: String,
    pub permissions: Vec<String>,
}
