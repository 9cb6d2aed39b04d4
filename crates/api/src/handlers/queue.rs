use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use revq_core::item::{classify_urgency, Urgency};
use revq_core::workload::sort_queue;
use revq_db::models::PendingQueueRow;
use revq_db::repositories::AssignmentRepo;
use serde::Serialize;

use crate::actor::load_actor;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A queue entry annotated for presentation.
#[derive(Debug, Serialize)]
pub struct QueueEntry {
    #[serde(flatten)]
    pub row: PendingQueueRow,
    pub pending_hours: f64,
    pub urgency: Urgency,
}

/// A reviewer's pending queue: priority descending, FIFO within a tier,
/// each entry annotated with its urgency.
pub async fn get_queue(
    State(state): State<AppState>,
    Path(reviewer_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    // Resolving the actor also 404s unknown reviewers.
    let actor = load_actor(&state.pool, &reviewer_id).await?;

    let mut rows = AssignmentRepo::list_pending_for_reviewer(&state.pool, actor.id.as_str()).await?;
    sort_queue(&mut rows, |row| (row.priority, row.assigned_at));

    let now = Utc::now();
    let entries: Vec<QueueEntry> = rows
        .into_iter()
        .map(|row| {
            let pending_hours = (now - row.assigned_at).num_seconds() as f64 / 3600.0;
            QueueEntry {
                urgency: classify_urgency(pending_hours),
                pending_hours,
                row,
            }
        })
        .collect();

    Ok(Json(DataResponse { data: entries }))
}
