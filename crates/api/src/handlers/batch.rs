use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use revq_core::batch::{categorize_candidate, BatchCategory, BatchSelection, CandidateProfile};
use revq_core::item::ContributorReputation;
use revq_db::models::CandidateRow;
use revq_events::{ReviewEvent, EVENT_BATCH_COMPLETED};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::actor::load_actor;
use crate::engine::batch::{
    ensure_batch_eligible, run_batch, select_candidates, BatchTarget, PoolBackend,
};
use crate::engine::decision::DecisionRequest;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BatchPreviewRequest {
    pub actor_id: String,
    pub selection: BatchSelection,
}

/// A candidate with its advisory categorization.
#[derive(Debug, Serialize)]
pub struct PreviewCandidate {
    #[serde(flatten)]
    pub candidate: CandidateRow,
    pub suggested_category: BatchCategory,
}

#[derive(Debug, Serialize)]
pub struct BatchPreviewResponse {
    pub candidates: Vec<PreviewCandidate>,
    pub skipped: usize,
    pub truncated: bool,
}

/// Preview a batch selection: resolve candidates and bucket each one.
///
/// Purely informational, so it is not behind the eligibility gate; the
/// gate guards execution only.
pub async fn preview_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchPreviewRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = load_actor(&state.pool, &payload.actor_id).await?;
    let selected = select_candidates(&state.pool, &actor, &payload.selection).await?;

    let candidates = selected
        .candidates
        .into_iter()
        .map(|candidate| {
            let reputation = ContributorReputation::from_label(&candidate.contributor_reputation)
                .ok_or_else(|| {
                    AppError::InternalError(format!(
                        "Unknown contributor reputation '{}'",
                        candidate.contributor_reputation
                    ))
                })?;
            let suggested_category = categorize_candidate(&CandidateProfile {
                attachment_count: candidate.attachment_count,
                waiting_hours: candidate.waiting_hours,
                contributor_reputation: reputation,
            });
            Ok(PreviewCandidate {
                candidate,
                suggested_category,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(DataResponse {
        data: BatchPreviewResponse {
            candidates,
            skipped: selected.skipped,
            truncated: selected.truncated,
        },
    }))
}

// ---------------------------------------------------------------------------
// Execute
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BatchExecuteRequest {
    pub actor_id: String,
    pub selection: BatchSelection,
    /// Applied identically to every selected item.
    pub template: DecisionRequest,
}

/// Execute a batch decision over the actor's own pending assignments.
pub async fn execute_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchExecuteRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = load_actor(&state.pool, &payload.actor_id).await?;

    ensure_batch_eligible(
        &state.pool,
        &actor,
        &state.config.anonymizer_salt,
        state.config.score_window_days,
    )
    .await?;

    let selected = select_candidates(&state.pool, &actor, &payload.selection).await?;
    let targets: Vec<BatchTarget> = selected
        .candidates
        .iter()
        .map(|c| BatchTarget {
            assignment_id: c.assignment_id,
            item_id: c.item_id,
        })
        .collect();

    let backend = Arc::new(PoolBackend {
        state: state.clone(),
    });
    let result = run_batch(
        backend,
        &actor,
        &payload.template,
        targets,
        state.config.batch_width,
        CancellationToken::new(),
        selected.skipped,
        selected.truncated,
    )
    .await;

    state.event_bus.publish(
        ReviewEvent::new(EVENT_BATCH_COMPLETED)
            .with_actor(actor.id.as_str())
            .with_payload(serde_json::json!({
                "total_selected": result.total_selected,
                "successful": result.successful,
                "failed": result.failed,
                "skipped": result.skipped,
                "cancelled": result.cancelled,
            })),
    );

    tracing::info!(
        actor_id = %actor.id,
        total = result.total_selected,
        successful = result.successful,
        failed = result.failed,
        "Batch execution finished"
    );

    Ok(Json(DataResponse { data: result }))
}
