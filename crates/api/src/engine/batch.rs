//! Batch decision execution: eligibility gating, candidate selection,
//! and bounded-concurrency execution over individual decides.
//!
//! A batch is never a distinct write primitive. Every item goes through
//! the same decide path as a single decision, so partial failure is the
//! normal shape of a batch result rather than an error.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use revq_core::actor::Actor;
use revq_core::batch::{check_batch_eligibility, truncate_selection, BatchSelection, MAX_BATCH_SIZE};
use revq_core::types::DbId;
use revq_db::models::CandidateRow;
use revq_db::repositories::{DecisionRepo, ReviewItemRepo};
use revq_db::DbPool;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::engine::decision::{decide, DecisionRequest};
use crate::engine::scorer;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// Enforce the batch gate for an actor: level, current performance score,
/// and lifetime decided count.
pub async fn ensure_batch_eligible(
    pool: &DbPool,
    actor: &Actor,
    salt: &str,
    window_days: u32,
) -> AppResult<()> {
    let score = scorer::compute(pool, salt, actor.id.as_str(), window_days).await?;
    let decided = DecisionRepo::lifetime_count(pool, actor.id.as_str()).await?;
    check_batch_eligibility(actor.level, score.breakdown.overall, decided.max(0) as u32)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Candidate selection
// ---------------------------------------------------------------------------

/// Candidates resolved from a selection, with truncation accounting.
#[derive(Debug)]
pub struct SelectedCandidates {
    pub candidates: Vec<CandidateRow>,
    /// Items cut off by the batch size cap.
    pub skipped: usize,
    pub truncated: bool,
}

/// Resolve a batch selection to the actor's own pending assignments.
///
/// Selections larger than [`MAX_BATCH_SIZE`] are truncated oldest-first and
/// the overflow reported, never silently dropped.
pub async fn select_candidates(
    pool: &DbPool,
    actor: &Actor,
    selection: &BatchSelection,
) -> AppResult<SelectedCandidates> {
    selection.validate()?;

    match selection {
        BatchSelection::Ids(item_ids) => {
            let rows =
                ReviewItemRepo::candidates_by_ids(pool, actor.id.as_str(), item_ids).await?;
            let (candidates, skipped) = truncate_selection(rows);
            Ok(SelectedCandidates {
                candidates,
                skipped,
                truncated: skipped > 0,
            })
        }
        BatchSelection::Criteria(filters) => {
            // The query fetches one row past the cap so truncation is
            // observable without a count query.
            let mut rows = ReviewItemRepo::batch_candidates(
                pool,
                actor.id.as_str(),
                filters,
                MAX_BATCH_SIZE,
            )
            .await?;
            let truncated = rows.len() > MAX_BATCH_SIZE;
            let skipped = rows.len().saturating_sub(MAX_BATCH_SIZE);
            rows.truncate(MAX_BATCH_SIZE);
            Ok(SelectedCandidates {
                candidates: rows,
                skipped,
                truncated,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// The decide call a batch fans out over. Abstracted so execution semantics
/// (partial failure, cancellation, concurrency bounds) are testable without
/// a live store.
#[async_trait]
pub trait DecideBackend: Send + Sync {
    async fn decide_one(
        &self,
        actor: &Actor,
        assignment_id: DbId,
        request: &DecisionRequest,
    ) -> AppResult<DbId>;
}

/// Production backend: each batch item is a full single decide.
pub struct PoolBackend {
    pub state: AppState,
}

#[async_trait]
impl DecideBackend for PoolBackend {
    async fn decide_one(
        &self,
        actor: &Actor,
        assignment_id: DbId,
        request: &DecisionRequest,
    ) -> AppResult<DbId> {
        decide(&self.state, actor, assignment_id, request)
            .await
            .map(|decision| decision.id)
    }
}

/// One item the executor will decide.
#[derive(Debug, Clone)]
pub struct BatchTarget {
    pub assignment_id: DbId,
    pub item_id: DbId,
}

/// Outcome of one item within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub item_id: DbId,
    pub assignment_id: DbId,
    pub status: BatchItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a finished batch.
#[derive(Debug, Serialize)]
pub struct BatchResult {
    pub total_selected: usize,
    pub successful: usize,
    pub failed: usize,
    /// Truncation overflow plus items skipped after cancellation.
    pub skipped: usize,
    pub truncated: bool,
    pub cancelled: bool,
    pub duration_ms: u64,
    pub results: Vec<BatchItemResult>,
}

/// Execute a batch over `targets` with bounded concurrency.
///
/// Per-item domain failures (already decided, ownership lost to a transfer)
/// are recorded and the rest of the batch continues. A store-level failure
/// cancels the remaining items, since retrying into a broken store only
/// multiplies damage.
pub async fn run_batch(
    backend: Arc<dyn DecideBackend>,
    actor: &Actor,
    template: &DecisionRequest,
    targets: Vec<BatchTarget>,
    width: usize,
    cancel: CancellationToken,
    pre_skipped: usize,
    truncated: bool,
) -> BatchResult {
    let started = Instant::now();
    let total_selected = targets.len() + pre_skipped;

    let results: Vec<BatchItemResult> = stream::iter(targets)
        .map(|target| {
            let backend = Arc::clone(&backend);
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    return BatchItemResult {
                        item_id: target.item_id,
                        assignment_id: target.assignment_id,
                        status: BatchItemStatus::Skipped,
                        error: None,
                    };
                }
                match backend
                    .decide_one(actor, target.assignment_id, template)
                    .await
                {
                    Ok(_) => BatchItemResult {
                        item_id: target.item_id,
                        assignment_id: target.assignment_id,
                        status: BatchItemStatus::Succeeded,
                        error: None,
                    },
                    Err(err) => {
                        if matches!(err, AppError::Database(_)) {
                            cancel.cancel();
                        }
                        BatchItemResult {
                            item_id: target.item_id,
                            assignment_id: target.assignment_id,
                            status: BatchItemStatus::Failed,
                            error: Some(err.to_string()),
                        }
                    }
                }
            }
        })
        .buffer_unordered(width.max(1))
        .collect()
        .await;

    let successful = results
        .iter()
        .filter(|r| r.status == BatchItemStatus::Succeeded)
        .count();
    let failed = results
        .iter()
        .filter(|r| r.status == BatchItemStatus::Failed)
        .count();
    let skipped_in_flight = results
        .iter()
        .filter(|r| r.status == BatchItemStatus::Skipped)
        .count();

    BatchResult {
        total_selected,
        successful,
        failed,
        skipped: pre_skipped + skipped_in_flight,
        truncated,
        cancelled: cancel.is_cancelled(),
        duration_ms: started.elapsed().as_millis() as u64,
        results,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
