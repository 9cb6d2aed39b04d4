//! The decide operation: the single path by which an assignment closes
//! with a recorded decision.
//!
//! Classification happens against a pre-read of the assignment, but the
//! actual close is the guarded update inside the transaction. The pre-read
//! only shapes error messages; correctness never depends on it.

use chrono::Utc;
use revq_core::actor::Actor;
use revq_core::decision::{
    quality_from_average, validate_decision, AssignmentStatus, CategoryScores, DecisionKind,
    QualityRating,
};
use revq_core::error::CoreError;
use revq_core::item::ItemStatus;
use revq_core::types::DbId;
use revq_db::models::decision::{CreateDecision, Decision};
use revq_db::repositories::{AssignmentRepo, DecisionRepo, ReviewItemRepo};
use revq_events::{ReviewEvent, EVENT_REVIEW_DECIDED};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// How long a staged contributor notification stays readable.
const NOTIFICATION_TTL: std::time::Duration = std::time::Duration::from_secs(7 * 24 * 3600);

/// Payload of a decide call.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub kind: DecisionKind,
    /// Explicit quality rating; derived from the category average when
    /// absent.
    #[serde(default)]
    pub quality_rating: Option<QualityRating>,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub category_scores: CategoryScores,
}

/// Record a decision against a pending assignment owned by `actor`.
///
/// Exactly one caller can succeed per assignment. A concurrent decide that
/// loses the race observes the guarded update returning no row and gets
/// [`CoreError::AlreadyDecided`].
pub async fn decide(
    state: &AppState,
    actor: &Actor,
    assignment_id: DbId,
    request: &DecisionRequest,
) -> AppResult<Decision> {
    validate_decision(
        request.kind,
        &request.rationale,
        &request.suggestions,
        &request.category_scores,
    )?;

    let assignment = AssignmentRepo::find_by_id(&state.pool, assignment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Assignment",
            id: assignment_id.to_string(),
        })?;

    if assignment.reviewer_id != actor.id.as_str() {
        return Err(CoreError::NotOwner { assignment_id }.into());
    }
    if AssignmentStatus::from_label(&assignment.status) != Some(AssignmentStatus::Pending) {
        return Err(CoreError::AlreadyDecided { assignment_id }.into());
    }

    let item = ReviewItemRepo::find_by_id(&state.pool, assignment.item_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ReviewItem",
            id: assignment.item_id.to_string(),
        })?;

    let from_status = ItemStatus::from_label(&item.status).ok_or_else(|| {
        AppError::InternalError(format!(
            "Item {} has unknown status '{}'",
            item.id, item.status
        ))
    })?;
    let to_status = request.kind.terminal_status();
    revq_core::item::validate_transition(from_status, to_status)?;

    let quality = request
        .quality_rating
        .unwrap_or_else(|| quality_from_average(request.category_scores.average()));
    let latency_hours = (Utc::now() - assignment.assigned_at).num_seconds() as f64 / 3600.0;

    let mut tx = state.pool.begin().await?;

    // The guarded close: whoever flips pending -> decided first wins.
    let closed = AssignmentRepo::close_pending(
        &mut tx,
        assignment_id,
        AssignmentStatus::Decided.label(),
    )
    .await?;
    if closed.is_none() {
        return Err(CoreError::AlreadyDecided { assignment_id }.into());
    }

    ReviewItemRepo::set_status(&mut tx, item.id, to_status.label()).await?;

    let decision = DecisionRepo::insert(
        &mut tx,
        &CreateDecision {
            assignment_id,
            item_id: item.id,
            reviewer_id: actor.id.as_str().to_string(),
            kind: request.kind.label().to_string(),
            quality: quality.label().to_string(),
            rationale: request.rationale.clone(),
            suggestions: request.suggestions.clone(),
            score_content_accuracy: request.category_scores.content_accuracy,
            score_educational_value: request.category_scores.educational_value,
            score_file_quality: request.category_scores.file_quality,
            score_organization: request.category_scores.organization,
            score_appropriateness: request.category_scores.appropriateness,
            latency_hours,
        },
    )
    .await?;

    tx.commit().await?;

    state.event_bus.publish(
        ReviewEvent::new(EVENT_REVIEW_DECIDED)
            .with_item(item.id)
            .with_assignment(assignment_id)
            .with_actor(actor.id.as_str())
            .with_payload(serde_json::json!({
                "kind": request.kind.label(),
                "quality": quality.label(),
            })),
    );

    // Notification staging is best effort; the decision is already durable.
    let key = format!("notification:{}:{}", item.contributor_id, item.id);
    if let Err(err) = state
        .kv
        .set_with_ttl(&key, request.kind.label(), NOTIFICATION_TTL)
        .await
    {
        tracing::warn!(error = %err, key, "Failed to stage contributor notification");
    }

    tracing::info!(
        assignment_id,
        item_id = item.id,
        kind = request.kind.label(),
        "Decision recorded"
    );

    Ok(decision)
}
