use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use revq_core::error::CoreError;
use revq_core::item::{validate_category, validate_priority, validate_title, ContributorReputation};
use revq_core::types::DbId;
use revq_db::models::review_item::CreateReviewItem;
use revq_db::repositories::ReviewItemRepo;
use revq_events::{ReviewEvent, EVENT_ITEM_SUBMITTED};
use serde::Deserialize;

use crate::engine::assignment::assign_item;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitItemRequest {
    pub title: String,
    pub category: String,
    pub attachment_count: i32,
    pub total_size_bytes: i64,
    pub priority: i32,
    pub contributor_id: String,
    pub contributor_reputation: ContributorReputation,
}

/// Submit a new item and bind it to the least-loaded reviewer.
///
/// When no reviewer can take it the item stays persisted in
/// `pending_review` and the call reports the exhausted pool; a later
/// submission-time retry or rebalancing pass picks it up.
pub async fn submit_item(
    State(state): State<AppState>,
    Json(payload): Json<SubmitItemRequest>,
) -> AppResult<impl IntoResponse> {
    validate_title(&payload.title)?;
    validate_category(&payload.category)?;
    validate_priority(payload.priority)?;
    if payload.attachment_count < 0 || payload.total_size_bytes < 0 {
        return Err(
            CoreError::Validation("Attachment count and size must not be negative".to_string())
                .into(),
        );
    }

    let item = ReviewItemRepo::create(
        &state.pool,
        &CreateReviewItem {
            title: payload.title,
            category: payload.category,
            attachment_count: payload.attachment_count,
            total_size_bytes: payload.total_size_bytes,
            priority: payload.priority,
            contributor_id: payload.contributor_id,
            contributor_reputation: payload.contributor_reputation.label().to_string(),
        },
    )
    .await?;

    state.event_bus.publish(
        ReviewEvent::new(EVENT_ITEM_SUBMITTED)
            .with_item(item.id)
            .with_payload(serde_json::json!({
                "category": item.category,
                "priority": item.priority,
            })),
    );

    let assignment = assign_item(&state, &item).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: serde_json::json!({
                "item": item,
                "assignment": assignment,
            }),
        }),
    ))
}

/// Fetch a single item by id.
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = ReviewItemRepo::find_by_id(&state.pool, item_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ReviewItem",
            id: item_id.to_string(),
        })?;
    Ok(Json(DataResponse { data: item }))
}
