use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use revq_core::actor::{Permission, ReviewerLevel};
use revq_core::error::CoreError;
use revq_db::models::reviewer::CreateReviewer;
use revq_db::repositories::ReviewerRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterReviewerRequest {
    /// Opaque token minted by the external identity boundary.
    pub id: String,
    pub level: ReviewerLevel,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Register a reviewer under its opaque token.
pub async fn register_reviewer(
    State(state): State<AppState>,
    Json(payload): Json<RegisterReviewerRequest>,
) -> AppResult<impl IntoResponse> {
    if payload.id.trim().is_empty() {
        return Err(CoreError::Validation("Reviewer id must not be empty".to_string()).into());
    }

    let reviewer = ReviewerRepo::create(
        &state.pool,
        &CreateReviewer {
            id: payload.id,
            level: payload.level.label().to_string(),
            permissions: payload
                .permissions
                .iter()
                .map(|p| p.label().to_string())
                .collect(),
        },
    )
    .await?;

    tracing::info!(reviewer_id = %reviewer.id, level = %reviewer.level, "Reviewer registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: reviewer })))
}
