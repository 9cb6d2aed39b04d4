use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use revq_core::error::CoreError;
use revq_core::types::DbId;
use revq_db::repositories::DecisionRepo;
use serde::Deserialize;

use crate::actor::load_actor;
use crate::engine::decision::{decide, DecisionRequest};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DecideBody {
    /// Opaque token of the acting reviewer.
    pub actor_id: String,
    #[serde(flatten)]
    pub decision: DecisionRequest,
}

/// Record a decision against a pending assignment.
pub async fn post_decision(
    State(state): State<AppState>,
    Path(assignment_id): Path<DbId>,
    Json(payload): Json<DecideBody>,
) -> AppResult<impl IntoResponse> {
    let actor = load_actor(&state.pool, &payload.actor_id).await?;
    let decision = decide(&state, &actor, assignment_id, &payload.decision).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: decision })))
}

/// Fetch the decision recorded against an assignment.
pub async fn get_decision(
    State(state): State<AppState>,
    Path(assignment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let decision = DecisionRepo::find_by_assignment(&state.pool, assignment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Decision",
            id: assignment_id.to_string(),
        })?;
    Ok(Json(DataResponse { data: decision }))
}
