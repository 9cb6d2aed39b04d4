use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use revq_core::actor::Permission;
use revq_core::error::CoreError;
use serde::Deserialize;

use crate::actor::load_actor;
use crate::engine::rebalance::rebalance_once;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RebalanceRequest {
    pub actor_id: String,
}

/// Manually trigger a rebalancing pass. Requires the `manage_queue`
/// permission; the periodic background pass runs the same code.
pub async fn trigger_rebalance(
    State(state): State<AppState>,
    Json(payload): Json<RebalanceRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = load_actor(&state.pool, &payload.actor_id).await?;
    if !actor.has_permission(Permission::ManageQueue) {
        return Err(CoreError::Forbidden(
            "Rebalancing requires the manage_queue permission".to_string(),
        )
        .into());
    }

    let transfers = rebalance_once(
        &state.pool,
        &state.event_bus,
        state.config.overload_factor,
    )
    .await?;

    tracing::info!(actor_id = %actor.id, count = transfers.len(), "Manual rebalance executed");

    Ok(Json(DataResponse {
        data: serde_json::json!({
            "count": transfers.len(),
            "transfers": transfers,
        }),
    }))
}
