use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use revq_core::scoring::DEFAULT_WINDOW_DAYS;
use serde::Deserialize;

use crate::actor::load_actor;
use crate::engine::scorer;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of leaderboard rows.
const DEFAULT_LEADERBOARD_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub window_days: Option<u32>,
}

/// A reviewer's own performance score and breakdown.
pub async fn get_performance(
    State(state): State<AppState>,
    Path(reviewer_id): Path<String>,
    Query(query): Query<PerformanceQuery>,
) -> AppResult<impl IntoResponse> {
    let actor = load_actor(&state.pool, &reviewer_id).await?;
    let window_days = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS);

    let score = scorer::compute(
        &state.pool,
        &state.config.anonymizer_salt,
        actor.id.as_str(),
        window_days,
    )
    .await?;

    Ok(Json(DataResponse { data: score }))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub window_days: Option<u32>,
    pub limit: Option<usize>,
}

/// Anonymized leaderboard over the scoring window.
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<impl IntoResponse> {
    let window_days = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);

    let scores = scorer::leaderboard(
        &state.pool,
        &state.config.anonymizer_salt,
        window_days,
        limit,
    )
    .await?;

    Ok(Json(DataResponse { data: scores }))
}
