//! Route tables. Each module owns one resource's routes; [`api_routes`]
//! merges them into the `/api/v1` surface.

pub mod admin;
pub mod assignments;
pub mod batch;
pub mod health;
pub mod items;
pub mod performance;
pub mod reviewers;

use axum::Router;

use crate::state::AppState;

/// All versioned API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(items::routes())
        .merge(reviewers::routes())
        .merge(assignments::routes())
        .merge(batch::routes())
        .merge(performance::routes())
        .merge(admin::routes())
}
