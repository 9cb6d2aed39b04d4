use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{performance, queue, reviewers};
use crate::state::AppState;

/// Reviewer routes.
///
/// | Method | Path                                  | Handler             |
/// |--------|---------------------------------------|---------------------|
/// | POST   | /reviewers                            | `register_reviewer` |
/// | GET    | /reviewers/{reviewer_id}/queue        | `get_queue`         |
/// | GET    | /reviewers/{reviewer_id}/performance  | `get_performance`   |
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviewers", post(reviewers::register_reviewer))
        .route("/reviewers/{reviewer_id}/queue", get(queue::get_queue))
        .route(
            "/reviewers/{reviewer_id}/performance",
            get(performance::get_performance),
        )
}
