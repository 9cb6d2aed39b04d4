use axum::routing::post;
use axum::Router;

use crate::handlers::decisions;
use crate::state::AppState;

/// Assignment decision routes.
///
/// | Method | Path                                      | Handler         |
/// |--------|-------------------------------------------|-----------------|
/// | POST   | /assignments/{assignment_id}/decision     | `post_decision` |
/// | GET    | /assignments/{assignment_id}/decision     | `get_decision`  |
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/assignments/{assignment_id}/decision",
        post(decisions::post_decision).get(decisions::get_decision),
    )
}
