use axum::routing::post;
use axum::Router;

use crate::handlers::batch;
use crate::state::AppState;

/// Batch operation routes.
///
/// | Method | Path            | Handler         |
/// |--------|-----------------|-----------------|
/// | POST   | /batch/preview  | `preview_batch` |
/// | POST   | /batch/execute  | `execute_batch` |
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/batch/preview", post(batch::preview_batch))
        .route("/batch/execute", post(batch::execute_batch))
}
