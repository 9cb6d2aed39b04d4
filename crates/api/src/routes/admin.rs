use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Queue administration routes.
///
/// | Method | Path              | Handler             |
/// |--------|-------------------|---------------------|
/// | POST   | /admin/rebalance  | `trigger_rebalance` |
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/rebalance", post(admin::trigger_rebalance))
}
