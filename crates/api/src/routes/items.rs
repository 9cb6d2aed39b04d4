use axum::routing::{get, post};
use axum::Router;

use crate::handlers::items;
use crate::state::AppState;

/// Review item routes.
///
/// | Method | Path          | Handler       |
/// |--------|---------------|---------------|
/// | POST   | /items        | `submit_item` |
/// | GET    | /items/{id}   | `get_item`    |
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", post(items::submit_item))
        .route("/items/{id}", get(items::get_item))
}
