use axum::routing::get;
use axum::Router;

use crate::handlers::performance;
use crate::state::AppState;

/// Leaderboard routes. The per-reviewer performance route lives with the
/// reviewer routes.
///
/// | Method | Path         | Handler           |
/// |--------|--------------|-------------------|
/// | GET    | /leaderboard | `get_leaderboard` |
pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(performance::get_leaderboard))
}
