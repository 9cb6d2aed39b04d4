//! Resolves opaque reviewer tokens into [`Actor`] capability objects at
//! the API boundary. Handlers pass the resolved actor into engine calls;
//! nothing below this layer looks permissions up again.

use revq_core::actor::{Actor, Permission, ReviewerId, ReviewerLevel};
use revq_core::error::CoreError;
use revq_db::repositories::ReviewerRepo;
use revq_db::DbPool;

use crate::error::{AppError, AppResult};

/// Load the capability object for an acting reviewer.
///
/// Unknown permission labels in the stored set are skipped; an unknown
/// level is a data error and surfaces as internal.
pub async fn load_actor(pool: &DbPool, actor_id: &str) -> AppResult<Actor> {
    let reviewer = ReviewerRepo::find_by_id(pool, actor_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Reviewer",
                id: actor_id.to_string(),
            })
        })?;

    if !reviewer.active {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Reviewer '{actor_id}' is deactivated"
        ))));
    }

    let level = ReviewerLevel::from_label(&reviewer.level).ok_or_else(|| {
        AppError::InternalError(format!(
            "Reviewer '{actor_id}' has unknown level '{}'",
            reviewer.level
        ))
    })?;

    let permissions: Vec<Permission> = reviewer
        .permissions
        .iter()
        .filter_map(|label| Permission::from_label(label))
        .collect();

    Ok(Actor::new(ReviewerId::new(&reviewer.id), level, permissions))
}
