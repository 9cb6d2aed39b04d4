use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use revq_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `revq_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::AlreadyDecided { assignment_id } => (
                    StatusCode::CONFLICT,
                    "ALREADY_DECIDED",
                    format!("Assignment {assignment_id} has already been decided"),
                ),
                CoreError::NotOwner { assignment_id } => (
                    StatusCode::FORBIDDEN,
                    "NOT_OWNER",
                    format!("Assignment {assignment_id} is not owned by the acting reviewer"),
                ),
                CoreError::InsufficientEligibility(msg) => (
                    StatusCode::FORBIDDEN,
                    "INSUFFICIENT_ELIGIBILITY",
                    msg.clone(),
                ),
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                // Retryable: the reviewer pool is exhausted, not broken.
                CoreError::NoEligibleReviewer => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "NO_ELIGIBLE_REVIEWER",
                    "No eligible reviewer is available".to_string(),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn already_decided_maps_to_conflict() {
        let (status, json) =
            body_json(AppError::Core(CoreError::AlreadyDecided { assignment_id: 9 })).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "ALREADY_DECIDED");
        assert!(json["error"].as_str().unwrap().contains('9'));
    }

    #[tokio::test]
    async fn not_owner_and_eligibility_map_to_forbidden() {
        let (status, json) =
            body_json(AppError::Core(CoreError::NotOwner { assignment_id: 3 })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "NOT_OWNER");

        let (status, json) = body_json(AppError::Core(CoreError::InsufficientEligibility(
            "score too low".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "INSUFFICIENT_ELIGIBILITY");
    }

    #[tokio::test]
    async fn exhausted_pool_maps_to_service_unavailable() {
        let (status, json) = body_json(AppError::Core(CoreError::NoEligibleReviewer)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "NO_ELIGIBLE_REVIEWER");
    }

    #[tokio::test]
    async fn validation_maps_to_bad_request() {
        let (status, json) = body_json(AppError::Core(CoreError::Validation(
            "priority out of range".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"], "priority out of range");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_detail() {
        let (status, json) =
            body_json(AppError::InternalError("pool wiring broke".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert!(!json["error"].as_str().unwrap().contains("wiring"));
    }
}
