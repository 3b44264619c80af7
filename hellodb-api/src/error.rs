/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// JSON handlers return `Result<T, ApiError>`, which converts to a status code
/// and an error body. The HTML page does not use it: database failures there
/// are rendered into the page instead.
///
/// # Example
///
/// ```
/// use hellodb_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::ServiceUnavailable("database unreachable".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hellodb_shared::db::DbError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "service_unavailable")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Convert database errors to API errors
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Connect { .. } => ApiError::ServiceUnavailable(err.to_string()),
            DbError::Query(_) | DbError::Decode { .. } => {
                ApiError::InternalError(format!("Database error: {}", err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("/missing".to_string());
        assert_eq!(err.to_string(), "Not found: /missing");

        let err = ApiError::ServiceUnavailable("database unreachable".to_string());
        assert_eq!(err.to_string(), "Service unavailable: database unreachable");
    }

    #[test]
    fn test_connect_error_is_unavailable() {
        let err: ApiError = DbError::Connect {
            host: "db".to_string(),
            port: 3306,
            source: sqlx::Error::PoolTimedOut,
        }
        .into();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_query_error_is_internal() {
        let err: ApiError = DbError::Query(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, ApiError::InternalError(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
