/// Route handlers
///
/// - `index`: Greeting page (`/`) and its JSON form (`/status`)
/// - `health`: Per-handle connectivity check (`/health`)

pub mod health;
pub mod index;

use crate::error::ApiError;
use axum::http::Uri;

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
