/// Health check endpoint
///
/// Opens a router and probes each handle with `SELECT 1`.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "write": "connected",
///   "read": "connected",
///   "route": "replica_active"
/// }
/// ```
///
/// 503 if the write handle cannot be opened at all.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use hellodb_shared::db::{pool, router::ConnectionRouter};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Write handle status
    pub write: String,

    /// Read handle status
    pub read: String,

    /// Read route (primary, replica_active, replica_aliased_to_primary)
    pub route: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let router = ConnectionRouter::connect(&state.config.database).await?;

    let write = probe(router.write_handle()).await;
    let read = if router.using_replica() {
        probe(router.read_handle()).await
    } else {
        write
    };
    let route = router.route().as_str().to_string();

    router.close().await;

    Ok(Json(HealthResponse {
        status: if write == "connected" && read == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        write: write.to_string(),
        read: read.to_string(),
        route,
    }))
}

async fn probe(handle: &MySqlPool) -> &'static str {
    match pool::health_check(handle).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    }
}
