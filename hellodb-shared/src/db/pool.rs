/// Database handle management
///
/// A handle is a sqlx `MySqlPool` capped at a single connection. The pool type
/// gives cheap shared ownership (the router aliases the read handle to the
/// write handle by cloning it) and driver-level connect timeouts, while one
/// connection per handle keeps the router a plain two-connection wrapper.
///
/// # Example
///
/// ```no_run
/// use hellodb_shared::db::config::DbConfig;
/// use hellodb_shared::db::pool::{close_handle, health_check, open_handle};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DbConfig::default();
/// let handle = open_handle(&config, &config.host).await?;
///
/// health_check(&handle).await?;
/// close_handle(handle).await;
/// # Ok(())
/// # }
/// ```

use super::{config::DbConfig, DbError};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connections held by one handle
pub const CONNECTIONS_PER_HANDLE: u32 = 1;

/// Opens a handle to `host` using the rest of `config`
///
/// The first connection is established eagerly so an unreachable host is
/// reported here rather than on the first query.
///
/// # Errors
///
/// Returns `DbError::Connect` if the host cannot be reached or rejects the
/// credentials within `config.connect_timeout_seconds`.
pub async fn open_handle(config: &DbConfig, host: &str) -> Result<MySqlPool, DbError> {
    info!(
        host,
        port = config.port,
        database = %config.name,
        "Opening database handle"
    );

    let pool = handle_options(config)
        .connect_with(config.connect_options(host))
        .await
        .map_err(|source| DbError::Connect {
            host: host.to_string(),
            port: config.port,
            source,
        })?;

    debug!(host, "Database handle opened");
    Ok(pool)
}

/// Creates a handle to `host` without connecting
///
/// The connection is attempted on first use, so errors surface from the
/// first query instead.
pub fn lazy_handle(config: &DbConfig, host: &str) -> MySqlPool {
    handle_options(config).connect_lazy_with(config.connect_options(host))
}

fn handle_options(config: &DbConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(CONNECTIONS_PER_HANDLE)
        .min_connections(0)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .test_before_acquire(false)
}

/// Performs a health check on a handle
///
/// Executes `SELECT 1` to verify the server is reachable and responding.
///
/// # Errors
///
/// Returns an error if the query fails or yields an unexpected value.
pub async fn health_check(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Closes a handle and waits for its connection to shut down
pub async fn close_handle(pool: MySqlPool) {
    debug!("Closing database handle");
    pool.close().await;
}
