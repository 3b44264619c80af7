/// Write/read connection router
///
/// The router owns a write handle pointed at the primary and a read route
/// that decides where reads go:
///
/// ```text
/// DB_READ_HOST == DB_HOST        -> ReadRoute::Primary
/// replica opened                 -> ReadRoute::ReplicaActive
/// replica failed to open         -> ReadRoute::ReplicaAliasedToPrimary
/// ```
///
/// The route is fixed at construction. There is no reconnect or retry; a
/// router lives for one request and is closed afterwards.
///
/// # Error handling
///
/// `query` and the helpers built on it log failures and return them.
/// `replication_status` never fails: problems are folded into the returned
/// status.
///
/// # Example
///
/// ```no_run
/// use hellodb_shared::db::{config::DbConfig, router::{ConnectionRouter, Intent}};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let router = ConnectionRouter::connect(&DbConfig::from_env()?).await?;
///
/// router
///     .execute("INSERT INTO health_check (status) VALUES (?)", &[json!("ok")])
///     .await?;
///
/// let latest = router
///     .fetch_one("SELECT status FROM health_check ORDER BY checked_at DESC LIMIT 1", &[])
///     .await?;
///
/// let rows = router.query("SELECT * FROM app_info", &[], Intent::Write).await?;
/// println!("{:?} {}", latest, rows.len());
///
/// router.close().await;
/// # Ok(())
/// # }
/// ```

use super::{
    config::DbConfig,
    pool::{close_handle, open_handle},
    replication::{
        needs_legacy_statement, ReplicationStatus, LEGACY_REPLICA_STATUS_SQL, REPLICA_STATUS_SQL,
    },
    row::{bind_params, row_to_map, Row},
    DbError, DbResult,
};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlPool, MySqlQueryResult, MySqlRow};
use tracing::{debug, error, info, warn};

/// Which handle a statement should run on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Read handle (replica when one is active)
    Read,

    /// Write handle (always the primary)
    Write,
}

/// Where reads are sent
#[derive(Debug, Clone)]
pub enum ReadRoute {
    /// No separate read host is configured; reads use the write handle
    Primary,

    /// A read host is configured but could not be opened; reads use the
    /// write handle
    ReplicaAliasedToPrimary {
        /// Error raised while opening the replica
        reason: String,
    },

    /// Reads go to the replica handle
    ReplicaActive(MySqlPool),
}

impl ReadRoute {
    /// Short label for logs and status output
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadRoute::Primary => "primary",
            ReadRoute::ReplicaAliasedToPrimary { .. } => "replica_aliased_to_primary",
            ReadRoute::ReplicaActive(_) => "replica_active",
        }
    }
}

/// Router over one write handle and one read route
#[derive(Debug, Clone)]
pub struct ConnectionRouter {
    write: MySqlPool,
    read_route: ReadRoute,
    write_host: String,
    read_host: String,
}

impl ConnectionRouter {
    /// Opens the write handle and, when a separate read host is configured,
    /// the read handle
    ///
    /// A replica that cannot be opened is logged and replaced by the write
    /// handle; it does not fail construction.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connect` if the write handle cannot be opened.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        let write = open_handle(config, &config.host).await?;

        let read_route = if config.has_distinct_read_host() {
            match open_handle(config, &config.read_host).await {
                Ok(read) => ReadRoute::ReplicaActive(read),
                Err(err) => {
                    warn!(
                        read_host = %config.read_host,
                        error = %err,
                        "Read connection failed, routing reads to the write handle"
                    );
                    ReadRoute::ReplicaAliasedToPrimary {
                        reason: err.to_string(),
                    }
                }
            }
        } else {
            ReadRoute::Primary
        };

        info!(
            write_host = %config.host,
            read_host = %config.read_host,
            route = read_route.as_str(),
            "Connection router ready"
        );

        Ok(Self::from_parts(
            write,
            read_route,
            config.host.clone(),
            config.read_host.clone(),
        ))
    }

    /// Assembles a router from already opened handles
    pub fn from_parts(
        write: MySqlPool,
        read_route: ReadRoute,
        write_host: impl Into<String>,
        read_host: impl Into<String>,
    ) -> Self {
        Self {
            write,
            read_route,
            write_host: write_host.into(),
            read_host: read_host.into(),
        }
    }

    /// Handle connected to the primary
    pub fn write_handle(&self) -> &MySqlPool {
        &self.write
    }

    /// Handle reads are sent to; never absent
    pub fn read_handle(&self) -> &MySqlPool {
        match &self.read_route {
            ReadRoute::ReplicaActive(read) => read,
            ReadRoute::Primary | ReadRoute::ReplicaAliasedToPrimary { .. } => &self.write,
        }
    }

    /// Current read route
    pub fn route(&self) -> &ReadRoute {
        &self.read_route
    }

    /// Whether reads actually reach a separate replica
    pub fn using_replica(&self) -> bool {
        matches!(self.read_route, ReadRoute::ReplicaActive(_))
    }

    /// Configured primary host
    pub fn write_host(&self) -> &str {
        &self.write_host
    }

    /// Configured replica host
    pub fn read_host(&self) -> &str {
        &self.read_host
    }

    fn handle_for(&self, intent: Intent) -> &MySqlPool {
        match intent {
            Intent::Write => self.write_handle(),
            Intent::Read => self.read_handle(),
        }
    }

    /// Prepares and runs `sql` with `params` on the handle chosen by `intent`
    ///
    /// # Errors
    ///
    /// Returns `DbError::Query` if preparation or execution fails. The error
    /// is logged before it is returned.
    pub async fn query(
        &self,
        sql: &str,
        params: &[JsonValue],
        intent: Intent,
    ) -> DbResult<Vec<MySqlRow>> {
        debug!(?intent, sql, params = params.len(), "Running query");

        bind_params(sqlx::query(sql), params)
            .fetch_all(self.handle_for(intent))
            .await
            .map_err(|err| log_query_error(sql, intent, err))
    }

    /// Runs `sql` on the read handle and returns every row
    pub async fn fetch_all(&self, sql: &str, params: &[JsonValue]) -> DbResult<Vec<Row>> {
        self.query(sql, params, Intent::Read)
            .await?
            .iter()
            .map(row_to_map)
            .collect()
    }

    /// Runs `sql` on the read handle and returns the first row, if any
    pub async fn fetch_one(&self, sql: &str, params: &[JsonValue]) -> DbResult<Option<Row>> {
        debug!(intent = ?Intent::Read, sql, params = params.len(), "Running query");

        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(self.read_handle())
            .await
            .map_err(|err| log_query_error(sql, Intent::Read, err))?;

        row.as_ref().map(row_to_map).transpose()
    }

    /// Runs `sql` on the write handle
    ///
    /// # Errors
    ///
    /// Returns `DbError::Query` if the statement fails.
    pub async fn execute(&self, sql: &str, params: &[JsonValue]) -> DbResult<MySqlQueryResult> {
        debug!(sql, params = params.len(), "Executing statement");

        bind_params(sqlx::query(sql), params)
            .execute(self.handle_for(Intent::Write))
            .await
            .map_err(|err| log_query_error(sql, Intent::Write, err))
    }

    /// Probes the read handle for replica state
    ///
    /// Never fails; a failed probe yields `is_replica = false` with `error` set.
    pub async fn replication_status(&self) -> ReplicationStatus {
        let row = match self.replica_status_row().await {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "Replication status query failed");
                return ReplicationStatus::failed(err.to_string());
            }
        };

        match row.as_ref().map(row_to_map).transpose() {
            Ok(status_row) => ReplicationStatus::from_status_row(status_row.as_ref()),
            Err(err) => {
                warn!(error = %err, "Replication status row could not be read");
                ReplicationStatus::failed(err.to_string())
            }
        }
    }

    async fn replica_status_row(&self) -> Result<Option<MySqlRow>, sqlx::Error> {
        let handle = self.read_handle();

        match sqlx::query(REPLICA_STATUS_SQL).fetch_optional(handle).await {
            Err(err) if needs_legacy_statement(&err) => {
                debug!(error = %err, "Retrying replication probe with {}", LEGACY_REPLICA_STATUS_SQL);
                sqlx::query(LEGACY_REPLICA_STATUS_SQL)
                    .fetch_optional(handle)
                    .await
            }
            result => result,
        }
    }

    /// Closes both handles
    pub async fn close(self) {
        if let ReadRoute::ReplicaActive(read) = self.read_route {
            close_handle(read).await;
        }
        close_handle(self.write).await;
    }
}

fn log_query_error(sql: &str, intent: Intent, err: sqlx::Error) -> DbError {
    error!(?intent, sql, error = %err, "Query failed");
    DbError::Query(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::lazy_handle;

    fn unreachable_config() -> DbConfig {
        DbConfig {
            host: "127.0.0.1".to_string(),
            read_host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout_seconds: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_primary_route_reads_from_write_handle() {
        let config = unreachable_config();
        let router = ConnectionRouter::from_parts(
            lazy_handle(&config, &config.host),
            ReadRoute::Primary,
            "db",
            "db",
        );

        assert!(!router.using_replica());
        assert_eq!(router.route().as_str(), "primary");
        router.close().await;
    }

    #[tokio::test]
    async fn test_aliased_route_is_not_a_replica() {
        let config = unreachable_config();
        let router = ConnectionRouter::from_parts(
            lazy_handle(&config, &config.host),
            ReadRoute::ReplicaAliasedToPrimary {
                reason: "Connection refused".to_string(),
            },
            "primary",
            "replica",
        );

        assert!(!router.using_replica());
        assert_eq!(router.write_host(), "primary");
        assert_eq!(router.read_host(), "replica");
        router.close().await;
    }

    #[tokio::test]
    async fn test_active_replica_route() {
        let config = unreachable_config();
        let router = ConnectionRouter::from_parts(
            lazy_handle(&config, &config.host),
            ReadRoute::ReplicaActive(lazy_handle(&config, &config.read_host)),
            "primary",
            "replica",
        );

        assert!(router.using_replica());
        assert_eq!(router.route().as_str(), "replica_active");
        router.close().await;
    }

    #[tokio::test]
    async fn test_connect_fails_when_primary_unreachable() {
        let err = ConnectionRouter::connect(&unreachable_config())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_query_error_is_propagated() {
        let config = unreachable_config();
        let router = ConnectionRouter::from_parts(
            lazy_handle(&config, &config.host),
            ReadRoute::Primary,
            "127.0.0.1",
            "127.0.0.1",
        );

        let err = router.fetch_one("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, DbError::Query(_)));
    }

    #[tokio::test]
    async fn test_replication_status_failure_is_folded_into_result() {
        let config = unreachable_config();
        let router = ConnectionRouter::from_parts(
            lazy_handle(&config, &config.host),
            ReadRoute::Primary,
            "127.0.0.1",
            "127.0.0.1",
        );

        let status = router.replication_status().await;
        assert!(!status.is_replica);
        assert!(!status.is_running);
        assert!(status.error.is_some());
    }
}
