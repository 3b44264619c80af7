/// Status source trait
///
/// The greeting page needs three things from the database: single-row reads,
/// the replication probe, and whether reads reach a replica. `StatusSource`
/// is that contract, implemented by `ConnectionRouter`.
///
/// # Example
///
/// ```no_run
/// use hellodb_shared::status::StatusSource;
/// use hellodb_shared::models::health_check::HealthCheck;
///
/// async fn last_status(source: &dyn StatusSource) -> Option<String> {
///     source
///         .fetch_one(HealthCheck::LATEST_SQL, &[])
///         .await
///         .ok()
///         .flatten()
///         .and_then(|row| HealthCheck::from_row(&row).status)
/// }
/// ```

use crate::db::{
    replication::ReplicationStatus,
    router::ConnectionRouter,
    row::Row,
    DbResult,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Read-side operations the status page relies on
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// First row of `sql`, or `None` when the result set is empty
    async fn fetch_one(&self, sql: &str, params: &[JsonValue]) -> DbResult<Option<Row>>;

    /// Replica state of the read side; never fails
    async fn replication_status(&self) -> ReplicationStatus;

    /// Whether reads go to a separate replica
    fn using_replica(&self) -> bool;
}

#[async_trait]
impl StatusSource for ConnectionRouter {
    async fn fetch_one(&self, sql: &str, params: &[JsonValue]) -> DbResult<Option<Row>> {
        ConnectionRouter::fetch_one(self, sql, params).await
    }

    async fn replication_status(&self) -> ReplicationStatus {
        ConnectionRouter::replication_status(self).await
    }

    fn using_replica(&self) -> bool {
        ConnectionRouter::using_replica(self)
    }
}
