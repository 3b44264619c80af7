/// Replication status
///
/// The read handle is probed with `SHOW REPLICA STATUS`. Servers older than
/// MySQL 8.0.22 (and MariaDB before 10.5.1) reject that with a parse error, in
/// which case the probe is repeated with `SHOW SLAVE STATUS`; MySQL 8.4 only
/// accepts the first form. A server acting as a replica answers with one row;
/// anything else answers with no rows.
///
/// `SHOW REPLICA STATUS` on MySQL reports `Replica_*`/`Source_*` columns while
/// `SHOW SLAVE STATUS` and MariaDB report `Slave_*`/`Master_*`, so both
/// spellings are read.
///
/// # Result shape
///
/// ```json
/// {
///   "is_replica": true,
///   "is_running": true,
///   "lag": 3,
///   "master_host": "primary"
/// }
/// ```
///
/// `error` is only present when the probe itself failed.

use super::row::{text, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlDatabaseError;

/// Statement used to probe the read handle
pub const REPLICA_STATUS_SQL: &str = "SHOW REPLICA STATUS";

/// Probe for servers that predate `SHOW REPLICA STATUS`
pub const LEGACY_REPLICA_STATUS_SQL: &str = "SHOW SLAVE STATUS";

/// `ER_PARSE_ERROR`
const PARSE_ERROR: u16 = 1064;

const IO_RUNNING: &[&str] = &["Slave_IO_Running", "Replica_IO_Running"];
const SQL_RUNNING: &[&str] = &["Slave_SQL_Running", "Replica_SQL_Running"];
const LAG_SECONDS: &[&str] = &["Seconds_Behind_Master", "Seconds_Behind_Source"];
const SOURCE_HOST: &[&str] = &["Master_Host", "Source_Host"];

/// Replication state as seen from the read handle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationStatus {
    /// The read handle reported replica state
    pub is_replica: bool,

    /// Both the IO and the SQL replication threads are running
    pub is_running: bool,

    /// Seconds the replica trails its source, if reported
    pub lag: Option<i64>,

    /// Host the replica pulls from
    pub master_host: Option<String>,

    /// Why the probe failed, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplicationStatus {
    /// Status for a server that reported no replica state
    pub fn not_replica() -> Self {
        Self::default()
    }

    /// Status for a probe that could not be completed
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Interprets the (optional) replica status row
    pub fn from_status_row(row: Option<&Row>) -> Self {
        let Some(row) = row else {
            return Self::not_replica();
        };

        Self {
            is_replica: true,
            is_running: is_yes(row, IO_RUNNING) && is_yes(row, SQL_RUNNING),
            lag: seconds(row, LAG_SECONDS),
            master_host: first_text(row, SOURCE_HOST),
            error: None,
        }
    }
}

/// Whether a failed `REPLICA_STATUS_SQL` should be retried with
/// `LEGACY_REPLICA_STATUS_SQL`
pub fn needs_legacy_statement(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.try_downcast_ref::<MySqlDatabaseError>())
        .is_some_and(|db| is_parse_error(db.number()))
}

fn is_parse_error(error_number: u16) -> bool {
    error_number == PARSE_ERROR
}

fn first_text(row: &Row, columns: &[&str]) -> Option<String> {
    columns
        .iter()
        .find(|column| row.contains_key(**column))
        .and_then(|column| text(row, column))
}

fn is_yes(row: &Row, columns: &[&str]) -> bool {
    first_text(row, columns).as_deref() == Some("Yes")
}

fn seconds(row: &Row, columns: &[&str]) -> Option<i64> {
    let value = columns.iter().find_map(|column| row.get(*column))?;

    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok())),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
