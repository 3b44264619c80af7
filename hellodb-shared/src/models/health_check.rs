/// Health check row
///
/// # Schema
///
/// ```sql
/// CREATE TABLE health_check (
///     id INT AUTO_INCREMENT PRIMARY KEY,
///     status VARCHAR(50) NOT NULL,
///     checked_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```

use crate::db::row::{text, Row};
use serde::{Deserialize, Serialize};

/// Most recent recorded health check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Recorded status (e.g. "ok")
    pub status: Option<String>,

    /// When the check was recorded
    pub checked_at: Option<String>,
}

impl HealthCheck {
    /// Selects the newest `health_check` row
    pub const LATEST_SQL: &'static str =
        "SELECT status, checked_at FROM health_check ORDER BY checked_at DESC LIMIT 1";

    pub fn from_row(row: &Row) -> Self {
        Self {
            status: text(row, "status"),
            checked_at: text(row, "checked_at"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_from_row_with_null_timestamp() {
        let Value::Object(row) = json!({ "status": "ok", "checked_at": null }) else {
            unreachable!()
        };

        let check = HealthCheck::from_row(&row);
        assert_eq!(check.status.as_deref(), Some("ok"));
        assert_eq!(check.checked_at, None);
    }
}
