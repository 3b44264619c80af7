/// Application info row
///
/// # Schema
///
/// ```sql
/// CREATE TABLE app_info (
///     id INT AUTO_INCREMENT PRIMARY KEY,
///     version VARCHAR(50) NOT NULL,
///     environment VARCHAR(50) NOT NULL,
///     created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// Only the most recent row is ever read.

use crate::db::row::{text, Row};
use serde::{Deserialize, Serialize};

/// Application version and environment as recorded in the database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Deployed version string
    pub version: Option<String>,

    /// Environment name (e.g. "production")
    pub environment: Option<String>,

    /// When the row was written
    pub created_at: Option<String>,
}

impl AppInfo {
    /// Selects the newest `app_info` row
    pub const LATEST_SQL: &'static str =
        "SELECT version, environment, created_at FROM app_info ORDER BY created_at DESC LIMIT 1";

    /// Builds an `AppInfo` from a row map
    ///
    /// Missing columns become `None`.
    pub fn from_row(row: &Row) -> Self {
        Self {
            version: text(row, "version"),
            environment: text(row, "environment"),
            created_at: text(row, "created_at"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_from_row() {
        let Value::Object(row) = json!({
            "version": "1.0.0",
            "environment": "production",
            "created_at": "2024-05-01 12:00:00"
        }) else {
            unreachable!()
        };

        let info = AppInfo::from_row(&row);
        assert_eq!(info.version.as_deref(), Some("1.0.0"));
        assert_eq!(info.environment.as_deref(), Some("production"));
        assert_eq!(info.created_at.as_deref(), Some("2024-05-01 12:00:00"));
    }

    #[test]
    fn test_from_row_missing_columns() {
        let info = AppInfo::from_row(&Row::new());
        assert_eq!(info, AppInfo::default());
    }
}
