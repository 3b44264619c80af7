/// Database layer for hellodb
///
/// This module provides the write/read connection router and the helpers it
/// is built from.
///
/// # Modules
///
/// - `config`: Connection settings sourced from `DB_*` environment variables
/// - `pool`: Opening, probing and closing single-connection MySQL handles
/// - `row`: Column-ordered row maps and parameter binding
/// - `replication`: Interpretation of the replica status row
/// - `router`: The `ConnectionRouter` that picks a handle per query intent
///
/// # Example
///
/// ```no_run
/// use hellodb_shared::db::{config::DbConfig, router::ConnectionRouter};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DbConfig::from_env()?;
///     let router = ConnectionRouter::connect(&config).await?;
///
///     let row = router.fetch_one("SELECT 1 AS one", &[]).await?;
///     println!("{:?}", row);
///
///     router.close().await;
///     Ok(())
/// }
/// ```

pub mod config;
pub mod pool;
pub mod replication;
pub mod router;
pub mod row;

/// Errors raised by the database layer
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Could not open a handle to the given host
    #[error("Connection to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: sqlx::Error,
    },

    /// Statement preparation or execution failed
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A column value could not be converted into a row map entry
    #[error("Failed to decode column `{column}` ({type_name}): {source}")]
    Decode {
        column: String,
        type_name: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Result alias for database operations
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_display() {
        let err = DbError::Connect {
            host: "db".to_string(),
            port: 3306,
            source: sqlx::Error::PoolTimedOut,
        };
        assert!(err.to_string().starts_with("Connection to db:3306 failed:"));
    }

    #[test]
    fn test_query_error_from_sqlx() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::Query(_)));
        assert!(err.to_string().starts_with("Query failed:"));
    }
}
