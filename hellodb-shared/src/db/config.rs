/// Database connection settings
///
/// Every setting comes from an environment variable with a static default.
/// An empty variable counts as unset.
///
/// # Environment Variables
///
/// - `DB_HOST`: Primary (write) host (default: `db`)
/// - `DB_READ_HOST`: Replica (read) host (default: value of `DB_HOST`)
/// - `DB_NAME`: Database name (default: `myapp`)
/// - `DB_USER`: User name (default: `appuser`)
/// - `DB_PASSWORD`: Password (default: `apppassword`)
/// - `DB_PORT`: Port shared by both hosts (default: `3306`)
/// - `DB_CONNECT_TIMEOUT_SECONDS`: Connect/acquire timeout (default: `5`)

use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;
use std::{env, fmt};

pub const DEFAULT_HOST: &str = "db";
pub const DEFAULT_NAME: &str = "myapp";
pub const DEFAULT_USER: &str = "appuser";
pub const DEFAULT_PASSWORD: &str = "apppassword";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum DbConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Connection settings for the primary and replica hosts
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Primary host, receives every write
    pub host: String,

    /// Replica host, receives reads. Equal to `host` when no replica is configured.
    pub read_host: String,

    /// Database (schema) name
    pub name: String,

    /// User name for both hosts
    pub user: String,

    /// Password for both hosts
    #[serde(skip_serializing)]
    pub password: String,

    /// Port for both hosts
    pub port: u16,

    /// Upper bound on opening a handle, in seconds
    pub connect_timeout_seconds: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("read_host", &self.read_host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("port", &self.port)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            read_host: DEFAULT_HOST.to_string(),
            name: DEFAULT_NAME.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_seconds: DEFAULT_CONNECT_TIMEOUT_SECONDS,
        }
    }
}

impl DbConfig {
    /// Loads the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `DB_PORT` or `DB_CONNECT_TIMEOUT_SECONDS` is set to
    /// something that does not parse.
    pub fn from_env() -> Result<Self, DbConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup
    ///
    /// # Example
    ///
    /// ```
    /// use hellodb_shared::db::config::DbConfig;
    ///
    /// let config = DbConfig::from_lookup(|key| match key {
    ///     "DB_HOST" => Some("primary".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(config.read_host, "primary");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let host = var("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let read_host = var("DB_READ_HOST").unwrap_or_else(|| host.clone());

        let port = match var("DB_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| DbConfigError::InvalidValue { key: "DB_PORT", value })?,
            None => DEFAULT_PORT,
        };

        let connect_timeout_seconds = match var("DB_CONNECT_TIMEOUT_SECONDS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| DbConfigError::InvalidValue {
                key: "DB_CONNECT_TIMEOUT_SECONDS",
                value,
            })?,
            None => DEFAULT_CONNECT_TIMEOUT_SECONDS,
        };

        Ok(Self {
            host,
            read_host,
            name: var("DB_NAME").unwrap_or_else(|| DEFAULT_NAME.to_string()),
            user: var("DB_USER").unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: var("DB_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            port,
            connect_timeout_seconds,
        })
    }

    /// Whether reads are configured to go somewhere other than the primary
    pub fn has_distinct_read_host(&self) -> bool {
        self.read_host != self.host
    }

    /// Driver connect options for one of the configured hosts
    pub fn connect_options(&self, host: &str) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}
