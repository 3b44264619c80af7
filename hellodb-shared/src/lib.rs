//! # hellodb Shared Library
//!
//! This crate contains the database layer used by the hellodb API server:
//! a primary/replica connection router, row mapping helpers, the replication
//! probe, and the typed status rows the greeting page displays.
//!
//! ## Module Organization
//!
//! - `db`: Configuration, handle management, routing and replication status
//! - `models`: Status rows read from `app_info` and `health_check`
//! - `status`: The `StatusSource` trait consumed by the page aggregator

pub mod db;
pub mod models;
pub mod status;

/// Current version of the hellodb shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
