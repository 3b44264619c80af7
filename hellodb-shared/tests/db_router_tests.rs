/// Integration tests for the connection router
///
/// These tests require a running MySQL server.
/// Run with: cargo test --test db_router_tests -- --ignored --test-threads=1
///
/// Connection settings come from the usual variables:
/// export DB_HOST=127.0.0.1 DB_NAME=myapp DB_USER=appuser DB_PASSWORD=apppassword
///
/// A throwaway server matching those settings:
/// docker run --rm -d -p 3306:3306 -e MYSQL_ROOT_PASSWORD=root \
///     -e MYSQL_DATABASE=myapp -e MYSQL_USER=appuser -e MYSQL_PASSWORD=apppassword mysql:8.4
///
/// These are the only tests that reach the column decoding in `db::row` and
/// the empty-result path of `fetch_one`; run them before changing either.

use hellodb_shared::db::config::DbConfig;
use hellodb_shared::db::pool::{close_handle, health_check, open_handle};
use hellodb_shared::db::router::{ConnectionRouter, Intent, ReadRoute};
use serde_json::json;

/// Helper to get the test configuration from the environment
fn get_test_config() -> DbConfig {
    let mut config = DbConfig::from_env().expect("Invalid DB_* environment");
    // Reads stay on the primary unless a test opts into a replica.
    config.read_host = config.host.clone();
    config
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_open_handle_and_health_check() {
    let config = get_test_config();

    let handle = open_handle(&config, &config.host)
        .await
        .expect("Failed to open handle");

    assert!(health_check(&handle).await.is_ok(), "Health check should succeed");
    close_handle(handle).await;
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_same_host_routes_reads_to_primary() {
    let router = ConnectionRouter::connect(&get_test_config())
        .await
        .expect("Failed to connect");

    assert!(matches!(router.route(), ReadRoute::Primary));
    assert!(!router.using_replica());

    router.close().await;
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_unreachable_replica_falls_back_to_write_handle() {
    let mut config = get_test_config();
    config.read_host = "replica.invalid".to_string();
    config.connect_timeout_seconds = 2;

    let router = ConnectionRouter::connect(&config)
        .await
        .expect("Construction must survive a failed replica");

    match router.route() {
        ReadRoute::ReplicaAliasedToPrimary { reason } => assert!(!reason.is_empty()),
        other => panic!("expected aliased route, got {}", other.as_str()),
    }
    assert!(!router.using_replica());

    // Reads still work through the aliased handle
    let row = router
        .fetch_one("SELECT 1 AS one", &[])
        .await
        .expect("Read through aliased handle failed")
        .expect("Expected a row");
    assert_eq!(row["one"], json!(1));

    router.close().await;
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_fetch_one_empty_result() {
    let router = ConnectionRouter::connect(&get_test_config())
        .await
        .expect("Failed to connect");

    let row = router
        .fetch_one("SELECT 1 AS one FROM DUAL WHERE 1 = 0", &[])
        .await
        .expect("Empty result must not be an error");
    assert!(row.is_none());

    router.close().await;
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_fetch_all_binds_params_and_keeps_column_order() {
    let router = ConnectionRouter::connect(&get_test_config())
        .await
        .expect("Failed to connect");

    let rows = router
        .fetch_all(
            "SELECT CAST(? AS SIGNED) AS n, CAST(? AS CHAR) AS label",
            &[json!(7), json!("seven")],
        )
        .await
        .expect("Query failed");

    assert_eq!(rows.len(), 1);
    let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["n", "label"]);
    assert_eq!(rows[0]["n"], json!(7));
    assert_eq!(rows[0]["label"], json!("seven"));

    router.close().await;
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_column_types_decode_to_json() {
    let router = ConnectionRouter::connect(&get_test_config())
        .await
        .expect("Failed to connect");

    let row = router
        .fetch_one(
            "SELECT CAST(1.50 AS DECIMAL(4,2)) AS price, \
                    CAST(5 AS UNSIGNED) AS qty, \
                    -3 AS delta, \
                    2.5e0 AS ratio, \
                    DATE '2024-03-01' AS day, \
                    CAST('2024-03-01 10:20:30' AS DATETIME) AS at, \
                    NULL AS nothing, \
                    'text' AS label",
            &[],
        )
        .await
        .expect("Query failed")
        .expect("Expected a row");

    assert_eq!(row["price"], json!("1.50"));
    assert_eq!(row["qty"], json!(5));
    assert_eq!(row["delta"], json!(-3));
    assert_eq!(row["ratio"], json!(2.5));
    assert_eq!(row["day"], json!("2024-03-01"));
    assert_eq!(row["at"], json!("2024-03-01 10:20:30"));
    assert_eq!(row["nothing"], json!(null));
    assert_eq!(row["label"], json!("text"));

    router.close().await;
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_execute_goes_to_write_handle() {
    let router = ConnectionRouter::connect(&get_test_config())
        .await
        .expect("Failed to connect");

    // Temporary tables are per connection; each handle holds exactly one.
    router
        .execute(
            "CREATE TEMPORARY TABLE hellodb_probe (id INT AUTO_INCREMENT PRIMARY KEY, note VARCHAR(20))",
            &[],
        )
        .await
        .expect("Create failed");

    let result = router
        .execute("INSERT INTO hellodb_probe (note) VALUES (?)", &[json!("hello")])
        .await
        .expect("Insert failed");
    assert_eq!(result.rows_affected(), 1);
    assert_eq!(result.last_insert_id(), 1);

    let rows = router
        .query("SELECT note FROM hellodb_probe", &[], Intent::Write)
        .await
        .expect("Select failed");
    assert_eq!(rows.len(), 1);

    router.close().await;
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_query_error_is_returned() {
    let router = ConnectionRouter::connect(&get_test_config())
        .await
        .expect("Failed to connect");

    let result = router.fetch_all("SELECT * FROM hellodb_missing_table", &[]).await;
    assert!(result.is_err(), "Missing table should fail");

    router.close().await;
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_replication_status_never_fails() {
    let router = ConnectionRouter::connect(&get_test_config())
        .await
        .expect("Failed to connect");

    // SHOW REPLICA STATUS, or SHOW SLAVE STATUS on older servers
    let status = router.replication_status().await;
    if let Some(error) = &status.error {
        assert!(!error.contains("1064"), "probe statement was rejected: {}", error);
    }

    // A primary reports no replica state; a user without REPLICATION CLIENT
    // gets an error instead. Either way the shape is consistent.
    if !status.is_replica {
        assert!(!status.is_running);
        assert!(status.lag.is_none());
        assert!(status.master_host.is_none());
    }

    router.close().await;
}
