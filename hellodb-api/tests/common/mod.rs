/// Common test utilities for integration tests
///
/// The router is built against a database address nothing listens on, so
/// every request exercises the failure paths without needing MySQL.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hellodb_api::app::{build_router, AppState};
use hellodb_api::config::{ApiConfig, Config};
use hellodb_shared::db::config::DbConfig;
use tower::Service as _;

/// Test context containing the app and the configuration it was built from
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a context whose primary and replica are both unreachable
    pub fn offline(read_host: &str) -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DbConfig {
                host: "127.0.0.1".to_string(),
                read_host: read_host.to_string(),
                port: 1,
                connect_timeout_seconds: 1,
                ..Default::default()
            },
        };

        let app = build_router(AppState::new(config.clone()));
        TestContext { app, config }
    }

    /// Issues a GET and returns status and body text
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8_lossy(&body).into_owned())
    }
}
