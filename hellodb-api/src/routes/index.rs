/// Greeting page endpoints
///
/// # Endpoints
///
/// ```text
/// GET /         HTML greeting page with status grid and replication panel
/// GET /status   The same status bundle as JSON
/// ```
///
/// Both build a fresh `ConnectionRouter` for the request. The HTML page is
/// always served with 200; database problems show up in its error panel.
/// `/status` answers 503 when the bundle carries an error.

use crate::{
    app::AppState,
    page::{load_status, render_page, StatusBundle},
};
use axum::{extract::State, http::StatusCode, response::Html, Json};

/// Greeting page handler
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let bundle = load_status(&state.config.database).await;
    Html(render_page(&bundle))
}

/// Status bundle as JSON
///
/// Response:
/// ```json
/// {
///   "greeting": "Hello World!",
///   "write_host": "db",
///   "read_host": "db",
///   "using_replica": false,
///   "app_info": { "version": "1.0.0", "environment": "production", "created_at": "..." },
///   "health_check": { "status": "ok", "checked_at": "..." },
///   "replication": { "is_replica": false, "is_running": false, "lag": null, "master_host": null }
/// }
/// ```
pub async fn status(State(state): State<AppState>) -> (StatusCode, Json<StatusBundle>) {
    let bundle = load_status(&state.config.database).await;

    let code = if bundle.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(bundle))
}
