/// Greeting page
///
/// Builds the status bundle shown on `/` and renders it to HTML.
///
/// # Status bundle
///
/// One bundle is built per request:
///
/// ```text
/// ConnectionRouter::connect
///   ├─> fetch_one(app_info)
///   ├─> fetch_one(health_check)
///   ├─> replication_status()
///   └─> close
/// ```
///
/// Any failure along the way produces a bundle with `error` set,
/// `using_replica = false` and the configured hosts, which renders as an
/// error panel rather than an error response.

use hellodb_shared::db::{
    config::DbConfig,
    replication::ReplicationStatus,
    router::ConnectionRouter,
    DbResult,
};
use hellodb_shared::models::{app_info::AppInfo, health_check::HealthCheck};
use hellodb_shared::status::StatusSource;
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, warn};

/// Text shown in the page heading
pub const GREETING: &str = "Hello World!";

/// Returns the page greeting
pub fn greeting() -> &'static str {
    GREETING
}

/// Everything the page displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBundle {
    /// Heading text
    pub greeting: String,

    /// Configured primary host
    pub write_host: String,

    /// Configured replica host
    pub read_host: String,

    /// Reads reached a separate replica
    pub using_replica: bool,

    /// Latest `app_info` row
    pub app_info: Option<AppInfo>,

    /// Latest `health_check` row
    pub health_check: Option<HealthCheck>,

    /// Replica state of the read handle
    pub replication: Option<ReplicationStatus>,

    /// Why the bundle is incomplete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusBundle {
    /// Collects the bundle from `source`
    ///
    /// A failed read turns the whole bundle into an error bundle.
    pub async fn collect(config: &DbConfig, source: &dyn StatusSource) -> Self {
        match gather(source).await {
            Ok((app_info, health_check, replication)) => Self {
                greeting: greeting().to_string(),
                write_host: config.host.clone(),
                read_host: config.read_host.clone(),
                using_replica: source.using_replica(),
                app_info,
                health_check,
                replication: Some(replication),
                error: None,
            },
            Err(err) => {
                warn!(error = %err, "Status collection failed");
                Self::failed(config, &err)
            }
        }
    }

    /// Error bundle carrying `err` and the configured hosts
    pub fn failed(config: &DbConfig, err: &dyn fmt::Display) -> Self {
        Self {
            greeting: greeting().to_string(),
            write_host: config.host.clone(),
            read_host: config.read_host.clone(),
            using_replica: false,
            app_info: None,
            health_check: None,
            replication: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

async fn gather(
    source: &dyn StatusSource,
) -> DbResult<(Option<AppInfo>, Option<HealthCheck>, ReplicationStatus)> {
    let app_info = source
        .fetch_one(AppInfo::LATEST_SQL, &[])
        .await?
        .map(|row| AppInfo::from_row(&row));

    let health_check = source
        .fetch_one(HealthCheck::LATEST_SQL, &[])
        .await?
        .map(|row| HealthCheck::from_row(&row));

    let replication = source.replication_status().await;

    Ok((app_info, health_check, replication))
}

/// Opens a router for `config`, collects the bundle and closes the router
pub async fn load_status(config: &DbConfig) -> StatusBundle {
    let router = match ConnectionRouter::connect(config).await {
        Ok(router) => router,
        Err(err) => {
            error!(error = %err, "Could not open database connections");
            return StatusBundle::failed(config, &err);
        }
    };

    let bundle = StatusBundle::collect(config, &router).await;
    router.close().await;

    debug!(ok = bundle.is_ok(), using_replica = bundle.using_replica, "Status collected");
    bundle
}

/// Escapes text for use in HTML element content and attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
        body {
            font-family: Arial, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            margin: 0;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
        }
        .container {
            text-align: center;
            padding: 2rem;
            background: white;
            border-radius: 10px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.2);
            max-width: 720px;
        }
        h1 { color: #333; margin: 0; }
        h2 { color: #555; font-size: 1.1rem; margin: 1.5rem 0 0.5rem; }
        .status-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
            gap: 0.75rem;
            margin-top: 1.5rem;
        }
        .card { background: #f5f6fa; border-radius: 6px; padding: 0.75rem; }
        .label { color: #888; font-size: 0.8rem; text-transform: uppercase; }
        .value { color: #333; font-weight: bold; margin-top: 0.25rem; word-break: break-all; }
        .panel { margin-top: 1.5rem; text-align: left; }
        .error { background: #fdecea; color: #b71c1c; border-radius: 6px; padding: 0.75rem; margin-top: 1rem; }
        .ok { color: #2e7d32; }
        .bad { color: #c62828; }
"#;

/// Renders the full HTML document for `bundle`
pub fn render_page(bundle: &StatusBundle) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str("    <title>hellodb</title>\n");
    html.push_str(&format!("    <style>{}</style>\n", STYLE));
    html.push_str("</head>\n<body>\n    <div class=\"container\">\n");

    html.push_str(&format!(
        "        <h1>{}</h1>\n",
        escape_html(&bundle.greeting)
    ));
    html.push_str("        <p>This is a simple dockerized Rust application</p>\n");

    if let Some(err) = &bundle.error {
        html.push_str(&format!(
            "        <div class=\"error\"><strong>Database error:</strong> {}</div>\n",
            escape_html(err)
        ));
    }

    let app_info = bundle.app_info.clone().unwrap_or_default();
    let health_check = bundle.health_check.clone().unwrap_or_default();

    html.push_str("        <div class=\"status-grid\">\n");
    html.push_str(&card("Version", app_info.version.as_deref()));
    html.push_str(&card("Environment", app_info.environment.as_deref()));
    html.push_str(&card("Health", health_check.status.as_deref()));
    html.push_str(&card("Last check", health_check.checked_at.as_deref()));
    html.push_str(&card("Write host", Some(bundle.write_host.as_str())));
    html.push_str(&card("Read host", Some(bundle.read_host.as_str())));
    html.push_str(&card("Using replica", Some(yes_no(bundle.using_replica))));
    html.push_str("        </div>\n");

    html.push_str(&replication_panel(bundle.replication.as_ref()));

    html.push_str("    </div>\n</body>\n</html>\n");
    html
}

fn card(label: &str, value: Option<&str>) -> String {
    format!(
        "            <div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
        escape_html(label),
        escape_html(value.unwrap_or("n/a"))
    )
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn replication_panel(status: Option<&ReplicationStatus>) -> String {
    let mut html = String::from("        <div class=\"panel\">\n            <h2>Replication</h2>\n");

    match status {
        None => html.push_str("            <p>Replication status unavailable</p>\n"),
        Some(status) => {
            let running_class = if status.is_running { "ok" } else { "bad" };
            let lag = status
                .lag
                .map(|seconds| format!("{}s", seconds))
                .unwrap_or_else(|| "n/a".to_string());

            html.push_str(&format!(
                "            <p>Replica: {}</p>\n",
                yes_no(status.is_replica)
            ));
            html.push_str(&format!(
                "            <p>Running: <span class=\"{}\">{}</span></p>\n",
                running_class,
                yes_no(status.is_running)
            ));
            html.push_str(&format!("            <p>Lag: {}</p>\n", escape_html(&lag)));
            html.push_str(&format!(
                "            <p>Source host: {}</p>\n",
                escape_html(status.master_host.as_deref().unwrap_or("n/a"))
            ));

            if let Some(err) = &status.error {
                html.push_str(&format!(
                    "            <div class=\"error\">{}</div>\n",
                    escape_html(err)
                ));
            }
        }
    }

    html.push_str("        </div>\n");
    html
}
