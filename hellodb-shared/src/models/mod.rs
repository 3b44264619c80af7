/// Status rows shown on the greeting page
///
/// # Models
///
/// - `app_info`: Deployed version and environment
/// - `health_check`: Last recorded health check
///
/// Both are read with `ConnectionRouter::fetch_one` and converted from the
/// returned row map.
///
/// # Example
///
/// ```no_run
/// use hellodb_shared::db::{config::DbConfig, router::ConnectionRouter};
/// use hellodb_shared::models::app_info::AppInfo;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let router = ConnectionRouter::connect(&DbConfig::default()).await?;
///
/// let info = router
///     .fetch_one(AppInfo::LATEST_SQL, &[])
///     .await?
///     .map(|row| AppInfo::from_row(&row));
/// # Ok(())
/// # }
/// ```

pub mod app_info;
pub mod health_check;
