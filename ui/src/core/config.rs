//! Dashboard configuration. Defaults match the published snapshot layout; the
//! snapshot URL can be overridden at build time with `PEA_SNAPSHOT_URL`.

use time::UtcOffset;

use crate::core::platform;

/// Path the daily pipeline publishes the snapshot to.
pub const DEFAULT_SNAPSHOT_PATH: &str = "/data/prediction.json";

/// Bangkok time, where the producer runs.
pub const DEFAULT_DISPLAY_OFFSET_HOURS: i8 = 7;

pub const DEFAULT_ANIMATION_MS: f64 = 800.0;

/// Environment variable naming the snapshot URL (build time on the web,
/// process environment on desktop).
pub const SNAPSHOT_URL_ENV: &str = "PEA_SNAPSHOT_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub snapshot_url: String,
    pub display_offset: UtcOffset,
    pub animation_ms: f64,
    pub chart: ChartFrame,
}

/// Viewbox of the backtest line chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 100.0,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            // `option_env!` takes a literal; same variable as `SNAPSHOT_URL_ENV`.
            snapshot_url: resolve_snapshot_url(option_env!("PEA_SNAPSHOT_URL")),
            display_offset: UtcOffset::from_hms(DEFAULT_DISPLAY_OFFSET_HOURS, 0, 0)
                .unwrap_or(UtcOffset::UTC),
            animation_ms: DEFAULT_ANIMATION_MS,
            chart: ChartFrame::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_snapshot_url(mut self, url: impl Into<String>) -> Self {
        self.snapshot_url = url.into();
        self
    }

    /// Applies a runtime override; blank values keep the current URL.
    pub fn with_snapshot_override(self, url: Option<&str>) -> Self {
        match url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => {
                tracing::info!(url, "snapshot URL overridden");
                self.with_snapshot_url(resolve_snapshot_url(Some(url)))
            }
            None => self,
        }
    }
}

/// Absolute URLs pass through; relative paths are joined onto the page origin
/// when one exists (the HTTP client cannot resolve relative URLs itself).
fn resolve_snapshot_url(override_url: Option<&str>) -> String {
    let raw = override_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_SNAPSHOT_PATH);

    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }

    match platform::page_origin() {
        Some(origin) => join_url(&origin, raw),
        None => raw.to_string(),
    }
}

fn join_url(origin: &str, path: &str) -> String {
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
