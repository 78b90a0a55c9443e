//! # Configuration
//!
//! Settings come from a JSON file (by default
//! `<config dir>/campaign-insights/config.json`). Every field is optional and
//! falls back to its default; command line flags override on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InsightError, Result};
use crate::plotting::ChartStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Root URL of the campaign server
    pub base_url: String,
    /// User viewing the dashboard
    pub username: String,
    /// Folder holding `<uuid>.json` campaign documents
    pub campaigns_folder: PathBuf,
    /// Where chart images are written
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub max_concurrent_fetches: usize,
    pub chart: ChartStyle,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            username: String::new(),
            campaigns_folder: PathBuf::from("campaigns_data/campaign"),
            output_dir: PathBuf::from("insight-charts"),
            request_timeout_secs: 30,
            max_concurrent_fetches: default_concurrency(),
            chart: ChartStyle::default(),
        }
    }
}

impl DashboardConfig {
    /// `<config dir>/campaign-insights/config.json`, if the platform has a
    /// config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("campaign-insights").join("config.json"))
    }

    /// Load from `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InsightError::Config(format!("{}: {e}", path.display())))
    }

    /// Load from `path` if given, otherwise from [`Self::default_path`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Fetches are network bound, so allow several per core.
fn default_concurrency() -> usize {
    num_cpus::get().max(1) * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = DashboardConfig::load(&temp_dir.path().join("nope.json")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"base_url": "https://campaigns.example.org", "chart": {"width": 800}}"#,
        )
        .unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://campaigns.example.org");
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, ChartStyle::default().height);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{\"request_timeout_secs\": \"soon\"}").unwrap();

        let err = DashboardConfig::load(&path).unwrap_err();
        assert!(matches!(err, InsightError::Config(_)));
    }

    #[test]
    fn test_default_concurrency_is_positive() {
        assert!(DashboardConfig::default().max_concurrent_fetches >= 4);
    }
}
