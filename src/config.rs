//! Persistent dashboard configuration model and file-backed manager.

use insight_api::config::{DEFAULT_API_BASE, DEFAULT_FACTS_PATH};
use insight_api::ApiConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DashboardError;
use crate::filters::DEFAULT_REPORT_TYPE;

const DEFAULT_ELAPSED_TICK_MILLIS: u64 = 1_000;
const DEFAULT_ROTATION_TICK_MILLIS: u64 = 5_000;
const DEFAULT_DISMISS_MILLIS: u64 = 3_000;

/// Backend location, timeouts, overlay timing and initial form values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Zero disables the timeout for report generation.
    pub report_timeout_secs: u64,
    pub elapsed_tick_millis: u64,
    pub rotation_tick_millis: u64,
    pub notification_dismiss_millis: u64,
    pub facts_path: String,
    pub default_report_type: String,
    pub default_release_version: String,
}

impl Default for Config {
    /// Returns baseline config when no persisted settings are available.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 30,
            report_timeout_secs: 600,
            elapsed_tick_millis: DEFAULT_ELAPSED_TICK_MILLIS,
            rotation_tick_millis: DEFAULT_ROTATION_TICK_MILLIS,
            notification_dismiss_millis: DEFAULT_DISMISS_MILLIS,
            facts_path: DEFAULT_FACTS_PATH.to_string(),
            default_report_type: DEFAULT_REPORT_TYPE.to_string(),
            default_release_version: String::new(),
        }
    }
}

impl Config {
    /// Replaces zero periods and blank paths with defaults.
    pub fn normalized(mut self) -> Self {
        let defaults = Config::default();
        if self.elapsed_tick_millis == 0 {
            self.elapsed_tick_millis = defaults.elapsed_tick_millis;
        }
        if self.rotation_tick_millis == 0 {
            self.rotation_tick_millis = defaults.rotation_tick_millis;
        }
        if self.notification_dismiss_millis == 0 {
            self.notification_dismiss_millis = defaults.notification_dismiss_millis;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = defaults.request_timeout_secs;
        }
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = defaults.api_base_url;
        }
        if self.facts_path.trim().is_empty() {
            self.facts_path = defaults.facts_path;
        }
        self
    }

    pub fn api_config(&self) -> ApiConfig {
        let report_timeout =
            (self.report_timeout_secs > 0).then(|| Duration::from_secs(self.report_timeout_secs));
        ApiConfig::new(self.api_base_url.trim())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_report_timeout(report_timeout)
            .with_facts_path(self.facts_path.clone())
    }

    pub fn elapsed_tick(&self) -> Duration {
        Duration::from_millis(self.elapsed_tick_millis)
    }

    pub fn rotation_tick(&self) -> Duration {
        Duration::from_millis(self.rotation_tick_millis)
    }

    pub fn notification_dismiss(&self) -> Duration {
        Duration::from_millis(self.notification_dismiss_millis)
    }
}

/// Loads and saves the configuration as JSON in the platform config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Creates a manager bound to the platform-specific app config path.
    pub fn new() -> Result<Self, DashboardError> {
        let dirs = directories::ProjectDirs::from("io", "insight-hub", "insight-hub")
            .ok_or_else(|| DashboardError::Config("could not determine config directory".into()))?;
        Ok(Self::at(dirs.config_dir().join("config.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads config from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> Config {
        if !self.path.exists() {
            return Config::default();
        }
        let loaded = fs::read_to_string(&self.path)
            .map_err(|err| err.to_string())
            .and_then(|content| {
                serde_json::from_str::<Config>(&content).map_err(|err| err.to_string())
            });
        match loaded {
            Ok(config) => config.normalized(),
            Err(err) => {
                log::warn!("Ignoring unreadable config {}: {}", self.path.display(), err);
                Config::default()
            }
        }
    }

    /// Persists config to disk, creating parent directories when needed.
    pub fn save(&self, config: &Config) -> Result<(), DashboardError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)
            .map_err(|err| DashboardError::Config(err.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigManager};
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn unique_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("insight-hub-tests-{name}-{nanos}/config.json"))
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.elapsed_tick(), Duration::from_secs(1));
        assert_eq!(config.rotation_tick(), Duration::from_secs(5));
        assert_eq!(config.notification_dismiss(), Duration::from_secs(3));
        assert_eq!(config.default_report_type, "All Issues");
    }

    #[test]
    fn load_missing_file_returns_default() {
        let manager = ConfigManager::at(unique_path("missing"));
        assert_eq!(manager.load(), Config::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = unique_path("roundtrip");
        let parent = path.parent().map(ToOwned::to_owned);

        let manager = ConfigManager::at(path.clone());
        let config = Config {
            api_base_url: "https://reports.corp.io".to_string(),
            report_timeout_secs: 0,
            default_release_version: "APP 25.08-R2".to_string(),
            ..Config::default()
        };

        manager.save(&config).expect("save should succeed");
        let loaded = manager.load();
        assert_eq!(loaded, config);

        if let Some(parent) = parent {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn load_invalid_json_falls_back_to_default() {
        let path = unique_path("invalid");
        let parent = path.parent().expect("parent must exist");
        fs::create_dir_all(parent).expect("create temp directory");
        fs::write(&path, "not-valid-json").expect("write invalid config");

        let manager = ConfigManager::at(path.clone());
        assert_eq!(manager.load(), Config::default());

        let _ = fs::remove_dir_all(parent);
    }

    #[test]
    fn partial_file_keeps_defaults_and_fixes_zero_ticks() {
        let path = unique_path("partial");
        let parent = path.parent().expect("parent must exist");
        fs::create_dir_all(parent).expect("create temp directory");
        fs::write(&path, r#"{"api_base_url": "http://10.0.0.5:8000", "elapsed_tick_millis": 0}"#)
            .expect("write partial config");

        let loaded = ConfigManager::at(path.clone()).load();
        assert_eq!(loaded.api_base_url, "http://10.0.0.5:8000");
        assert_eq!(loaded.elapsed_tick_millis, 1_000);
        assert_eq!(loaded.rotation_tick_millis, 5_000);

        let _ = fs::remove_dir_all(parent);
    }

    #[test]
    fn zero_dismiss_delay_falls_back_to_default() {
        let config = Config {
            notification_dismiss_millis: 0,
            ..Config::default()
        }
        .normalized();
        assert_eq!(config.notification_dismiss(), Duration::from_secs(3));
    }

    #[test]
    fn zero_report_timeout_disables_it() {
        let config = Config {
            report_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.api_config().report_timeout, None);
        assert_eq!(
            Config::default().api_config().report_timeout,
            Some(Duration::from_secs(600))
        );
    }
}
