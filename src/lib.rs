//! Dashboard state for the Insight Hub regression report frontend.
//!
//! The sidebar form lives in [`filters`], the loading overlay in [`rotation`],
//! the message banner in [`notification`], and [`dashboard::Dashboard`] ties
//! them to a [`dashboard::ReportBackend`].

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod config;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod filters;
pub mod notification;
pub mod rotation;
pub mod status_groups;

pub use config::{Config, ConfigManager};
pub use dashboard::{Dashboard, GenerateOutcome, LoadSummary, ReportBackend, ReportView};
pub use directory::EmailGroupDirectory;
pub use error::DashboardError;
pub use filters::{
    DistributionFlag, EmailDistribution, FilterDimension, FilterGroup, RequestComposer,
    SingleSelect,
};
pub use insight_api::{ApiConfig, ReportApiClient, ReportRequest};
pub use notification::{Notification, NotificationCenter, Severity};
pub use rotation::{format_elapsed, shuffle, RotationScheduler, RotationSnapshot, RotationState};

/// Installs the env_logger backend; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

/// Builds a dashboard talking to the backend described by `config`.
pub fn connect(config: &Config) -> Result<Dashboard<ReportApiClient>, DashboardError> {
    let client = ReportApiClient::new(config.api_config())?;
    log::info!("Using report backend at {}", client.config().root());
    Ok(Dashboard::new(client, config))
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_uses_configured_backend() {
        let config = Config {
            api_base_url: "http://reports.local:9000/".to_string(),
            ..Config::default()
        };
        let dashboard = connect(&config).expect("client should build");
        assert_eq!(dashboard.backend().config().root(), "http://reports.local:9000");
        assert!(!dashboard.is_busy());
    }

    #[test]
    fn init_logging_can_run_twice() {
        init_logging();
        init_logging();
    }
}
