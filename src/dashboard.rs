//! Report dashboard orchestration.
//!
//! Loads picker options from the backend, holds the sidebar form, and runs a
//! single Generate at a time while the loading overlay and notifications
//! reflect its progress.

use chrono::{DateTime, Local};
use insight_api::{EmailGroups, ReportApiClient, ReportRequest, ReportTypeInfo};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::directory::EmailGroupDirectory;
use crate::error::DashboardError;
use crate::filters::{FilterDimension, RequestComposer, SingleSelect};
use crate::lock_or_recover;
use crate::notification::{Notification, NotificationCenter, Severity};
use crate::rotation::{RotationScheduler, RotationSnapshot};

pub const EMPTY_REPORT_HEADLINE: &str = "No report generated yet.";
pub const EMPTY_REPORT_HINT: &str = "Use the sidebar to generate a new report.";
pub const ERROR_REPORT_HTML: &str = r#"<p class="text-danger">Error generating report.</p>"#;
pub const GENERATED_MESSAGE: &str = "Your report has been successfully generated.";
pub const GENERATED_AND_EMAILED_MESSAGE: &str =
    "Your report has been successfully generated and emailed.";
pub const GENERATION_FAILED_MESSAGE: &str =
    "There was an issue generating your report. Please try again.";

type ApiResult<T> = insight_api::Result<T>;

/// Backend calls the dashboard depends on.
pub trait ReportBackend: Send + Sync {
    fn list_releases(&self) -> impl Future<Output = ApiResult<Vec<String>>> + Send;
    fn list_report_types(&self) -> impl Future<Output = ApiResult<Vec<ReportTypeInfo>>> + Send;
    fn list_teams(&self) -> impl Future<Output = ApiResult<Vec<String>>> + Send;
    fn list_platforms(&self) -> impl Future<Output = ApiResult<Vec<String>>> + Send;
    fn list_priorities(&self) -> impl Future<Output = ApiResult<Vec<String>>> + Send;
    fn list_severities(&self) -> impl Future<Output = ApiResult<Vec<String>>> + Send;
    fn list_email_groups(&self) -> impl Future<Output = ApiResult<EmailGroups>> + Send;
    fn generate_report(
        &self,
        request: &ReportRequest,
    ) -> impl Future<Output = ApiResult<String>> + Send;
    fn fetch_facts(&self) -> impl Future<Output = ApiResult<Vec<String>>> + Send;
}

impl ReportBackend for ReportApiClient {
    async fn list_releases(&self) -> ApiResult<Vec<String>> {
        ReportApiClient::list_releases(self).await
    }

    async fn list_report_types(&self) -> ApiResult<Vec<ReportTypeInfo>> {
        ReportApiClient::list_report_types(self).await
    }

    async fn list_teams(&self) -> ApiResult<Vec<String>> {
        ReportApiClient::list_teams(self).await
    }

    async fn list_platforms(&self) -> ApiResult<Vec<String>> {
        ReportApiClient::list_platforms(self).await
    }

    async fn list_priorities(&self) -> ApiResult<Vec<String>> {
        ReportApiClient::list_priorities(self).await
    }

    async fn list_severities(&self) -> ApiResult<Vec<String>> {
        ReportApiClient::list_severities(self).await
    }

    async fn list_email_groups(&self) -> ApiResult<EmailGroups> {
        ReportApiClient::list_email_groups(self).await
    }

    async fn generate_report(&self, request: &ReportRequest) -> ApiResult<String> {
        ReportApiClient::generate_report(self, request).await
    }

    async fn fetch_facts(&self) -> ApiResult<Vec<String>> {
        ReportApiClient::fetch_facts(self).await
    }
}

/// Content of the report pane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReportView {
    Empty,
    Rendered {
        html: String,
        generated_at: DateTime<Local>,
    },
    Failed {
        html: String,
    },
}

impl ReportView {
    /// Headline and hint shown before the first report.
    pub fn placeholder(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ReportView::Empty => Some((EMPTY_REPORT_HEADLINE, EMPTY_REPORT_HINT)),
            _ => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            ReportView::Empty => None,
            ReportView::Rendered { html, .. } | ReportView::Failed { html } => Some(html),
        }
    }
}

/// Listings that could not be fetched during [`Dashboard::load_options`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub failed: Vec<&'static str>,
}

impl LoadSummary {
    fn record<T>(&mut self, listing: &'static str, result: ApiResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Error fetching {}: {}", listing, err);
                self.failed.push(listing);
                None
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of a successful Generate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub emailed: bool,
}

/// Clears the busy flag and stops the overlay even if the Generate future is dropped.
struct InFlight<'a> {
    busy: &'a AtomicBool,
    loader: &'a RotationScheduler,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.loader.stop();
        self.busy.store(false, Ordering::Release);
    }
}

pub struct Dashboard<B> {
    backend: B,
    composer: Mutex<RequestComposer>,
    releases: Mutex<Vec<String>>,
    report_types: Mutex<Vec<ReportTypeInfo>>,
    directory: Mutex<EmailGroupDirectory>,
    report: Mutex<ReportView>,
    facts: OnceCell<Vec<String>>,
    busy: AtomicBool,
    loader: RotationScheduler,
    notifications: NotificationCenter,
}

impl<B: ReportBackend> Dashboard<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        Self::with_parts(
            backend,
            RequestComposer::new(
                config.default_report_type.clone(),
                config.default_release_version.clone(),
            ),
            RotationScheduler::new(config.elapsed_tick(), config.rotation_tick()),
            NotificationCenter::new(config.notification_dismiss()),
        )
    }

    pub fn with_parts(
        backend: B,
        composer: RequestComposer,
        loader: RotationScheduler,
        notifications: NotificationCenter,
    ) -> Self {
        Self {
            backend,
            composer: Mutex::new(composer),
            releases: Mutex::new(Vec::new()),
            report_types: Mutex::new(Vec::new()),
            directory: Mutex::new(EmailGroupDirectory::default()),
            report: Mutex::new(ReportView::Empty),
            facts: OnceCell::new(),
            busy: AtomicBool::new(false),
            loader,
            notifications,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetches every picker listing concurrently. Failed listings stay empty.
    pub async fn load_options(&self) -> LoadSummary {
        let backend = &self.backend;
        let (releases, report_types, teams, platforms, priorities, severities, email_groups) =
            tokio::join!(
                backend.list_releases(),
                backend.list_report_types(),
                backend.list_teams(),
                backend.list_platforms(),
                backend.list_priorities(),
                backend.list_severities(),
                backend.list_email_groups(),
            );

        let mut summary = LoadSummary::default();
        let releases = summary.record("releases", releases);
        let report_types = summary.record("report types", report_types);
        let teams = summary.record("teams", teams);
        let platforms = summary.record("platforms", platforms);
        let priorities = summary.record("priorities", priorities);
        let severities = summary.record("severities", severities);
        let email_groups = summary.record("email groups", email_groups);

        {
            let mut composer = lock_or_recover(&self.composer);
            if let Some(first) = releases.as_ref().and_then(|list| list.first()) {
                composer.set_single_select(SingleSelect::ReleaseVersion, first.clone());
            }
            if let Some(first) = report_types.as_ref().and_then(|list| list.first()) {
                composer.set_single_select(SingleSelect::ReportType, first.name.clone());
            }
            let listings = [
                (FilterDimension::Team, teams),
                (FilterDimension::Platform, platforms),
                (FilterDimension::Priority, priorities),
                (FilterDimension::Severity, severities),
            ];
            for (dimension, options) in listings {
                if let Some(options) = options {
                    composer.set_options(dimension, options);
                }
            }
        }
        if let Some(releases) = releases {
            *lock_or_recover(&self.releases) = releases;
        }
        if let Some(report_types) = report_types {
            *lock_or_recover(&self.report_types) = report_types;
        }
        if let Some(groups) = email_groups {
            *lock_or_recover(&self.directory) = EmailGroupDirectory::from(groups);
        }

        if summary.is_complete() {
            debug!("Dashboard options loaded");
        } else {
            info!("Dashboard options loaded with {} failed listings", summary.failed.len());
        }
        summary
    }

    /// Applies `edit` to the sidebar form.
    pub fn update<T>(&self, edit: impl FnOnce(&mut RequestComposer) -> T) -> T {
        edit(&mut lock_or_recover(&self.composer))
    }

    pub fn composer(&self) -> RequestComposer {
        lock_or_recover(&self.composer).clone()
    }

    pub fn releases(&self) -> Vec<String> {
        lock_or_recover(&self.releases).clone()
    }

    pub fn report_types(&self) -> Vec<ReportTypeInfo> {
        lock_or_recover(&self.report_types).clone()
    }

    /// Blurb shown under the report type picker.
    pub fn description_for(&self, report_type: &str) -> Option<String> {
        lock_or_recover(&self.report_types)
            .iter()
            .find(|info| info.name == report_type)
            .map(|info| info.description.clone())
    }

    pub fn directory(&self) -> EmailGroupDirectory {
        lock_or_recover(&self.directory).clone()
    }

    pub fn report(&self) -> ReportView {
        lock_or_recover(&self.report).clone()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Overlay state while a Generate is running.
    pub fn loading(&self) -> Option<RotationSnapshot> {
        let snapshot = self.loader.snapshot();
        if snapshot.running {
            Some(snapshot)
        } else {
            None
        }
    }

    /// Composes the current form, sends it and updates the report pane.
    ///
    /// Rejected with [`DashboardError::Busy`] while another Generate is in flight.
    pub async fn generate(&self) -> Result<GenerateOutcome, DashboardError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Generate ignored while a report is in flight");
            return Err(DashboardError::Busy);
        }
        let _in_flight = InFlight {
            busy: &self.busy,
            loader: &self.loader,
        };

        self.notifications.dismiss();
        let request = self.composer().compose();
        info!(
            "Generating {} report for {} ({} recipients)",
            request.report_type,
            request.release_version,
            request.email_recipients.len()
        );

        if !self.loader.start(Vec::new()) {
            debug!("Generating without the loading overlay");
        }

        let report = self.backend.generate_report(&request);
        tokio::pin!(report);
        let result = tokio::select! {
            biased;
            facts = self.facts() => {
                self.loader.install(facts);
                report.await
            }
            result = &mut report => result,
        };
        self.loader.stop();

        match result {
            Ok(html) => {
                *lock_or_recover(&self.report) = ReportView::Rendered {
                    html,
                    generated_at: Local::now(),
                };
                let emailed = request.send_email_report;
                let message = if emailed {
                    GENERATED_AND_EMAILED_MESSAGE
                } else {
                    GENERATED_MESSAGE
                };
                self.notify(message, Severity::Success);
                Ok(GenerateOutcome { emailed })
            }
            Err(err) => {
                error!("Error generating report: {}", err);
                *lock_or_recover(&self.report) = ReportView::Failed {
                    html: ERROR_REPORT_HTML.to_string(),
                };
                self.notify(GENERATION_FAILED_MESSAGE, Severity::Error);
                Err(DashboardError::Api(err))
            }
        }
    }

    async fn facts(&self) -> Vec<String> {
        self.facts
            .get_or_init(|| async {
                match self.backend.fetch_facts().await {
                    Ok(facts) => facts,
                    Err(err) => {
                        warn!("Error fetching facts: {}", err);
                        Vec::new()
                    }
                }
            })
            .await
            .clone()
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.notifications
            .show(Notification::new(message, severity), move || {
                debug!("{:?} notification closed", severity)
            });
    }
}
