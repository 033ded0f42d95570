//! Generate-report request and response payloads.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate-report`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub report_type: String,
    pub release_version: String,
    pub selected_team: String,
    /// Multi-select team filter; omitted from the body while empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_teams: Vec<String>,
    pub selected_statuses: Vec<String>,
    pub selected_priorities: Vec<String>,
    pub selected_severities: Vec<String>,
    pub selected_platforms: Vec<String>,
    pub send_email_report: bool,
    pub email_recipients: Vec<String>,
    pub include_assignees_in_email_report: bool,
    pub include_reportees_in_email_report: bool,
    pub include_app_leadership: bool,
    pub include_regression_team: bool,
    pub include_tech_leads: bool,
    pub include_scrum_masters: bool,
    pub include_all_app_teams: bool,
    pub send_per_team_emails: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportResponse {
    pub report: String,
}
