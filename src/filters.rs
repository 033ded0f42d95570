//! Filter selection state and report request composition.
//!
//! Every multi-select dimension treats an empty selection as "All": the
//! sentinel label is never stored, toggling it clears the selection.

use insight_api::ReportRequest;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::status_groups;

pub const ALL_OPTION: &str = "All";
pub const ALL_ISSUES_OPTION: &str = "All Issues";
pub const DEFAULT_REPORT_TYPE: &str = "All Issues";

/// A multi-select filter offered in the sidebar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterDimension {
    Team,
    Platform,
    Priority,
    Severity,
    IssueStatus,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 5] = [
        FilterDimension::Team,
        FilterDimension::Platform,
        FilterDimension::Priority,
        FilterDimension::Severity,
        FilterDimension::IssueStatus,
    ];

    /// Synthetic first option meaning "no filtering on this dimension".
    pub fn sentinel(self) -> &'static str {
        match self {
            FilterDimension::IssueStatus => ALL_ISSUES_OPTION,
            _ => ALL_OPTION,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::Team => "Team",
            FilterDimension::Platform => "Platform",
            FilterDimension::Priority => "Priority",
            FilterDimension::Severity => "Severity",
            FilterDimension::IssueStatus => "Issue Status",
        }
    }
}

/// Option list, current selection and dropdown visibility of one dimension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterGroup {
    dimension: FilterDimension,
    options: Vec<String>,
    selected: BTreeSet<String>,
    open: bool,
}

impl FilterGroup {
    pub fn new(dimension: FilterDimension) -> Self {
        let mut group = Self {
            dimension,
            options: Vec::new(),
            selected: BTreeSet::new(),
            open: false,
        };
        if dimension == FilterDimension::IssueStatus {
            group.set_options(status_groups::leaf_statuses().map(str::to_string));
        } else {
            group.set_options(Vec::new());
        }
        group
    }

    pub fn dimension(&self) -> FilterDimension {
        self.dimension
    }

    /// Replaces the option list with the sentinel followed by `fetched`.
    pub fn set_options<I>(&mut self, fetched: I)
    where
        I: IntoIterator<Item = String>,
    {
        let sentinel = self.dimension.sentinel();
        self.options = std::iter::once(sentinel.to_string())
            .chain(fetched.into_iter().filter(|option| option != sentinel))
            .collect();
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether the checkbox for `option` renders as checked.
    pub fn is_checked(&self, option: &str) -> bool {
        if option == self.dimension.sentinel() {
            self.is_all()
        } else {
            self.selected.contains(option)
        }
    }

    /// Clears the selection on the sentinel, otherwise flips membership of `option`.
    pub fn toggle(&mut self, option: &str) {
        if option == self.dimension.sentinel() {
            self.selected.clear();
            return;
        }
        if self.dimension == FilterDimension::IssueStatus
            && status_groups::is_group(option)
            && !status_groups::is_leaf(option)
        {
            debug!("Ignoring toggle of status heading {}", option);
            return;
        }
        if !self.selected.remove(option) {
            self.selected.insert(option.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    fn selected_labels(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }
}

/// Single-choice pickers of the sidebar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleSelect {
    ReportType,
    ReleaseVersion,
    Team,
}

/// Opt-in recipient groups for the emailed report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DistributionFlag {
    IncludeAssignees,
    IncludeReportees,
    IncludeAppLeadership,
    IncludeRegressionTeam,
    IncludeTechLeads,
    IncludeScrumMasters,
    IncludeAllAppTeams,
    SendPerTeamEmails,
}

impl DistributionFlag {
    pub const ALL: [DistributionFlag; 8] = [
        DistributionFlag::IncludeAssignees,
        DistributionFlag::IncludeReportees,
        DistributionFlag::IncludeAppLeadership,
        DistributionFlag::IncludeRegressionTeam,
        DistributionFlag::IncludeTechLeads,
        DistributionFlag::IncludeScrumMasters,
        DistributionFlag::IncludeAllAppTeams,
        DistributionFlag::SendPerTeamEmails,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DistributionFlag::IncludeAssignees => "Include Assignees in Email Report",
            DistributionFlag::IncludeReportees => "Include Reportees in Email Report",
            DistributionFlag::IncludeAppLeadership => "Include App Leadership",
            DistributionFlag::IncludeRegressionTeam => "Include Regression Team",
            DistributionFlag::IncludeTechLeads => "Include Tech Leads",
            DistributionFlag::IncludeScrumMasters => "Include Scrum Masters",
            DistributionFlag::IncludeAllAppTeams => "Include All App Teams",
            DistributionFlag::SendPerTeamEmails => "Send Per-Team Emails",
        }
    }
}

/// Recipient input slots plus the enabled distribution flags.
///
/// The slot list always holds at least one entry so the form keeps a blank input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailDistribution {
    slots: Vec<String>,
    flags: BTreeSet<DistributionFlag>,
}

impl Default for EmailDistribution {
    fn default() -> Self {
        Self {
            slots: vec![String::new()],
            flags: BTreeSet::new(),
        }
    }
}

impl EmailDistribution {
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn add_slot(&mut self) {
        self.slots.push(String::new());
    }

    /// Removes the slot at `index`; removing the last one leaves a single blank slot.
    pub fn remove_slot(&mut self, index: usize) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        self.slots.remove(index);
        if self.slots.is_empty() {
            self.slots.push(String::new());
        }
        true
    }

    pub fn set_slot(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn set_flag(&mut self, flag: DistributionFlag, enabled: bool) {
        if enabled {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }

    pub fn flag(&self, flag: DistributionFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Trimmed, non-blank recipients in slot order. Syntax is left to the backend.
    pub fn recipients(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.trim())
            .filter(|slot| !slot.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn should_send(&self) -> bool {
        !self.flags.is_empty() || self.slots.iter().any(|slot| !slot.trim().is_empty())
    }
}

/// Sidebar form state that composes into a [`ReportRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestComposer {
    report_type: String,
    release_version: String,
    selected_team: String,
    team: FilterGroup,
    platform: FilterGroup,
    priority: FilterGroup,
    severity: FilterGroup,
    status: FilterGroup,
    email: EmailDistribution,
}

impl Default for RequestComposer {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_TYPE, "")
    }
}

impl RequestComposer {
    pub fn new(report_type: impl Into<String>, release_version: impl Into<String>) -> Self {
        Self {
            report_type: report_type.into(),
            release_version: release_version.into(),
            selected_team: ALL_OPTION.to_string(),
            team: FilterGroup::new(FilterDimension::Team),
            platform: FilterGroup::new(FilterDimension::Platform),
            priority: FilterGroup::new(FilterDimension::Priority),
            severity: FilterGroup::new(FilterDimension::Severity),
            status: FilterGroup::new(FilterDimension::IssueStatus),
            email: EmailDistribution::default(),
        }
    }

    pub fn group(&self, dimension: FilterDimension) -> &FilterGroup {
        match dimension {
            FilterDimension::Team => &self.team,
            FilterDimension::Platform => &self.platform,
            FilterDimension::Priority => &self.priority,
            FilterDimension::Severity => &self.severity,
            FilterDimension::IssueStatus => &self.status,
        }
    }

    pub fn group_mut(&mut self, dimension: FilterDimension) -> &mut FilterGroup {
        match dimension {
            FilterDimension::Team => &mut self.team,
            FilterDimension::Platform => &mut self.platform,
            FilterDimension::Priority => &mut self.priority,
            FilterDimension::Severity => &mut self.severity,
            FilterDimension::IssueStatus => &mut self.status,
        }
    }

    pub fn toggle(&mut self, dimension: FilterDimension, option: &str) {
        self.group_mut(dimension).toggle(option);
    }

    pub fn set_options<I>(&mut self, dimension: FilterDimension, fetched: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.group_mut(dimension).set_options(fetched);
    }

    /// Replaces a single-choice value. Values are not checked against loaded options.
    pub fn set_single_select(&mut self, field: SingleSelect, value: impl Into<String>) {
        let value = value.into();
        match field {
            SingleSelect::ReportType => self.report_type = value,
            SingleSelect::ReleaseVersion => self.release_version = value,
            SingleSelect::Team => self.selected_team = value,
        }
    }

    pub fn single_select(&self, field: SingleSelect) -> &str {
        match field {
            SingleSelect::ReportType => &self.report_type,
            SingleSelect::ReleaseVersion => &self.release_version,
            SingleSelect::Team => &self.selected_team,
        }
    }

    pub fn email(&self) -> &EmailDistribution {
        &self.email
    }

    pub fn add_email_slot(&mut self) {
        self.email.add_slot();
    }

    pub fn remove_email_slot(&mut self, index: usize) -> bool {
        self.email.remove_slot(index)
    }

    pub fn set_email_slot(&mut self, index: usize, value: impl Into<String>) -> bool {
        self.email.set_slot(index, value)
    }

    pub fn set_flag(&mut self, flag: DistributionFlag, enabled: bool) {
        self.email.set_flag(flag, enabled);
    }

    pub fn send_email(&self) -> bool {
        self.email.should_send()
    }

    /// Builds the outbound request from the current form state.
    pub fn compose(&self) -> ReportRequest {
        let email = &self.email;
        ReportRequest {
            report_type: self.report_type.clone(),
            release_version: self.release_version.clone(),
            selected_team: self.selected_team.clone(),
            selected_teams: self.team.selected_labels(),
            selected_statuses: self.status.selected_labels(),
            selected_priorities: self.priority.selected_labels(),
            selected_severities: self.severity.selected_labels(),
            selected_platforms: self.platform.selected_labels(),
            send_email_report: email.should_send(),
            email_recipients: email.recipients(),
            include_assignees_in_email_report: email.flag(DistributionFlag::IncludeAssignees),
            include_reportees_in_email_report: email.flag(DistributionFlag::IncludeReportees),
            include_app_leadership: email.flag(DistributionFlag::IncludeAppLeadership),
            include_regression_team: email.flag(DistributionFlag::IncludeRegressionTeam),
            include_tech_leads: email.flag(DistributionFlag::IncludeTechLeads),
            include_scrum_masters: email.flag(DistributionFlag::IncludeScrumMasters),
            include_all_app_teams: email.flag(DistributionFlag::IncludeAllAppTeams),
            send_per_team_emails: email.flag(DistributionFlag::SendPerTeamEmails),
        }
    }
}
