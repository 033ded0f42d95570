//! Read-only view of the backend email distribution groups, used for tooltips.

use insight_api::EmailGroups;
use std::sync::Arc;

use crate::filters::DistributionFlag;

const EMPTY_GROUP_TOOLTIP: &str = "No recipients configured";

/// Immutable, cheaply cloneable directory of distribution recipients.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailGroupDirectory {
    groups: Arc<EmailGroups>,
}

impl From<EmailGroups> for EmailGroupDirectory {
    fn from(groups: EmailGroups) -> Self {
        Self {
            groups: Arc::new(groups),
        }
    }
}

impl EmailGroupDirectory {
    /// Addresses behind a flag. Flags resolved per issue or per team have no fixed list.
    pub fn recipients(&self, flag: DistributionFlag) -> Option<&[String]> {
        let groups = &self.groups;
        match flag {
            DistributionFlag::IncludeAppLeadership => Some(groups.app_leadership.as_slice()),
            DistributionFlag::IncludeRegressionTeam => Some(groups.regression_team.as_slice()),
            DistributionFlag::IncludeTechLeads => Some(groups.tech_leads.as_slice()),
            DistributionFlag::IncludeScrumMasters => Some(groups.scrum_masters.as_slice()),
            DistributionFlag::IncludeAllAppTeams => Some(groups.all_app_teams.as_slice()),
            DistributionFlag::IncludeAssignees
            | DistributionFlag::IncludeReportees
            | DistributionFlag::SendPerTeamEmails => None,
        }
    }

    pub fn tooltip(&self, flag: DistributionFlag) -> Option<String> {
        self.recipients(flag).map(|recipients| {
            if recipients.is_empty() {
                EMPTY_GROUP_TOOLTIP.to_string()
            } else {
                recipients.join(", ")
            }
        })
    }

    pub fn team_recipients(&self, team: &str) -> &[String] {
        self.groups
            .team_email_distros
            .get(team)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.groups.team_email_distros.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        *self.groups == EmailGroups::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn directory() -> EmailGroupDirectory {
        let mut teams = BTreeMap::new();
        teams.insert("Checkout".to_string(), vec!["checkout@corp.io".to_string()]);
        EmailGroupDirectory::from(EmailGroups {
            team_email_distros: teams,
            app_leadership: vec!["vp@corp.io".to_string(), "director@corp.io".to_string()],
            tech_leads: vec!["lead@corp.io".to_string()],
            ..EmailGroups::default()
        })
    }

    #[test]
    fn tooltip_joins_addresses() {
        assert_eq!(
            directory().tooltip(DistributionFlag::IncludeAppLeadership).as_deref(),
            Some("vp@corp.io, director@corp.io")
        );
    }

    #[test]
    fn empty_group_has_placeholder_tooltip() {
        assert_eq!(
            directory().tooltip(DistributionFlag::IncludeScrumMasters).as_deref(),
            Some("No recipients configured")
        );
    }

    #[test]
    fn per_issue_flags_have_no_tooltip() {
        let directory = directory();
        assert_eq!(directory.tooltip(DistributionFlag::IncludeAssignees), None);
        assert_eq!(directory.tooltip(DistributionFlag::IncludeReportees), None);
    }

    #[test]
    fn team_lookup_falls_back_to_empty() {
        let directory = directory();
        assert_eq!(directory.team_recipients("Checkout"), &["checkout@corp.io"]);
        assert!(directory.team_recipients("Payments").is_empty());
        assert_eq!(directory.teams().collect::<Vec<_>>(), vec!["Checkout"]);
    }

    #[test]
    fn default_directory_is_empty() {
        assert!(EmailGroupDirectory::default().is_empty());
        assert!(!directory().is_empty());
    }
}
