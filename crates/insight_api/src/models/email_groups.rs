//! Email distribution groups published by the backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recipient lists behind each distribution flag, plus per-team distros.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EmailGroups {
    pub team_email_distros: BTreeMap<String, Vec<String>>,
    pub app_leadership: Vec<String>,
    pub regression_team: Vec<String>,
    pub tech_leads: Vec<String>,
    pub scrum_masters: Vec<String>,
    pub all_app_teams: Vec<String>,
}
