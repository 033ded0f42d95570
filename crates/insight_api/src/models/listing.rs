//! Response envelopes of the option listing endpoints.

use serde::{Deserialize, Serialize};

use super::labels::deserialize_labels;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReleasesResponse {
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub releases: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TeamsResponse {
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub teams: Vec<String>,
}

/// Platform names are served by the report listing, one report per platform.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PlatformsResponse {
    #[serde(default, rename = "reports", deserialize_with = "deserialize_labels")]
    pub platforms: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PrioritiesResponse {
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub priorities: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeveritiesResponse {
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub severities: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportTypesResponse {
    #[serde(default)]
    pub report_types: Vec<ReportTypeInfo>,
}

/// A report flavour offered by the backend, with the blurb shown under the picker.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReportTypeInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platforms_are_read_from_reports_key() {
        let parsed: PlatformsResponse =
            serde_json::from_str(r#"{"reports": ["iOS", "Android"]}"#).unwrap();
        assert_eq!(parsed.platforms, vec!["iOS", "Android"]);
    }

    #[test]
    fn report_type_description_is_optional() {
        let parsed: ReportTypesResponse =
            serde_json::from_str(r#"{"report_types": [{"name": "Open Issues"}]}"#).unwrap();
        assert_eq!(parsed.report_types[0].name, "Open Issues");
        assert!(parsed.report_types[0].description.is_empty());
    }

    #[test]
    fn missing_envelope_key_yields_empty_list() {
        let parsed: TeamsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.teams.is_empty());
    }
}
