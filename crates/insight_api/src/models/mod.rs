mod email_groups;
mod labels;
mod listing;
mod report;

pub use email_groups::EmailGroups;
pub use listing::{
    PlatformsResponse, PrioritiesResponse, ReleasesResponse, ReportTypeInfo, ReportTypesResponse,
    SeveritiesResponse, TeamsResponse,
};
pub use report::{ReportRequest, ReportResponse};
