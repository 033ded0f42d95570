//! Typed client for the Insight Hub report backend used by the dashboard crate.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{BinaryContent, ReportApiClient};
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use models::{
    EmailGroups, PlatformsResponse, PrioritiesResponse, ReleasesResponse, ReportRequest,
    ReportResponse, ReportTypeInfo, ReportTypesResponse, SeveritiesResponse, TeamsResponse,
};
