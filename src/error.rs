//! Error model for dashboard operations that touch the backend or disk.

use insight_api::ApiError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("a report is already being generated")]
    Busy,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
