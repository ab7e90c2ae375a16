//! Report-subsystem error type.

use thiserror::Error;

use rb_core::EdgeKey;

/// Errors produced by `rb-report`.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("roadblock on unknown edge {0}")]
    UnknownEdge(EdgeKey),

    #[error("failed to start report runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("report task failed: {0}")]
    TaskFailed(String),
}

pub type ReportResult<T> = Result<T, ReportError>;
