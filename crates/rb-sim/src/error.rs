use rb_agent::AgentError;
use rb_core::CoreError;
use rb_decision::DecisionError;
use rb_report::ReportError;
use rb_spatial::{CongestionError, SpatialError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Congestion(#[from] CongestionError),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl SimError {
    /// `true` for errors caused by bad inputs: malformed tables, occupancy
    /// underflow, exhausted decision streams, unknown nodes or edges.  The
    /// only other kind is a failure of the report runtime itself.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SimError::Report(ReportError::Runtime(_) | ReportError::TaskFailed(_)))
    }
}

pub type SimResult<T> = Result<T, SimError>;
