//! Report requests and the audit records they produce.

use rb_core::{AgentId, EdgeKey, Tick};

/// An agent's decision to report an edge as blocked.
///
/// Produced by the agent state machine and handed to the driver, which
/// either applies it at once (zero lag) or schedules it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportRequest {
    pub reporter: AgentId,
    pub edge: EdgeKey,
    /// `true` if the reporter actually hit a roadblock; `false` for a false
    /// report of a clear road.
    pub claimed_real: bool,
    /// Delay before the report reaches the registry, seconds.
    pub lag_secs: f64,
    pub submitted: Tick,
}

/// One report as applied to the registry.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportEvent {
    pub reporter: AgentId,
    pub edge: EdgeKey,
    /// Ground truth at the time of application.
    pub is_real: bool,
    pub submitted: Tick,
    pub applied: Tick,
    pub lag_secs: f64,
    /// The edge's report count after this report.
    pub report_count: u32,
}
