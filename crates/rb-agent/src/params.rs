//! Per-run agent parameters and trip definitions.

use rb_core::NodeId;

/// Behaviour switches shared by every agent of a run.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentParams {
    /// Distance an agent must cover on an edge before it can tell whether
    /// the edge is blocked.  Default: 15.0.
    pub detection_threshold: f64,
    /// Draw a time-lag for every report.  When off, reports land at once.
    pub time_lag_enabled: bool,
    /// Freeze agents for their penalty after each report.
    pub penalty_enabled: bool,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            detection_threshold: 15.0,
            time_lag_enabled:    false,
            penalty_enabled:     false,
        }
    }
}

/// Where an agent starts and where it is going.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    pub start: NodeId,
    pub end: NodeId,
}

impl Trip {
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self { start, end }
    }
}

impl From<(NodeId, NodeId)> for Trip {
    fn from((start, end): (NodeId, NodeId)) -> Self {
        Self { start, end }
    }
}
