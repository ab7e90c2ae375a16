//! Navigation history: one entry each time an agent's route changes or
//! its trip ends.

use std::fmt;

use rb_core::{NodeId, Tick};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavReason {
    Initial,
    WaypointReached,
    DetourReported,
    DetourUnreported,
    Deviated,
    Finished,
    Failed,
}

impl NavReason {
    pub fn label(self) -> &'static str {
        match self {
            NavReason::Initial          => "initial",
            NavReason::WaypointReached  => "waypoint_reached",
            NavReason::DetourReported   => "detour_reported",
            NavReason::DetourUnreported => "detour_unreported",
            NavReason::Deviated         => "deviated",
            NavReason::Finished         => "finished",
            NavReason::Failed           => "failed",
        }
    }
}

impl fmt::Display for NavReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One navigation-history entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavEvent {
    pub tick: Tick,
    pub reason: NavReason,
    /// Node the agent was at.
    pub waypoint: NodeId,
    /// Route at that moment (empty for `Failed`).
    pub route: Vec<NodeId>,
}
