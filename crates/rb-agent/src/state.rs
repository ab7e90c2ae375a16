//! Agent lifecycle and navigation states, plus the read-only snapshot
//! handed to observers.

use std::fmt;

use rb_core::{AgentId, NodeId, Point2};

/// Why an agent gave up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureCause {
    /// Following the navigator, and the navigator found no route.
    NavigatorNoRoute,
    /// Deviating, and the agent's own route search found nothing.
    DeviationNoRoute,
}

/// Lifecycle state.  `Finished` and `Failed` are absorbing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    /// Not yet stepped.
    Initial,
    /// Moving along an edge toward `next`.
    Traveling,
    /// Turned back at a roadblock; returning to the hop's origin node.
    AtRoadblock { reported: bool },
    Finished,
    Failed(FailureCause),
}

impl AgentState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, AgentState::Finished | AgentState::Failed(_))
    }

    #[inline]
    pub fn is_returning(self) -> bool {
        matches!(self, AgentState::AtRoadblock { .. })
    }

    /// Short label for CSV output.
    pub fn label(self) -> &'static str {
        match self {
            AgentState::Initial                              => "initial",
            AgentState::Traveling                            => "traveling",
            AgentState::AtRoadblock { .. }                   => "at_roadblock",
            AgentState::Finished                             => "finished",
            AgentState::Failed(FailureCause::NavigatorNoRoute) => "failed_navigator",
            AgentState::Failed(FailureCause::DeviationNoRoute) => "failed_deviation",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the agent currently trusts the navigator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Navigation {
    #[default]
    Following,
    Deviating,
}

impl Navigation {
    pub fn label(self) -> &'static str {
        match self {
            Navigation::Following => "following",
            Navigation::Deviating => "deviating",
        }
    }
}

/// Observable state of one agent at the end of a tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Point2,
    /// Degrees, 0 = up, clockwise.
    pub heading: f64,
    pub current: NodeId,
    pub next: NodeId,
    /// Progress along the current hop, `[0, 1]`.
    pub progress: f64,
    pub state: AgentState,
    pub navigation: Navigation,
    /// Remaining intended path, starting with `current`.
    pub path: Vec<NodeId>,
}
