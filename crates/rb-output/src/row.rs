//! Plain data row types written by output backends.
//!
//! Node paths and tick lists are flattened to space-separated strings so
//! every row fits a single CSV record.

use rb_agent::{Agent, NavEvent};
use rb_core::{NodeId, Tick};
use rb_report::{ReportEvent, Roadblock};

/// One agent's position and plan at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id:   u32,
    pub tick:       u64,
    pub x:          f64,
    pub y:          f64,
    /// Degrees, 0 = up, clockwise.
    pub heading:    f64,
    pub current:    u32,
    pub next:       u32,
    pub progress:   f64,
    pub state:      &'static str,
    pub navigation: &'static str,
    pub path:       String,
}

impl AgentSnapshotRow {
    pub fn new(tick: Tick, agent: &Agent) -> Self {
        let s = agent.snapshot();
        Self {
            agent_id:   s.id.0,
            tick:       tick.0,
            x:          s.position.x,
            y:          s.position.y,
            heading:    s.heading,
            current:    s.current.0,
            next:       s.next.0,
            progress:   s.progress,
            state:      s.state.label(),
            navigation: s.navigation.label(),
            path:       join_nodes(&s.path),
        }
    }
}

/// One agent's trip and the parameters its behaviour was drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentProfileRow {
    pub agent_id:               u32,
    pub start:                  u32,
    pub end:                    u32,
    pub speed:                  f64,
    pub penalty_secs:           f64,
    pub follow_navigation:      f64,
    pub report_if_roadblock:    f64,
    pub report_if_no_roadblock: f64,
}

impl AgentProfileRow {
    pub fn new(agent: &Agent) -> Self {
        let trip = agent.trip();
        let p = agent.probabilities();
        Self {
            agent_id:               agent.id().0,
            start:                  trip.start.0,
            end:                    trip.end.0,
            speed:                  agent.speed(),
            penalty_secs:           agent.penalty_secs(),
            follow_navigation:      p.follow_navigation,
            report_if_roadblock:    p.report_if_roadblock,
            report_if_no_roadblock: p.report_if_no_roadblock,
        }
    }
}

/// Completion counters for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:            u64,
    pub elapsed_secs:    f64,
    pub active:          u64,
    pub finished:        u64,
    pub failed:          u64,
    pub reports_applied: u64,
    pub reports_pending: u64,
}

/// One applied report from the audit stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRow {
    pub reporter:       u32,
    pub edge_a:         u32,
    pub edge_b:         u32,
    pub is_real:        bool,
    pub submitted_tick: u64,
    pub applied_tick:   u64,
    pub lag_secs:       f64,
    pub report_count:   u32,
}

impl From<&ReportEvent> for ReportRow {
    fn from(e: &ReportEvent) -> Self {
        Self {
            reporter:       e.reporter.0,
            edge_a:         e.edge.a().0,
            edge_b:         e.edge.b().0,
            is_real:        e.is_real,
            submitted_tick: e.submitted.0,
            applied_tick:   e.applied.0,
            lag_secs:       e.lag_secs,
            report_count:   e.report_count,
        }
    }
}

/// Final state of one registry entry, real or fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadblockRow {
    pub edge_a:         u32,
    pub edge_b:         u32,
    pub is_real:        bool,
    pub is_reported:    bool,
    pub report_count:   u32,
    pub times_reported: String,
}

impl RoadblockRow {
    pub fn new(block: &Roadblock, times: &[Tick]) -> Self {
        Self {
            edge_a:         block.edge.a().0,
            edge_b:         block.edge.b().0,
            is_real:        block.is_real,
            is_reported:    block.is_reported,
            report_count:   block.report_count,
            times_reported: times.iter().map(|t| t.0.to_string()).collect::<Vec<_>>().join(" "),
        }
    }
}

/// One navigation decision of one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEventRow {
    pub agent_id: u32,
    pub tick:     u64,
    pub reason:   &'static str,
    pub waypoint: u32,
    pub route:    String,
}

impl NavEventRow {
    pub fn new(agent_id: u32, event: &NavEvent) -> Self {
        Self {
            agent_id,
            tick:     event.tick.0,
            reason:   event.reason.label(),
            waypoint: event.waypoint.0,
            route:    join_nodes(&event.route),
        }
    }
}

fn join_nodes(nodes: &[NodeId]) -> String {
    nodes.iter().map(|n| n.0.to_string()).collect::<Vec<_>>().join(" ")
}
