//! The per-agent navigation state machine.
//!
//! # One tick
//!
//! ```text
//! penalized?          → nothing
//! Initial             → navigation decision, failure check, first hop
//! arrived (t >= 1)    → pop hop, leave edge, roadblock return, navigation
//!                       decision, failure check, next hop or finish
//! move                → t += speed / edge_length, interpolate, accumulate
//!                       distance travelled on this hop
//! detection           → once far enough along: hit a real roadblock and
//!                       turn back, or consider a false report of a clear
//!                       road (at most once per hop)
//! ```
//!
//! Reports are returned to the caller, never applied here.

use rb_core::{AgentId, EdgeKey, NodeId, Point2, SimClock, Tick};
use rb_decision::{AgentProbabilities, AgentProfile, DecisionResult, DecisionStream};
use rb_report::{ReportRequest, RoadblockRegistry};
use rb_spatial::{CongestionModel, RoadGraph, RouteQuery, Router};
use tracing::{debug, info};

use crate::{
    AgentError, AgentParams, AgentResult, AgentSnapshot, AgentState, FailureCause, KnowledgeView, NavEvent,
    NavReason, Navigation, Trip,
};

/// Shared read-only inputs to [`Agent::step`].
#[derive(Copy, Clone)]
pub struct StepContext<'a> {
    pub clock: &'a SimClock,
    pub graph: &'a RoadGraph,
    pub router: &'a dyn Router,
    pub registry: &'a RoadblockRegistry,
}

impl StepContext<'_> {
    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }
}

/// Where the agent turned back, and on which edge.
#[derive(Copy, Clone, Debug)]
struct Detour {
    edge: EdgeKey,
    from: Point2,
}

/// One simulated traveller.
pub struct Agent {
    id: AgentId,
    trip: Trip,
    speed: f64,
    penalty_secs: f64,
    /// What the decision sequences were sampled from; kept for output.
    probabilities: AgentProbabilities,
    params: AgentParams,
    stream: DecisionStream,

    state: AgentState,
    navigation: Navigation,
    current: NodeId,
    next: NodeId,
    t: f64,
    pos: Point2,
    heading: f64,
    knowledge: KnowledgeView,

    /// Edge this agent is counted on in the occupancy table.
    edge: Option<EdgeKey>,
    traveled: f64,
    checked: bool,
    detour: Option<Detour>,
    timeout_until: Option<Tick>,
    history: Vec<NavEvent>,
}

impl Agent {
    /// Place a new agent at its start node with its navigator's initial route.
    pub fn new(
        id: AgentId,
        trip: Trip,
        profile: AgentProfile,
        params: AgentParams,
        graph: &RoadGraph,
        router: &dyn Router,
        congestion: &CongestionModel,
    ) -> AgentResult<Self> {
        let mut agent = Self {
            id,
            trip,
            speed: profile.speed,
            penalty_secs: profile.penalty_secs,
            probabilities: profile.probabilities,
            params,
            stream: profile.stream,
            state: AgentState::Initial,
            navigation: Navigation::Following,
            current: trip.start,
            next: trip.start,
            t: 0.0,
            pos: Point2::default(),
            heading: 0.0,
            knowledge: KnowledgeView::default(),
            edge: None,
            traveled: 0.0,
            checked: false,
            detour: None,
            timeout_until: None,
            history: Vec::new(),
        };
        agent.restart(graph, router, congestion)?;
        Ok(agent)
    }

    /// Return to the start node with rewound decision streams and no
    /// knowledge.  Occupancy is not touched; the caller clears it.
    pub fn reset(&mut self, graph: &RoadGraph, router: &dyn Router, congestion: &CongestionModel) -> AgentResult<()> {
        self.stream.reset();
        self.restart(graph, router, congestion)
    }

    fn restart(&mut self, graph: &RoadGraph, router: &dyn Router, congestion: &CongestionModel) -> AgentResult<()> {
        self.node_pos(graph, self.trip.end)?;
        self.pos = self.node_pos(graph, self.trip.start)?;
        self.state = AgentState::Initial;
        self.navigation = Navigation::Following;
        self.current = self.trip.start;
        self.next = self.trip.start;
        self.t = 0.0;
        self.heading = 0.0;
        self.edge = None;
        self.traveled = 0.0;
        self.checked = false;
        self.detour = None;
        self.timeout_until = None;
        self.history.clear();

        let route = router.route(graph, congestion, &RouteQuery::new(self.trip.start, self.trip.end));
        self.knowledge = KnowledgeView::new(route.nodes);
        self.record(Tick::ZERO, NavReason::Initial, self.knowledge.path_vec());
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> AgentId { self.id }
    pub fn trip(&self) -> Trip { self.trip }
    pub fn state(&self) -> AgentState { self.state }
    pub fn navigation(&self) -> Navigation { self.navigation }
    pub fn position(&self) -> Point2 { self.pos }
    pub fn heading(&self) -> f64 { self.heading }
    pub fn current(&self) -> NodeId { self.current }
    pub fn next(&self) -> NodeId { self.next }
    pub fn progress(&self) -> f64 { self.t }
    pub fn speed(&self) -> f64 { self.speed }
    pub fn penalty_secs(&self) -> f64 { self.penalty_secs }
    pub fn probabilities(&self) -> AgentProbabilities { self.probabilities }
    /// Map units covered on the current hop.
    pub fn traveled(&self) -> f64 { self.traveled }
    pub fn knowledge(&self) -> &KnowledgeView { &self.knowledge }
    pub fn history(&self) -> &[NavEvent] { &self.history }
    pub fn stream(&self) -> &DecisionStream { &self.stream }
    pub fn occupied_edge(&self) -> Option<EdgeKey> { self.edge }
    pub fn timeout_until(&self) -> Option<Tick> { self.timeout_until }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// `true` if the remaining path crosses `edge`.
    pub fn is_affected_by(&self, edge: EdgeKey) -> bool {
        self.knowledge.path_uses(edge)
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.pos,
            heading: self.heading,
            current: self.current,
            next: self.next,
            progress: self.t,
            state: self.state,
            navigation: self.navigation,
            path: self.knowledge.path_vec(),
        }
    }

    // ── Step ──────────────────────────────────────────────────────────────

    /// Advance one tick.  Returns the reports this agent decided to make.
    pub fn step(&mut self, ctx: &StepContext<'_>, congestion: &mut CongestionModel) -> AgentResult<Vec<ReportRequest>> {
        let mut reports = Vec::new();
        if self.state.is_terminal() || self.penalized(ctx.now()) {
            return Ok(reports);
        }

        if self.state == AgentState::Initial {
            self.decide_navigation(ctx, congestion)?;
            if self.check_failure(ctx.now(), congestion)? {
                return Ok(reports);
            }
            if self.commit_hop(ctx, congestion)? {
                return Ok(reports);
            }
        } else if self.t >= 1.0 {
            if !self.state.is_returning() {
                self.knowledge.path.pop_front();
            }
            if self.knowledge.path.len() > 1 {
                congestion.move_agent(self.edge.take(), None)?;
                self.current = self.next;
                if let AgentState::AtRoadblock { reported } = self.state {
                    self.return_from_roadblock(reported, ctx, congestion);
                }
                self.decide_navigation(ctx, congestion)?;
                if self.check_failure(ctx.now(), congestion)? {
                    return Ok(reports);
                }
            }
            if self.commit_hop(ctx, congestion)? {
                return Ok(reports);
            }
        }

        self.advance(ctx, congestion, &mut reports)?;
        Ok(reports)
    }

    /// Clear a lapsed penalty; `true` while still frozen.
    fn penalized(&mut self, now: Tick) -> bool {
        match self.timeout_until {
            Some(until) if now < until => true,
            Some(_) => {
                info!(agent = %self.id, tick = %now, "report penalty ended");
                self.timeout_until = None;
                false
            }
            None => false,
        }
    }

    fn advance(
        &mut self,
        ctx: &StepContext<'_>,
        congestion: &CongestionModel,
        reports: &mut Vec<ReportRequest>,
    ) -> AgentResult<()> {
        let origin = match self.detour {
            Some(d) if self.state.is_returning() => d.from,
            _ => self.node_pos(ctx.graph, self.current)?,
        };
        let dest = self.node_pos(ctx.graph, self.next)?;
        let dist = origin.distance(dest);
        let speed = self.speed * self.edge.map_or(1.0, |e| congestion.speed_multiplier(e));

        let dt = if dist > 0.0 { (speed / dist.max(1e-6)).min(1.0) } else { 1.0 };
        let before = self.t;
        self.t = (self.t + dt).min(1.0);
        self.pos = origin.lerp(dest, self.t);
        // Map units actually covered, not parametric progress.
        self.traveled += (self.t - before) * dist;
        if dist > 0.0 {
            self.heading = origin.heading_to(dest);
        }

        if self.traveled >= self.params.detection_threshold && !self.state.is_returning() {
            let edge = EdgeKey::new(self.current, self.next);
            if ctx.registry.is_real_roadblock(edge) {
                self.hit_roadblock(edge, origin, ctx, reports)?;
            } else if !self.checked {
                self.inspect_clear(edge, ctx, reports)?;
            }
        }
        Ok(())
    }

    // ── Detection & reporting ─────────────────────────────────────────────

    fn hit_roadblock(
        &mut self,
        edge: EdgeKey,
        origin: Point2,
        ctx: &StepContext<'_>,
        reports: &mut Vec<ReportRequest>,
    ) -> AgentResult<()> {
        info!(agent = %self.id, edge = %edge, "roadblock found, turning back");
        self.knowledge.known.insert(edge);

        let report = self.decide(|s| s.next_report_if_obstruction())?;
        if report {
            self.request_report(edge, true, ctx, reports)?;
        }

        self.detour = Some(Detour { edge, from: self.pos });
        self.heading = self.pos.heading_to(origin);
        self.next = self.current;
        self.t = 0.0;
        self.checked = true;
        self.state = AgentState::AtRoadblock { reported: report };
        Ok(())
    }

    fn inspect_clear(
        &mut self,
        edge: EdgeKey,
        ctx: &StepContext<'_>,
        reports: &mut Vec<ReportRequest>,
    ) -> AgentResult<()> {
        if self.decide(|s| s.next_report_if_clear())? {
            self.request_report(edge, false, ctx, reports)?;
            self.knowledge.false_reports.insert(edge);
        }
        self.checked = true;
        Ok(())
    }

    fn request_report(
        &mut self,
        edge: EdgeKey,
        claimed_real: bool,
        ctx: &StepContext<'_>,
        reports: &mut Vec<ReportRequest>,
    ) -> AgentResult<()> {
        let lag_secs = if self.params.time_lag_enabled {
            self.decide(|s| s.next_time_lag())?
        } else {
            0.0
        };
        info!(agent = %self.id, edge = %edge, real = claimed_real, lag_secs, "report submitted");
        reports.push(ReportRequest {
            reporter: self.id,
            edge,
            claimed_real,
            lag_secs,
            submitted: ctx.now(),
        });
        self.start_penalty(ctx.clock);
        Ok(())
    }

    fn start_penalty(&mut self, clock: &SimClock) {
        if !self.params.penalty_enabled {
            return;
        }
        let ticks = clock.ticks_for_secs(self.penalty_secs);
        if ticks > 0 {
            let until = clock.current_tick + ticks;
            info!(agent = %self.id, until = %until, "report penalty started");
            self.timeout_until = Some(until);
        }
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Consume one follow-navigation decision and re-plan accordingly.
    fn decide_navigation(&mut self, ctx: &StepContext<'_>, congestion: &CongestionModel) -> AgentResult<()> {
        let returning = self.state.is_returning();
        if self.state != AgentState::Initial && !returning {
            self.record(ctx.now(), NavReason::WaypointReached, self.knowledge.path_vec());
        }
        if self.state == (AgentState::AtRoadblock { reported: false }) {
            debug!(agent = %self.id, "detouring around unreported roadblock, navigator not consulted");
            return Ok(());
        }

        if self.decide(|s| s.next_follow_navigation())? {
            self.navigation = Navigation::Following;
            if !returning {
                let query = RouteQuery::new(self.current, self.trip.end)
                    .avoiding_public(ctx.registry.public_edges());
                let route = ctx.router.route(ctx.graph, congestion, &query);
                debug!(agent = %self.id, hops = route.hops(), cost = route.cost, "following navigator");
                self.knowledge.set_path(route.nodes);
            }
        } else {
            self.navigation = Navigation::Deviating;
            let mut query = RouteQuery::new(self.current, self.trip.end).excluding_known(&self.knowledge.known);
            if let Some(n) = self.knowledge.next_waypoint() {
                query = query.excluding_edge(EdgeKey::new(self.current, n));
            }
            let route = ctx.router.route(ctx.graph, congestion, &query);
            info!(agent = %self.id, at = %self.current, "deviating from navigator");
            self.knowledge.set_path(route.nodes);
            self.record(ctx.now(), NavReason::Deviated, self.knowledge.path_vec());
        }
        Ok(())
    }

    /// Re-plan after turning back at a roadblock.
    fn return_from_roadblock(&mut self, reported: bool, ctx: &StepContext<'_>, congestion: &CongestionModel) {
        let route = if reported {
            let mut query = RouteQuery::new(self.current, self.trip.end)
                .avoiding_public(ctx.registry.public_edges());
            if let Some(d) = self.detour {
                // The report may still be in flight; avoid the edge regardless.
                query = query.excluding_edge(d.edge);
            }
            self.navigation = Navigation::Following;
            ctx.router.route(ctx.graph, congestion, &query)
        } else {
            let query = RouteQuery::new(self.current, self.trip.end).excluding_known(&self.knowledge.known);
            self.navigation = Navigation::Deviating;
            ctx.router.route(ctx.graph, congestion, &query)
        };
        info!(agent = %self.id, at = %self.current, reported, hops = route.hops(), "detour planned");
        self.knowledge.set_path(route.nodes);
        let reason = if reported { NavReason::DetourReported } else { NavReason::DetourUnreported };
        self.record(ctx.now(), reason, self.knowledge.path_vec());
    }

    /// Fail if the current plan is a routing miss.
    fn check_failure(&mut self, now: Tick, congestion: &mut CongestionModel) -> AgentResult<bool> {
        if self.knowledge.path.len() > 1 || self.current == self.trip.end {
            return Ok(false);
        }
        let cause = match self.navigation {
            Navigation::Following => FailureCause::NavigatorNoRoute,
            Navigation::Deviating => FailureCause::DeviationNoRoute,
        };
        congestion.move_agent(self.edge.take(), None)?;
        self.state = AgentState::Failed(cause);
        info!(agent = %self.id, at = %self.current, ?cause, "agent failed");
        self.record(now, NavReason::Failed, Vec::new());
        Ok(true)
    }

    /// Enter the next hop, or finish if the path is exhausted.  Returns
    /// `true` on finish.
    fn commit_hop(&mut self, ctx: &StepContext<'_>, congestion: &mut CongestionModel) -> AgentResult<bool> {
        let Some(next) = self.knowledge.next_waypoint() else {
            congestion.move_agent(self.edge.take(), None)?;
            self.current = self.trip.end;
            self.next = self.trip.end;
            self.pos = self.node_pos(ctx.graph, self.trip.end)?;
            self.state = AgentState::Finished;
            info!(agent = %self.id, tick = %ctx.now(), "agent finished");
            self.record(ctx.now(), NavReason::Finished, self.knowledge.path_vec());
            return Ok(true);
        };

        let edge = EdgeKey::new(self.current, next);
        congestion.move_agent(self.edge.take(), Some(edge))?;
        self.edge = Some(edge);
        self.next = next;
        self.pos = self.node_pos(ctx.graph, self.current)?;
        self.t = 0.0;
        self.traveled = 0.0;
        self.checked = false;
        self.detour = None;
        self.state = AgentState::Traveling;
        debug!(agent = %self.id, edge = %edge, "entering edge");
        Ok(false)
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn decide<T>(&mut self, draw: impl FnOnce(&mut DecisionStream) -> DecisionResult<T>) -> AgentResult<T> {
        let agent = self.id;
        draw(&mut self.stream).map_err(|source| AgentError::Decision { agent, source })
    }

    fn node_pos(&self, graph: &RoadGraph, node: NodeId) -> AgentResult<Point2> {
        graph.node_pos(node).ok_or(AgentError::UnknownNode { agent: self.id, node })
    }

    fn record(&mut self, tick: Tick, reason: NavReason, route: Vec<NodeId>) {
        self.history.push(NavEvent { tick, reason, waypoint: self.current, route });
    }
}
