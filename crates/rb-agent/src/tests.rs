//! Unit tests for rb-agent.
//!
//! Agents are driven by hand through a tiny `World` so each test controls
//! exactly when reports reach the registry.

#[cfg(test)]
mod helpers {
    use rb_core::{AgentId, EdgeKey, NodeId, Point2, SimClock};
    use rb_decision::{AgentProfile, DecisionStream};
    use rb_report::{ReportRequest, RoadblockRegistry};
    use rb_spatial::{CongestionModel, DijkstraRouter, RoadGraph, RoadGraphBuilder};

    use crate::{Agent, AgentParams, StepContext, Trip};

    /// Straight line 0 ── 1 ── 2, 100 units per hop.
    pub fn line() -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        let n0 = b.add_node(Point2::new(0.0, 0.0));
        let n1 = b.add_node(Point2::new(100.0, 0.0));
        let n2 = b.add_node(Point2::new(200.0, 0.0));
        b.add_road(n0, n1).unwrap();
        b.add_road(n1, n2).unwrap();
        b.build()
    }

    /// Quadrilateral with a unique shortest path 0→2 via 1 (150) and a
    /// detour via 3 (about 160.5).
    ///
    /// ```text
    ///   3 ─────── 2
    ///   │         │
    ///   0 ─────── 1
    /// ```
    pub fn quad() -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        let n0 = b.add_node(Point2::new(0.0, 0.0));
        let n1 = b.add_node(Point2::new(100.0, 0.0));
        let n2 = b.add_node(Point2::new(100.0, 50.0));
        let n3 = b.add_node(Point2::new(0.0, 60.0));
        b.add_road(n0, n1).unwrap();
        b.add_road(n1, n2).unwrap();
        b.add_road(n0, n3).unwrap();
        b.add_road(n3, n2).unwrap();
        b.build()
    }

    /// Line 0 ── 1 plus unreachable node 2.
    pub fn island() -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        let n0 = b.add_node(Point2::new(0.0, 0.0));
        let n1 = b.add_node(Point2::new(100.0, 0.0));
        b.add_node(Point2::new(500.0, 500.0));
        b.add_road(n0, n1).unwrap();
        b.build()
    }

    pub fn edge(a: u32, b: u32) -> EdgeKey {
        EdgeKey::new(NodeId(a), NodeId(b))
    }

    pub struct World {
        pub graph: RoadGraph,
        pub congestion: CongestionModel,
        pub registry: RoadblockRegistry,
        pub clock: SimClock,
    }

    impl World {
        pub fn new(graph: RoadGraph, real: &[EdgeKey]) -> Self {
            Self {
                graph,
                congestion: CongestionModel::free_flow(),
                registry: RoadblockRegistry::new(real.iter().copied()),
                clock: SimClock::new(100),
            }
        }

        pub fn agent(&self, id: u32, start: u32, end: u32, profile: AgentProfile, params: AgentParams) -> Agent {
            Agent::new(
                AgentId(id),
                Trip::new(NodeId(start), NodeId(end)),
                profile,
                params,
                &self.graph,
                &DijkstraRouter,
                &self.congestion,
            )
            .unwrap()
        }

        /// Advance the clock, then step `agent`.
        pub fn tick(&mut self, agent: &mut Agent) -> Vec<ReportRequest> {
            self.clock.advance();
            self.step(agent)
        }

        /// Step `agent` at the current tick.
        pub fn step(&mut self, agent: &mut Agent) -> Vec<ReportRequest> {
            let ctx = StepContext {
                clock: &self.clock,
                graph: &self.graph,
                router: &DijkstraRouter,
                registry: &self.registry,
            };
            agent.step(&ctx, &mut self.congestion).unwrap()
        }

        /// Tick until `agent` terminates (or `limit` ticks pass), applying
        /// every report immediately.
        pub fn run(&mut self, agent: &mut Agent, limit: usize) {
            for _ in 0..limit {
                if agent.is_terminal() {
                    return;
                }
                for r in self.tick(agent) {
                    self.registry.apply_report(&r, self.clock.current_tick);
                }
            }
        }
    }

    pub fn near(p: Point2, x: f64, y: f64) -> bool {
        (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9
    }

    /// Speed 10, every decision constant.
    pub fn profile(follow: bool, report_block: bool, report_clear: bool, lag: f64) -> AgentProfile {
        AgentProfile::fixed(10.0, DecisionStream::constant(32, follow, report_block, report_clear, lag))
    }
}

// ── Travel & termination ──────────────────────────────────────────────────────

#[cfg(test)]
mod travel {
    use rb_core::{NodeId, Point2};

    use super::helpers::{World, edge, island, line, near, profile};
    use crate::{AgentParams, AgentState, FailureCause, NavReason, Navigation};

    #[test]
    fn reaches_destination_on_clear_line() {
        let mut w = World::new(line(), &[]);
        let mut a = w.agent(0, 0, 2, profile(true, false, false, 0.0), AgentParams::default());
        assert_eq!(a.state(), AgentState::Initial);
        assert_eq!(a.knowledge().path_vec(), vec![NodeId(0), NodeId(1), NodeId(2)]);

        w.tick(&mut a);
        assert_eq!(a.state(), AgentState::Traveling);
        assert!(near(a.position(), 10.0, 0.0));
        assert_eq!(w.congestion.occupancy(edge(0, 1)), 1);
        assert!((a.heading() - 90.0).abs() < 1e-9);

        w.run(&mut a, 100);
        assert_eq!(a.state(), AgentState::Finished);
        assert_eq!(a.current(), NodeId(2));
        assert_eq!(a.position(), Point2::new(200.0, 0.0));
        assert_eq!(w.congestion.total_occupancy(), 0);

        let reasons: Vec<NavReason> = a.history().iter().map(|e| e.reason).collect();
        assert_eq!(reasons, vec![NavReason::Initial, NavReason::WaypointReached, NavReason::Finished]);
    }

    #[test]
    fn start_equals_end_finishes_on_first_step() {
        let mut w = World::new(line(), &[]);
        let mut a = w.agent(0, 1, 1, profile(true, false, false, 0.0), AgentParams::default());
        w.tick(&mut a);
        assert_eq!(a.state(), AgentState::Finished);
        assert_eq!(w.congestion.total_occupancy(), 0);
    }

    #[test]
    fn navigator_miss_fails_following_agent() {
        let mut w = World::new(island(), &[]);
        let mut a = w.agent(0, 0, 2, profile(true, false, false, 0.0), AgentParams::default());
        w.tick(&mut a);
        assert_eq!(a.state(), AgentState::Failed(FailureCause::NavigatorNoRoute));
        assert_eq!(a.history().last().unwrap().reason, NavReason::Failed);
        assert!(a.history().last().unwrap().route.is_empty());

        // Terminal states are absorbing.
        let before = a.snapshot();
        w.tick(&mut a);
        assert_eq!(a.snapshot(), before);
    }

    #[test]
    fn deviation_miss_fails_deviating_agent() {
        let mut w = World::new(island(), &[]);
        let mut a = w.agent(0, 0, 2, profile(false, false, false, 0.0), AgentParams::default());
        w.tick(&mut a);
        assert_eq!(a.navigation(), Navigation::Deviating);
        assert_eq!(a.state(), AgentState::Failed(FailureCause::DeviationNoRoute));
    }

    #[test]
    fn congestion_halves_progress() {
        let mut w = World::new(line(), &[]);
        w.congestion.set_static_factor(&w.graph, edge(0, 1), 0.5).unwrap();
        let mut a = w.agent(0, 0, 2, profile(true, false, false, 0.0), AgentParams::default());
        w.tick(&mut a);
        assert!((a.progress() - 0.05).abs() < 1e-12);
        assert!(near(a.position(), 5.0, 0.0));
    }

    #[test]
    fn affected_by_remaining_path_only() {
        let mut w = World::new(line(), &[]);
        let mut a = w.agent(0, 0, 2, profile(true, false, false, 0.0), AgentParams::default());
        assert!(a.is_affected_by(edge(1, 0)));
        assert!(a.is_affected_by(edge(1, 2)));
        // Finish the first hop and step onto the second.
        for _ in 0..20 {
            if a.current() == NodeId(1) {
                break;
            }
            w.tick(&mut a);
        }
        assert_eq!(a.current(), NodeId(1));
        assert!(!a.is_affected_by(edge(0, 1)));
        assert!(a.is_affected_by(edge(1, 2)));
    }
}

// ── Roadblocks & reports ──────────────────────────────────────────────────────

#[cfg(test)]
mod roadblocks {
    use rb_core::NodeId;
    use rb_decision::{AgentProfile, DecisionStream};

    use super::helpers::{World, edge, line, near, profile, quad};
    use crate::{AgentParams, AgentState, NavReason, Navigation};

    #[test]
    fn reported_roadblock_turns_back_and_reroutes() {
        let mut w = World::new(quad(), &[edge(0, 1)]);
        let mut a = w.agent(0, 0, 2, profile(true, true, false, 0.0), AgentParams::default());

        assert!(w.tick(&mut a).is_empty());
        let reports = w.tick(&mut a);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].claimed_real);
        assert_eq!(reports[0].edge, edge(0, 1));
        assert_eq!(reports[0].lag_secs, 0.0);
        assert_eq!(a.state(), AgentState::AtRoadblock { reported: true });
        assert!(a.knowledge().knows_blocked(edge(0, 1)));
        assert!(near(a.position(), 20.0, 0.0));
        assert_eq!(a.next(), NodeId(0));
        w.registry.apply_report(&reports[0], w.clock.current_tick);

        // Back to node 0 in two ticks, then the detour starts.
        w.tick(&mut a);
        w.tick(&mut a);
        assert!(near(a.position(), 0.0, 0.0));
        w.tick(&mut a);
        assert_eq!(a.state(), AgentState::Traveling);
        assert_eq!(a.knowledge().path_vec(), vec![NodeId(0), NodeId(3), NodeId(2)]);
        assert_eq!(w.congestion.occupancy(edge(0, 1)), 0);
        assert_eq!(w.congestion.occupancy(edge(0, 3)), 1);
        assert!(a.history().iter().any(|e| e.reason == NavReason::DetourReported));

        w.run(&mut a, 200);
        assert_eq!(a.state(), AgentState::Finished);
        assert_eq!(w.congestion.total_occupancy(), 0);
    }

    #[test]
    fn reported_edge_steers_other_agents() {
        let mut w = World::new(quad(), &[edge(0, 1)]);
        let mut a = w.agent(0, 0, 2, profile(true, true, false, 0.0), AgentParams::default());
        w.tick(&mut a);
        for r in w.tick(&mut a) {
            w.registry.apply_report(&r, w.clock.current_tick);
        }
        assert!(w.registry.is_reported(edge(0, 1)));
        assert_eq!(w.registry.report_count(edge(0, 1)), 1);

        let mut b = w.agent(1, 0, 2, profile(true, false, false, 0.0), AgentParams::default());
        w.step(&mut b);
        assert_eq!(b.knowledge().path_vec(), vec![NodeId(0), NodeId(3), NodeId(2)]);
        assert!(!b.is_affected_by(edge(0, 1)));
    }

    #[test]
    fn unreported_roadblock_deviates_privately() {
        let mut w = World::new(quad(), &[edge(0, 1)]);
        let mut a = w.agent(0, 0, 2, profile(true, false, false, 0.0), AgentParams::default());
        w.tick(&mut a);
        assert!(w.tick(&mut a).is_empty());
        assert_eq!(a.state(), AgentState::AtRoadblock { reported: false });
        for _ in 0..3 {
            w.tick(&mut a);
        }
        assert_eq!(a.navigation(), Navigation::Deviating);
        assert_eq!(a.knowledge().path_vec(), vec![NodeId(0), NodeId(3), NodeId(2)]);
        // Navigator not consulted on return: only the initial draw was used.
        assert_eq!(a.stream().follow_navigation().position(), 1);
        assert!(a.history().iter().any(|e| e.reason == NavReason::DetourUnreported));
        assert!(!w.registry.is_reported(edge(0, 1)));
    }

    #[test]
    fn false_report_once_per_hop() {
        let mut w = World::new(line(), &[]);
        let mut a = w.agent(0, 0, 2, profile(true, false, true, 0.0), AgentParams::default());
        assert!(w.tick(&mut a).is_empty());
        let reports = w.tick(&mut a);
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].claimed_real);
        assert!(a.knowledge().reported_falsely(edge(0, 1)));
        assert_eq!(a.state(), AgentState::Traveling);
        for _ in 0..5 {
            assert!(w.tick(&mut a).is_empty());
        }
        assert_eq!(a.stream().report_if_clear().position(), 1);
    }

    #[test]
    fn detection_distance_is_measured_in_map_units() {
        let mut w = World::new(line(), &[]);
        let mut a = w.agent(0, 0, 2, profile(true, false, true, 0.0), AgentParams::default());

        assert!(w.tick(&mut a).is_empty());
        assert!((a.traveled() - 10.0).abs() < 1e-9);
        assert!(near(a.position(), 10.0, 0.0));

        let reports = w.tick(&mut a);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].edge, edge(0, 1));
        assert!((a.traveled() - 20.0).abs() < 1e-9);
        assert!(near(a.position(), 20.0, 0.0));
    }

    #[test]
    fn agent_slower_than_threshold_still_detects() {
        let mut w = World::new(line(), &[edge(0, 1)]);
        let slow = AgentProfile::fixed(4.0, DecisionStream::constant(32, true, true, false, 0.0));
        let mut a = w.agent(0, 0, 2, slow, AgentParams::default());
        assert!(AgentParams::default().detection_threshold > 4.0);

        for _ in 0..3 {
            assert!(w.tick(&mut a).is_empty());
            assert_eq!(a.state(), AgentState::Traveling);
        }
        let reports = w.tick(&mut a);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].claimed_real);
        assert_eq!(a.state(), AgentState::AtRoadblock { reported: true });
        assert!(a.knowledge().knows_blocked(edge(0, 1)));
        assert!(near(a.position(), 16.0, 0.0));
    }

    #[test]
    fn short_hops_are_never_inspected() {
        let mut w = World::new(line(), &[edge(0, 1)]);
        let params = AgentParams { detection_threshold: 1_000.0, ..AgentParams::default() };
        let mut a = w.agent(0, 0, 2, profile(true, true, true, 0.0), params);
        w.run(&mut a, 100);
        assert_eq!(a.state(), AgentState::Finished);
        assert_eq!(a.stream().report_if_obstruction().position(), 0);
        assert_eq!(a.stream().report_if_clear().position(), 0);
    }

    #[test]
    fn time_lag_drawn_only_when_enabled() {
        let mut w = World::new(line(), &[edge(0, 1)]);
        let params = AgentParams { time_lag_enabled: true, ..AgentParams::default() };
        let mut a = w.agent(0, 0, 2, profile(true, true, false, 2.5), params);
        w.tick(&mut a);
        let reports = w.tick(&mut a);
        assert_eq!(reports[0].lag_secs, 2.5);
        assert_eq!(a.stream().time_lag().position(), 1);

        let mut w = World::new(line(), &[edge(0, 1)]);
        let mut b = w.agent(1, 0, 2, profile(true, true, false, 2.5), AgentParams::default());
        w.tick(&mut b);
        let reports = w.tick(&mut b);
        assert_eq!(reports[0].lag_secs, 0.0);
        assert_eq!(b.stream().time_lag().position(), 0);
    }
}

// ── Navigation, penalties, reset ──────────────────────────────────────────────

#[cfg(test)]
mod decisions {
    use rb_core::{NodeId, Point2, Tick};
    use rb_decision::{AgentProfile, DecisionStream};
    use rb_spatial::DijkstraRouter;

    use super::helpers::{World, edge, line, near, profile, quad};
    use crate::{AgentError, AgentParams, AgentState, NavReason, Navigation, StepContext};

    #[test]
    fn deviating_avoids_the_suggested_hop() {
        let mut w = World::new(quad(), &[]);
        let mut a = w.agent(0, 0, 2, profile(false, false, false, 0.0), AgentParams::default());
        w.tick(&mut a);
        assert_eq!(a.navigation(), Navigation::Deviating);
        assert_eq!(a.knowledge().path_vec(), vec![NodeId(0), NodeId(3), NodeId(2)]);
        assert_eq!(a.occupied_edge(), Some(edge(0, 3)));
        assert!(a.history().iter().any(|e| e.reason == NavReason::Deviated));
    }

    #[test]
    fn penalty_freezes_agent() {
        let mut w = World::new(line(), &[]);
        let params = AgentParams { penalty_enabled: true, ..AgentParams::default() };
        let mut a = w.agent(0, 0, 2, profile(true, false, true, 0.0).with_penalty(0.5), params);
        w.tick(&mut a);
        assert_eq!(w.tick(&mut a).len(), 1);
        assert_eq!(a.timeout_until(), Some(Tick(7)));
        for _ in 3..7 {
            w.tick(&mut a);
            assert!(near(a.position(), 20.0, 0.0));
        }
        w.tick(&mut a);
        assert_eq!(a.timeout_until(), None);
        assert!(near(a.position(), 30.0, 0.0));
    }

    #[test]
    fn penalty_ignored_when_disabled() {
        let mut w = World::new(line(), &[]);
        let mut a = w.agent(0, 0, 2, profile(true, false, true, 0.0).with_penalty(0.5), AgentParams::default());
        w.tick(&mut a);
        w.tick(&mut a);
        assert_eq!(a.timeout_until(), None);
    }

    #[test]
    fn exhausted_stream_is_an_error() {
        let mut w = World::new(line(), &[]);
        let empty = AgentProfile::fixed(10.0, DecisionStream::constant(0, true, false, false, 0.0));
        let mut a = w.agent(0, 0, 2, empty, AgentParams::default());
        w.clock.advance();
        let ctx = StepContext {
            clock: &w.clock,
            graph: &w.graph,
            router: &DijkstraRouter,
            registry: &w.registry,
        };
        assert!(matches!(a.step(&ctx, &mut w.congestion), Err(AgentError::Decision { .. })));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut w = World::new(quad(), &[edge(0, 1)]);
        let mut a = w.agent(0, 0, 2, profile(true, true, false, 0.0), AgentParams::default());
        for _ in 0..6 {
            w.tick(&mut a);
        }
        assert!(!a.knowledge().known.is_empty());

        w.congestion.reset_occupancy();
        a.reset(&w.graph, &DijkstraRouter, &w.congestion).unwrap();
        assert_eq!(a.state(), AgentState::Initial);
        assert_eq!(a.current(), NodeId(0));
        assert_eq!(a.position(), Point2::new(0.0, 0.0));
        assert!(a.knowledge().known.is_empty());
        assert_eq!(a.history().len(), 1);
        assert_eq!(a.stream().follow_navigation().position(), 0);
        assert_eq!(a.stream().report_if_obstruction().position(), 0);
        assert_eq!(a.occupied_edge(), None);
    }
}
