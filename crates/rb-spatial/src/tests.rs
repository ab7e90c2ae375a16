//! Unit tests for rb-spatial.
//!
//! All tests use hand-built graphs.

#[cfg(test)]
mod helpers {
    use rb_core::{NodeId, Point2};
    use crate::{RoadGraph, RoadGraphBuilder};

    /// Unit square 0-1-2-3-0 with unit weights.
    ///
    /// ```text
    ///   3 ── 2
    ///   │    │
    ///   0 ── 1
    /// ```
    pub fn square() -> (RoadGraph, [NodeId; 4]) {
        let mut b = RoadGraphBuilder::new();
        let n0 = b.add_node(Point2::new(0.0, 0.0));
        let n1 = b.add_node(Point2::new(1.0, 0.0));
        let n2 = b.add_node(Point2::new(1.0, 1.0));
        let n3 = b.add_node(Point2::new(0.0, 1.0));
        b.add_road(n0, n1).unwrap();
        b.add_road(n1, n2).unwrap();
        b.add_road(n2, n3).unwrap();
        b.add_road(n3, n0).unwrap();
        (b.build(), [n0, n1, n2, n3])
    }

    /// Line 0-1-2 plus an isolated node 3.
    pub fn line_with_island() -> (RoadGraph, [NodeId; 4]) {
        let mut b = RoadGraphBuilder::new();
        let n0 = b.add_node(Point2::new(0.0, 0.0));
        let n1 = b.add_node(Point2::new(10.0, 0.0));
        let n2 = b.add_node(Point2::new(20.0, 0.0));
        let n3 = b.add_node(Point2::new(50.0, 50.0));
        b.add_road(n0, n1).unwrap();
        b.add_road(n1, n2).unwrap();
        (b.build(), [n0, n1, n2, n3])
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rb_core::{EdgeKey, NodeId, Point2};
    use crate::{RoadGraphBuilder, SpatialError};

    #[test]
    fn empty_build() {
        let g = RoadGraphBuilder::new().build();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
        assert_eq!(g.neighbors(NodeId(0)).count(), 0);
    }

    #[test]
    fn euclidean_default_weight() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(Point2::new(0.0, 0.0));
        let c = b.add_node(Point2::new(3.0, 4.0));
        let key = b.add_road(a, c).unwrap();
        let g = b.build();
        assert_eq!(g.edge_weight(key), Some(5.0));
        assert!(g.has_edge(c, a));
    }

    #[test]
    fn csr_neighbors_are_symmetric() {
        let (g, [n0, n1, n2, n3]) = super::helpers::square();
        assert_eq!(g.edge_count(), 4);
        let mut around0: Vec<NodeId> = g.neighbors(n0).map(|(n, _)| n).collect();
        around0.sort();
        assert_eq!(around0, vec![n1, n3]);
        assert_eq!(g.degree(n2), 2);
        assert!(!g.has_edge(n0, n2));
    }

    #[test]
    fn edges_listed_once_in_key_order() {
        let (g, [n0, n1, n2, n3]) = super::helpers::square();
        let keys: Vec<EdgeKey> = g.edges().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                EdgeKey::new(n0, n1),
                EdgeKey::new(n0, n3),
                EdgeKey::new(n1, n2),
                EdgeKey::new(n2, n3),
            ]
        );
    }

    #[test]
    fn rejects_bad_roads() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(Point2::new(0.0, 0.0));
        let c = b.add_node(Point2::new(1.0, 0.0));
        assert!(matches!(b.add_road(a, NodeId(9)), Err(SpatialError::NodeNotFound(_))));
        assert!(matches!(b.add_road(a, a), Err(SpatialError::SelfLoop(_))));
        assert!(matches!(
            b.add_road_weighted(a, c, -1.0),
            Err(SpatialError::InvalidWeight { .. })
        ));
        b.add_road(a, c).unwrap();
        assert!(matches!(b.add_road(c, a), Err(SpatialError::DuplicateEdge(_))));
    }
}

// ── Congestion ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod congestion {
    use rb_core::EdgeKey;
    use crate::{CongestionError, CongestionModel, StepTable};

    #[test]
    fn free_flow_multipliers_are_one() {
        let (_, [n0, n1, ..]) = super::helpers::square();
        let m = CongestionModel::free_flow();
        let e = EdgeKey::new(n0, n1);
        assert_eq!(m.combined_factor(e), 1.0);
        assert_eq!(m.cost_multiplier(e), 1.0);
        assert_eq!(m.speed_multiplier(e), 1.0);
    }

    #[test]
    fn static_factor_without_table_inverts() {
        let (g, [n0, n1, ..]) = super::helpers::square();
        let e = EdgeKey::new(n0, n1);
        let m = CongestionModel::new(&g, [(e, 0.5)], StepTable::occupancy(), StepTable::cost()).unwrap();
        assert_eq!(m.cost_multiplier(e), 2.0);
        assert_eq!(m.speed_multiplier(e), 0.5);
    }

    #[test]
    fn occupancy_table_is_lower_inclusive() {
        let t = StepTable::occupancy().with_range(1.0, 3.0, 0.5).unwrap();
        assert_eq!(t.lookup(0.0), None);
        assert_eq!(t.lookup(1.0), Some(0.5));
        assert_eq!(t.lookup(2.0), Some(0.5));
        assert_eq!(t.lookup(3.0), None);
    }

    #[test]
    fn cost_table_is_upper_inclusive() {
        let t = StepTable::cost().with_range(0.25, 0.5, 4.0).unwrap();
        assert_eq!(t.lookup(0.25), None);
        assert_eq!(t.lookup(0.5), Some(4.0));
        assert_eq!(t.lookup(0.3), Some(4.0));
        assert_eq!(t.lookup(0.6), None);
    }

    #[test]
    fn occupancy_drives_combined_factor() {
        let (g, [n0, n1, ..]) = super::helpers::square();
        let e = EdgeKey::new(n0, n1);
        let occ = StepTable::occupancy().with_range(2.0, 100.0, 0.5).unwrap();
        let mut m = CongestionModel::new(&g, [(e, 0.8)], occ, StepTable::cost()).unwrap();
        m.move_agent(None, Some(e)).unwrap();
        assert!((m.combined_factor(e) - 0.8).abs() < 1e-12);
        m.move_agent(None, Some(e)).unwrap();
        assert!((m.combined_factor(e) - 0.4).abs() < 1e-12);
        assert!((m.cost_multiplier(e) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn move_agent_balances_and_underflows() {
        let (g, [n0, n1, n2, _]) = super::helpers::square();
        let a = EdgeKey::new(n0, n1);
        let b = EdgeKey::new(n1, n2);
        let mut m = CongestionModel::new(&g, [], StepTable::occupancy(), StepTable::cost()).unwrap();
        m.move_agent(None, Some(a)).unwrap();
        m.move_agent(Some(a), Some(b)).unwrap();
        assert_eq!(m.occupancy(a), 0);
        assert_eq!(m.occupancy(b), 1);
        let err = m.move_agent(Some(a), Some(b)).unwrap_err();
        assert!(matches!(err, CongestionError::OccupancyUnderflow(e) if e == a));
        // Failed move leaves the table untouched.
        assert_eq!(m.occupancy(b), 1);
        m.move_agent(Some(b), None).unwrap();
        assert_eq!(m.total_occupancy(), 0);
    }

    #[test]
    fn reset_occupancy_zeroes() {
        let (g, [n0, n1, ..]) = super::helpers::square();
        let e = EdgeKey::new(n0, n1);
        let mut m = CongestionModel::new(&g, [(e, 0.5)], StepTable::occupancy(), StepTable::cost()).unwrap();
        m.move_agent(None, Some(e)).unwrap();
        m.reset_occupancy();
        assert_eq!(m.occupancy(e), 0);
        assert_eq!(m.static_factor(e), 0.5);
    }

    #[test]
    fn rejects_bad_configuration() {
        let (g, [n0, n1, n2, _]) = super::helpers::square();
        let e = EdgeKey::new(n0, n1);
        let diag = EdgeKey::new(n0, n2);
        let empty = || (StepTable::occupancy(), StepTable::cost());
        let (o, c) = empty();
        assert!(matches!(
            CongestionModel::new(&g, [(e, 0.0)], o, c),
            Err(CongestionError::InvalidFactor { .. })
        ));
        let (o, c) = empty();
        assert!(matches!(
            CongestionModel::new(&g, [(e, 1.5)], o, c),
            Err(CongestionError::InvalidFactor { .. })
        ));
        let (o, c) = empty();
        assert!(matches!(
            CongestionModel::new(&g, [(diag, 0.5)], o, c),
            Err(CongestionError::UnknownEdge(_))
        ));
        assert!(StepTable::occupancy().with_range(0.0, 2.0, 0.5).is_err());
        assert!(StepTable::occupancy().with_range(3.0, 2.0, 0.5).is_err());
        assert!(StepTable::cost().with_range(-0.1, 0.5, 2.0).is_err());
        assert!(StepTable::cost().with_range(0.1, 0.5, 0.0).is_err());
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use rb_core::{EdgeKey, NodeId};
    use crate::{CongestionModel, DijkstraRouter, EdgeSet, RouteQuery, Router, StepTable};

    #[test]
    fn square_shortest_path() {
        let (g, [n0, n1, n2, n3]) = super::helpers::square();
        let c = CongestionModel::free_flow();
        let r = DijkstraRouter.route(&g, &c, &RouteQuery::new(n0, n2));
        assert!((r.cost - 2.0).abs() < 1e-12);
        assert!(r.nodes == vec![n0, n1, n2] || r.nodes == vec![n0, n3, n2]);
        assert!(r.validate_against(&g));
    }

    #[test]
    fn same_node_is_singleton() {
        let (g, [n0, ..]) = super::helpers::square();
        let r = DijkstraRouter.route(&g, &CongestionModel::free_flow(), &RouteQuery::new(n0, n0));
        assert_eq!(r.nodes, vec![n0]);
        assert!(!r.is_miss(n0, n0));
    }

    #[test]
    fn known_exclusion_forces_detour() {
        let (g, [n0, n1, n2, n3]) = super::helpers::square();
        let known: EdgeSet = [EdgeKey::new(n1, n2)].into_iter().collect();
        let q = RouteQuery::new(n0, n2).excluding_known(&known);
        let r = DijkstraRouter.route(&g, &CongestionModel::free_flow(), &q);
        assert_eq!(r.nodes, vec![n0, n3, n2]);
        assert!(r.edges().all(|e| !known.contains(&e)));
    }

    #[test]
    fn single_edge_and_public_exclusions() {
        let (g, [n0, n1, n2, n3]) = super::helpers::square();
        let c = CongestionModel::free_flow();

        let q = RouteQuery::new(n0, n2).excluding_edge(EdgeKey::new(n3, n2));
        assert_eq!(DijkstraRouter.route(&g, &c, &q).nodes, vec![n0, n1, n2]);

        let public: EdgeSet = [EdgeKey::new(n0, n1)].into_iter().collect();
        let q = RouteQuery::new(n0, n2).avoiding_public(&public);
        assert_eq!(DijkstraRouter.route(&g, &c, &q).nodes, vec![n0, n3, n2]);
    }

    #[test]
    fn unreachable_is_miss_not_error() {
        let (g, [n0, _, n2, n3]) = super::helpers::line_with_island();
        let c = CongestionModel::free_flow();
        let r = DijkstraRouter.route(&g, &c, &RouteQuery::new(n0, n3));
        assert_eq!(r.nodes, vec![n0]);
        assert!(r.is_miss(n0, n3));

        let all: EdgeSet = g.edges().into_iter().map(|(k, _)| k).collect();
        let r = DijkstraRouter.route(&g, &c, &RouteQuery::new(n0, n2).excluding_known(&all));
        assert!(r.is_miss(n0, n2));

        let r = DijkstraRouter.route(&g, &c, &RouteQuery::new(n0, NodeId(99)));
        assert!(r.is_miss(n0, NodeId(99)));
    }

    #[test]
    fn congestion_doubles_cost_and_shifts_route() {
        let (g, [n0, n1, n2, n3]) = super::helpers::square();
        let e = EdgeKey::new(n0, n1);
        let cost = StepTable::cost().with_range(0.25, 0.5, 2.0).unwrap();
        let c = CongestionModel::new(&g, [(e, 0.5)], StepTable::occupancy(), cost).unwrap();
        assert_eq!(c.cost_multiplier(e), 2.0);

        let r = DijkstraRouter.route(&g, &c, &RouteQuery::new(n0, n1));
        // Congested direct edge (2.0) still beats the three-hop detour (3.0).
        assert_eq!(r.nodes, vec![n0, n1]);
        assert!((r.cost - 2.0).abs() < 1e-12);

        let r = DijkstraRouter.route(&g, &c, &RouteQuery::new(n0, n2));
        assert_eq!(r.nodes, vec![n0, n3, n2]);
    }

    #[test]
    fn routing_is_idempotent() {
        let (g, [n0, _, n2, _]) = super::helpers::square();
        let c = CongestionModel::free_flow();
        let q = RouteQuery::new(n0, n2);
        let a = DijkstraRouter.route(&g, &c, &q);
        let b = DijkstraRouter.route(&g, &c, &q);
        assert_eq!(a, b);
    }
}
