//! Unit tests for rb-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EdgeKey, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::default(), NodeId::INVALID);
    }

    #[test]
    fn edge_key_is_symmetric() {
        let ab = EdgeKey::new(NodeId(3), NodeId(1));
        let ba = EdgeKey::new(NodeId(1), NodeId(3));
        assert_eq!(ab, ba);
        assert_eq!(ab.a(), NodeId(1));
        assert_eq!(ab.b(), NodeId(3));
        assert_eq!(ab.to_string(), "[1, 3]");
    }

    #[test]
    fn edge_key_other_endpoint() {
        let e = EdgeKey::new(NodeId(0), NodeId(5));
        assert_eq!(e.other(NodeId(0)), Some(NodeId(5)));
        assert_eq!(e.other(NodeId(5)), Some(NodeId(0)));
        assert_eq!(e.other(NodeId(2)), None);
        assert!(e.touches(NodeId(5)));
        assert!(!e.touches(NodeId(4)));
    }
}

#[cfg(test)]
mod geo {
    use crate::Point2;

    #[test]
    fn distance_is_euclidean() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, -2.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.midpoint(b), Point2::new(5.0, -1.0));
    }

    #[test]
    fn heading_zero_is_up_and_clockwise() {
        let o = Point2::new(0.0, 0.0);
        assert!((o.heading_to(Point2::new(0.0, 1.0)) - 0.0).abs() < 1e-9);
        assert!((o.heading_to(Point2::new(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((o.heading_to(Point2::new(0.0, -1.0)) - 180.0).abs() < 1e-9);
        assert!((o.heading_to(Point2::new(-1.0, 0.0)) - 270.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15).since(Tick(10)), 5);
        assert_eq!(Tick(5).since(Tick(10)), 0);
    }

    #[test]
    fn clock_elapsed_and_reset() {
        let mut clock = SimClock::new(250);
        clock.advance();
        clock.advance();
        assert!((clock.elapsed_secs() - 0.5).abs() < 1e-12);
        clock.reset();
        assert_eq!(clock.current_tick, Tick::ZERO);
    }

    #[test]
    fn ticks_for_secs_rounds_up() {
        let clock = SimClock::new(100);
        assert_eq!(clock.ticks_for_secs(0.0), 0);
        assert_eq!(clock.ticks_for_secs(-3.0), 0);
        assert_eq!(clock.ticks_for_secs(f64::NAN), 0);
        assert_eq!(clock.ticks_for_secs(1.0), 10);
        assert_eq!(clock.ticks_for_secs(1.01), 11);
    }

    #[test]
    fn config_validation() {
        let mut cfg = SimConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.end_tick(), Tick(cfg.total_ticks));
        cfg.tick_duration_ms = 0;
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng};

    #[test]
    fn same_seed_same_stream() {
        let mut a = AgentRng::new(7, AgentId(3));
        let mut b = AgentRng::new(7, AgentId(3));
        for _ in 0..16 {
            assert_eq!(a.unit().to_bits(), b.unit().to_bits());
        }
    }

    #[test]
    fn different_agents_diverge() {
        let mut a = AgentRng::new(7, AgentId(0));
        let mut b = AgentRng::new(7, AgentId(1));
        let xs: Vec<f64> = (0..8).map(|_| a.unit()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.unit()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut r = AgentRng::new(1, AgentId(0));
        assert!((0..32).all(|_| r.gen_bool(1.0)));
        assert!((0..32).all(|_| !r.gen_bool(0.0)));
    }
}
