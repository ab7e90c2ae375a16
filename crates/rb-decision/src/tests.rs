//! Unit tests for rb-decision.

#[cfg(test)]
mod stream {
    use crate::{DecisionError, DecisionStream, Sequence, StreamKind};

    #[test]
    fn cursor_is_forward_only_until_reset() {
        let mut s = Sequence::new(StreamKind::FollowNavigation, vec![true, false]);
        assert_eq!(s.peek(), Some(true));
        assert!(s.next_value().unwrap());
        assert!(!s.next_value().unwrap());
        assert_eq!(s.remaining(), 0);
        s.reset();
        assert_eq!(s.position(), 0);
        assert!(s.next_value().unwrap());
    }

    #[test]
    fn overrun_is_exhausted_error() {
        let mut s = Sequence::new(StreamKind::TimeLag, vec![1.5]);
        s.next_value().unwrap();
        match s.next_value() {
            Err(DecisionError::Exhausted { kind, len }) => {
                assert_eq!(kind, StreamKind::TimeLag);
                assert_eq!(len, 1);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        // Failed read does not move the cursor.
        assert_eq!(s.position(), 1);
    }

    #[test]
    fn sequences_are_independent() {
        let mut d = DecisionStream::new(vec![true], vec![false, true], vec![], vec![0.0, 2.0]);
        assert!(d.next_follow_navigation().unwrap());
        assert!(d.next_follow_navigation().is_err());
        assert!(!d.next_report_if_obstruction().unwrap());
        assert!(d.next_report_if_clear().is_err());
        assert_eq!(d.next_time_lag().unwrap(), 0.0);
        assert_eq!(d.next_time_lag().unwrap(), 2.0);
        assert_eq!(d.report_if_obstruction().position(), 1);

        d.reset();
        assert_eq!(d.follow_navigation().position(), 0);
        assert_eq!(d.time_lag().position(), 0);
    }

    #[test]
    fn constant_stream() {
        let mut d = DecisionStream::constant(3, true, true, false, 0.5);
        for _ in 0..3 {
            assert!(d.next_follow_navigation().unwrap());
            assert_eq!(d.next_time_lag().unwrap(), 0.5);
        }
        assert!(d.next_follow_navigation().is_err());
    }
}

#[cfg(test)]
mod settings {
    use crate::{Distribution, GeneratorSettings};

    #[test]
    fn defaults_are_valid() {
        assert!(GeneratorSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        let mut s = GeneratorSettings::default();
        s.follow_navigation = Distribution::new(1.2, 0.0);
        assert!(s.validate().is_err());

        let mut s = GeneratorSettings::default();
        s.speed = Distribution::new(1.0, -0.1);
        assert!(s.validate().is_err());

        let mut s = GeneratorSettings::default();
        s.time_lag.enabled = true;
        s.time_lag.min_secs = 5.0;
        s.time_lag.max_secs = 1.0;
        assert!(s.validate().is_err());
        // Disabled lag is not checked.
        s.time_lag.enabled = false;
        assert!(s.validate().is_ok());

        let mut s = GeneratorSettings::default();
        s.report_penalty.enabled = true;
        s.report_penalty.mean_secs = -1.0;
        assert!(s.validate().is_err());
    }
}

#[cfg(test)]
mod generator {
    use rb_core::AgentId;

    use crate::{AgentProfile, DecisionStream, Distribution, GeneratorSettings, ProfileGenerator};

    fn settings() -> GeneratorSettings {
        let mut s = GeneratorSettings::default();
        s.sequence_len = 64;
        s.speed = Distribution::new(2.0, 0.5);
        s
    }

    #[test]
    fn same_seed_same_profiles() {
        let a = ProfileGenerator::new(settings(), 11).unwrap().generate(5).unwrap();
        let b = ProfileGenerator::new(settings(), 11).unwrap().generate(5).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn generate_one_matches_batch() {
        let g = ProfileGenerator::new(settings(), 3).unwrap();
        let batch = g.generate(4).unwrap();
        assert_eq!(g.generate_one(AgentId(2)).unwrap(), batch[2]);
    }

    #[test]
    fn different_seeds_differ() {
        let a = ProfileGenerator::new(settings(), 1).unwrap().generate(3).unwrap();
        let b = ProfileGenerator::new(settings(), 2).unwrap().generate(3).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn probabilities_are_clipped_and_sequences_sized() {
        let mut s = settings();
        s.follow_navigation = Distribution::new(1.0, 5.0);
        s.speed = Distribution::new(0.0, 10.0);
        let profiles = ProfileGenerator::new(s, 9).unwrap().generate(20).unwrap();
        for p in &profiles {
            assert!((0.0..=1.0).contains(&p.probabilities.follow_navigation));
            assert!(p.speed >= 0.0);
            assert_eq!(p.stream.follow_navigation().len(), 64);
            assert_eq!(p.stream.time_lag().len(), 64);
            assert_eq!(p.penalty_secs, 0.0);
        }
    }

    #[test]
    fn degenerate_probabilities_give_constant_sequences() {
        let mut s = settings();
        s.follow_navigation = Distribution::fixed(1.0);
        s.report_if_roadblock = Distribution::fixed(0.0);
        let p = ProfileGenerator::new(s, 4).unwrap().generate_one(AgentId(0)).unwrap();
        assert!(p.stream.follow_navigation().values().iter().all(|&b| b));
        assert!(p.stream.report_if_obstruction().values().iter().all(|&b| !b));
    }

    #[test]
    fn time_lag_uniform_within_bounds() {
        let mut s = settings();
        s.time_lag.enabled = true;
        s.time_lag.min_secs = 2.0;
        s.time_lag.max_secs = 4.0;
        let p = ProfileGenerator::new(s, 4).unwrap().generate_one(AgentId(1)).unwrap();
        assert!(p.stream.time_lag().values().iter().all(|&v| (2.0..=4.0).contains(&v)));
    }

    #[test]
    fn disabled_time_lag_is_zero() {
        let p = ProfileGenerator::new(settings(), 4).unwrap().generate_one(AgentId(1)).unwrap();
        assert!(p.stream.time_lag().values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn penalty_sampled_when_enabled() {
        let mut s = settings();
        s.report_penalty.enabled = true;
        s.report_penalty.mean_secs = 3.0;
        s.report_penalty.std_dev_secs = 0.0;
        let p = ProfileGenerator::new(s, 4).unwrap().generate_one(AgentId(0)).unwrap();
        assert_eq!(p.penalty_secs, 3.0);
    }

    #[test]
    fn invalid_settings_rejected_up_front() {
        let mut s = settings();
        s.report_if_no_roadblock = Distribution::new(-0.5, 0.1);
        assert!(ProfileGenerator::new(s, 0).is_err());
    }

    #[test]
    fn fixed_profile_records_observed_share() {
        let p = AgentProfile::fixed(1.0, DecisionStream::new(
            vec![true, false, true, true],
            vec![true; 4],
            vec![false; 4],
            vec![0.0; 4],
        ));
        assert_eq!(p.probabilities.follow_navigation, 0.75);
        assert_eq!(p.probabilities.report_if_roadblock, 1.0);
        assert_eq!(p.probabilities.report_if_no_roadblock, 0.0);
        assert_eq!(p.with_penalty(-2.0).penalty_secs, 0.0);
    }
}
