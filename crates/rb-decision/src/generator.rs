//! Seeded per-agent profile generation.
//!
//! For each agent the generator draws, from that agent's own [`AgentRng`]:
//!
//! 1. a travel speed `~ N(speed)` clipped at zero,
//! 2. three behaviour probabilities `~ N(..)` clipped to `[0, 1]`,
//! 3. a report penalty `~ N(penalty)` clipped at zero (zero when disabled),
//! 4. three boolean sequences, `unit() < p` per element,
//! 5. a time-lag sequence `~ U(min, max)` (all zeros when disabled).
//!
//! Profiles depend only on `(seed, agent id, settings)`, so sequential and
//! parallel generation agree bit for bit.

use rand::Rng;
use rand_distr::{Normal, Uniform};
use tracing::debug;

use rb_core::{AgentId, AgentRng};

use crate::{DecisionError, DecisionResult, DecisionStream, Distribution, GeneratorSettings};

/// The behaviour probabilities an agent's sequences were sampled from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentProbabilities {
    pub follow_navigation: f64,
    pub report_if_roadblock: f64,
    pub report_if_no_roadblock: f64,
}

/// Everything stochastic about one agent.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentProfile {
    /// Map units per tick before congestion.
    pub speed: f64,
    /// Seconds frozen after submitting a report.
    pub penalty_secs: f64,
    pub probabilities: AgentProbabilities,
    pub stream: DecisionStream,
}

impl AgentProfile {
    /// A hand-written profile with no penalty.  The recorded probabilities
    /// are the observed share of `true` in each sequence.
    pub fn fixed(speed: f64, stream: DecisionStream) -> Self {
        Self {
            speed,
            penalty_secs: 0.0,
            probabilities: AgentProbabilities {
                follow_navigation:      share(stream.follow_navigation().values()),
                report_if_roadblock:    share(stream.report_if_obstruction().values()),
                report_if_no_roadblock: share(stream.report_if_clear().values()),
            },
            stream,
        }
    }

    /// Same profile with a report penalty.
    pub fn with_penalty(mut self, secs: f64) -> Self {
        self.penalty_secs = secs.max(0.0);
        self
    }
}

// ── ProfileGenerator ──────────────────────────────────────────────────────────

/// Draws [`AgentProfile`]s from [`GeneratorSettings`].
#[derive(Clone, Debug)]
pub struct ProfileGenerator {
    settings: GeneratorSettings,
    seed: u64,
}

impl ProfileGenerator {
    /// Validate `settings` and bind them to a run seed.
    pub fn new(settings: GeneratorSettings, seed: u64) -> DecisionResult<Self> {
        settings.validate()?;
        Ok(Self { settings, seed })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Profiles for agents `0 .. count`.
    pub fn generate(&self, count: usize) -> DecisionResult<Vec<AgentProfile>> {
        debug!(count, seed = self.seed, "generating agent profiles");

        #[cfg(not(feature = "parallel"))]
        {
            (0..count).map(|i| self.generate_one(agent_id(i)?)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            (0..count)
                .into_par_iter()
                .map(|i| self.generate_one(agent_id(i)?))
                .collect()
        }
    }

    /// The profile of a single agent.
    pub fn generate_one(&self, agent: AgentId) -> DecisionResult<AgentProfile> {
        let s = &self.settings;
        let mut rng = AgentRng::new(self.seed, agent);

        let speed = sample_normal(&mut rng, s.speed)?.max(0.0);
        let probabilities = AgentProbabilities {
            follow_navigation:      sample_probability(&mut rng, s.follow_navigation)?,
            report_if_roadblock:    sample_probability(&mut rng, s.report_if_roadblock)?,
            report_if_no_roadblock: sample_probability(&mut rng, s.report_if_no_roadblock)?,
        };
        let penalty_secs = if s.report_penalty.enabled {
            let d = Distribution::new(s.report_penalty.mean_secs, s.report_penalty.std_dev_secs);
            sample_normal(&mut rng, d)?.max(0.0)
        } else {
            0.0
        };

        let n = s.sequence_len;
        let follow = bools(&mut rng, n, probabilities.follow_navigation);
        let report_obstruction = bools(&mut rng, n, probabilities.report_if_roadblock);
        let report_clear = bools(&mut rng, n, probabilities.report_if_no_roadblock);
        let lags = if s.time_lag.enabled {
            let u = Uniform::new_inclusive(s.time_lag.min_secs, s.time_lag.max_secs);
            (0..n).map(|_| rng.inner().sample(u)).collect()
        } else {
            vec![0.0; n]
        };

        Ok(AgentProfile {
            speed,
            penalty_secs,
            probabilities,
            stream: DecisionStream::new(follow, report_obstruction, report_clear, lags),
        })
    }
}

fn agent_id(i: usize) -> DecisionResult<AgentId> {
    AgentId::try_from(i).map_err(|_| DecisionError::InvalidSettings(format!("agent index {i} overflows")))
}

fn sample_normal(rng: &mut AgentRng, d: Distribution) -> DecisionResult<f64> {
    let normal = Normal::new(d.mean, d.std_dev)
        .map_err(|e| DecisionError::InvalidSettings(format!("normal({}, {}): {e}", d.mean, d.std_dev)))?;
    Ok(rng.inner().sample(normal))
}

fn sample_probability(rng: &mut AgentRng, d: Distribution) -> DecisionResult<f64> {
    Ok(sample_normal(rng, d)?.clamp(0.0, 1.0))
}

fn share(values: &[bool]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&b| b).count() as f64 / values.len() as f64
}

fn bools(rng: &mut AgentRng, n: usize, p: f64) -> Vec<bool> {
    (0..n).map(|_| rng.unit() < p).collect()
}
