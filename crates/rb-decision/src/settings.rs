//! Profile-generation settings.
//!
//! Loaded from the scenario file by the application (with the `serde`
//! feature) and handed to [`ProfileGenerator`](crate::ProfileGenerator).

use crate::{DecisionError, DecisionResult};

/// A normal distribution `N(mean, std_dev)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distribution {
    pub mean: f64,
    pub std_dev: f64,
}

impl Distribution {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Always `value`.
    pub const fn fixed(value: f64) -> Self {
        Self { mean: value, std_dev: 0.0 }
    }

    fn check(&self, what: &str) -> DecisionResult<()> {
        if !self.mean.is_finite() {
            return Err(DecisionError::InvalidSettings(format!("{what}: mean must be finite")));
        }
        if !(self.std_dev >= 0.0) || !self.std_dev.is_finite() {
            return Err(DecisionError::InvalidSettings(format!(
                "{what}: std_dev must be finite and non-negative"
            )));
        }
        Ok(())
    }

    fn check_probability(&self, what: &str) -> DecisionResult<()> {
        self.check(what)?;
        if !(0.0..=1.0).contains(&self.mean) {
            return Err(DecisionError::InvalidSettings(format!("{what}: mean must be in [0, 1]")));
        }
        Ok(())
    }
}

/// Delay between deciding to report and the report taking effect.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimeLagSettings {
    pub enabled: bool,
    /// Uniform lower bound, seconds.
    pub min_secs: f64,
    /// Uniform upper bound, seconds.
    pub max_secs: f64,
}

impl Default for TimeLagSettings {
    fn default() -> Self {
        Self { enabled: false, min_secs: 0.0, max_secs: 0.0 }
    }
}

/// Time an agent stands still after submitting a report.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PenaltySettings {
    pub enabled: bool,
    pub mean_secs: f64,
    pub std_dev_secs: f64,
}

impl Default for PenaltySettings {
    fn default() -> Self {
        Self { enabled: false, mean_secs: 0.0, std_dev_secs: 0.0 }
    }
}

/// Everything the generator needs besides the seed and agent count.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneratorSettings {
    /// Length of every pre-sampled sequence.
    pub sequence_len: usize,
    /// Per-agent travel speed, map units per tick.  Clipped at zero.
    pub speed: Distribution,
    /// Per-agent probability of following the navigator.
    pub follow_navigation: Distribution,
    /// Per-agent probability of reporting a real roadblock.
    pub report_if_roadblock: Distribution,
    /// Per-agent probability of falsely reporting a clear road.
    pub report_if_no_roadblock: Distribution,
    pub time_lag: TimeLagSettings,
    pub report_penalty: PenaltySettings,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            sequence_len:           1_000,
            speed:                  Distribution::new(1.0, 0.0),
            follow_navigation:      Distribution::new(0.9, 0.05),
            report_if_roadblock:    Distribution::new(0.8, 0.1),
            report_if_no_roadblock: Distribution::new(0.05, 0.02),
            time_lag:               TimeLagSettings::default(),
            report_penalty:         PenaltySettings::default(),
        }
    }
}

impl GeneratorSettings {
    /// Reject settings the generator cannot sample from.
    pub fn validate(&self) -> DecisionResult<()> {
        self.speed.check("speed")?;
        self.follow_navigation.check_probability("follow_navigation")?;
        self.report_if_roadblock.check_probability("report_if_roadblock")?;
        self.report_if_no_roadblock.check_probability("report_if_no_roadblock")?;

        let lag = &self.time_lag;
        if lag.enabled && !(0.0 <= lag.min_secs && lag.min_secs <= lag.max_secs && lag.max_secs.is_finite()) {
            return Err(DecisionError::InvalidSettings(
                "time_lag: need 0 <= min_secs <= max_secs".into(),
            ));
        }

        let pen = &self.report_penalty;
        if pen.enabled {
            Distribution::new(pen.mean_secs, pen.std_dev_secs).check("report_penalty")?;
            if pen.mean_secs < 0.0 {
                return Err(DecisionError::InvalidSettings(
                    "report_penalty: mean_secs must be non-negative".into(),
                ));
            }
        }
        Ok(())
    }
}
