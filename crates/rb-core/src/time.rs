//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  One tick is one frame
//! of the cooperative driver: every live agent moves once.  The mapping to
//! simulated seconds is held in `SimClock`:
//!
//!   elapsed_secs = tick * tick_duration_ms / 1000
//!
//! Durations sampled in seconds (report time-lags, report penalties) are
//! converted to whole ticks with [`SimClock::ticks_for_secs`], rounding up so
//! a delayed effect never lands early.

use std::fmt;

use crate::CoreError;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0.saturating_add(n))
    }

    /// Ticks elapsed from `earlier` to `self` (zero if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        self.offset(rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated milliseconds one tick represents.
    pub tick_duration_ms: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_duration_ms: u32) -> Self {
        Self { tick_duration_ms, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.offset(1);
    }

    /// Rewind to tick zero (scenario reset).
    #[inline]
    pub fn reset(&mut self) {
        self.current_tick = Tick::ZERO;
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.tick_duration_ms as f64 / 1000.0
    }

    /// How many ticks span `secs` seconds?  Rounds up; negative, NaN, and
    /// zero inputs map to zero ticks.
    pub fn ticks_for_secs(&self, secs: f64) -> u64 {
        if !(secs > 0.0) || self.tick_duration_ms == 0 {
            return 0;
        }
        (secs * 1000.0 / self.tick_duration_ms as f64).ceil() as u64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} s)", self.current_tick, self.elapsed_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically loaded from a scenario file by the application crate and passed
/// to the simulation builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated milliseconds per tick.  Default: 100.
    pub tick_duration_ms: u32,

    /// Total ticks to simulate before `Sim::run` returns.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical profiles.
    pub seed: u64,

    /// Snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms:      100,
            total_ticks:           10_000,
            seed:                  0,
            output_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_ms)
    }

    /// Reject configurations the tick driver cannot run.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.tick_duration_ms == 0 {
            return Err(CoreError::Config("tick_duration_ms must be positive".into()));
        }
        Ok(())
    }
}
