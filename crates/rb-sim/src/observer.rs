//! Simulation observer trait for progress reporting and data collection.

use rb_agent::Agent;
use rb_core::Tick;
use rb_report::{ReportEvent, RoadblockRegistry};

/// Agent counts at the end of one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSummary {
    pub tick: Tick,
    /// Agents neither finished nor failed.
    pub active: usize,
    pub finished: usize,
    pub failed: usize,
    /// Reports that reached the registry during this tick.
    pub reports_applied: usize,
    /// Delayed reports still in flight after this tick.
    pub reports_pending: usize,
}

impl TickSummary {
    /// No active agents and nothing in flight: further ticks change nothing.
    pub fn is_settled(&self) -> bool {
        self.active == 0 && self.reports_pending == 0
    }
}

/// Callbacks invoked by [`Sim`][crate::Sim] at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {} active", summary.active);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any agent moves.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per report applied to the registry, zero-lag or delayed.
    fn on_report(&mut self, _event: &ReportEvent) {}

    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks` ticks).
    fn on_snapshot(&mut self, _tick: Tick, _agents: &[Agent]) {}

    /// Called once when [`Sim::run`][crate::Sim::run] returns.
    fn on_sim_end(&mut self, _final_tick: Tick, _agents: &[Agent], _registry: &RoadblockRegistry) {}

    /// Called after [`Sim::reset`][crate::Sim::reset] completes.
    fn on_reset(&mut self, _cancelled: usize) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
