//! `SimOutputObserver<W>` bridges `SimObserver` to an `OutputWriter`.

use rb_agent::Agent;
use rb_core::{SimConfig, Tick};
use rb_report::{ReportEvent, RoadblockRegistry};
use rb_sim::{SimObserver, TickSummary};

use crate::row::{AgentProfileRow, AgentSnapshotRow, NavEventRow, ReportRow, RoadblockRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes every output table to any [`OutputWriter`].
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:           W,
    tick_duration_ms: u32,
    last_error:       Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for the
    /// tick-to-seconds conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            tick_duration_ms: config.tick_duration_ms,
            last_error:       None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn elapsed_secs(&self, tick: Tick) -> f64 {
        tick.0 as f64 * self.tick_duration_ms as f64 / 1000.0
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_report(&mut self, event: &ReportEvent) {
        let result = self.writer.write_report(&ReportRow::from(event));
        self.store_err(result);
    }

    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick:            tick.0,
            elapsed_secs:    self.elapsed_secs(tick),
            active:          summary.active as u64,
            finished:        summary.finished as u64,
            failed:          summary.failed as u64,
            reports_applied: summary.reports_applied as u64,
            reports_pending: summary.reports_pending as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[Agent]) {
        if agents.is_empty() {
            return;
        }
        let rows: Vec<AgentSnapshotRow> = agents.iter().map(|a| AgentSnapshotRow::new(tick, a)).collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick, agents: &[Agent], registry: &RoadblockRegistry) {
        let blocks: Vec<RoadblockRow> = registry
            .roadblocks()
            .map(|b| RoadblockRow::new(b, &registry.times_reported(b.edge)))
            .collect();
        let result = self.writer.write_roadblocks(&blocks);
        self.store_err(result);

        let nav: Vec<NavEventRow> = agents
            .iter()
            .flat_map(|a| a.history().iter().map(move |e| NavEventRow::new(a.id().0, e)))
            .collect();
        let result = self.writer.write_nav_history(&nav);
        self.store_err(result);

        let profiles: Vec<AgentProfileRow> = agents.iter().map(AgentProfileRow::new).collect();
        let result = self.writer.write_profiles(&profiles);
        self.store_err(result);

        let result = self.writer.finish();
        self.store_err(result);
    }
}
