//! The `OutputWriter` trait implemented by output backends.

use crate::{AgentProfileRow, AgentSnapshotRow, NavEventRow, OutputResult, ReportRow, RoadblockRow, TickSummaryRow};

/// Sink for every table the simulator produces.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of agent snapshots.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Append one applied report to the report history.
    fn write_report(&mut self, row: &ReportRow) -> OutputResult<()>;

    /// Write the final roadblock table, real and fake.
    fn write_roadblocks(&mut self, rows: &[RoadblockRow]) -> OutputResult<()>;

    /// Write every agent's navigation history.
    fn write_nav_history(&mut self, rows: &[NavEventRow]) -> OutputResult<()>;

    /// Write one profile row per agent.
    fn write_profiles(&mut self, rows: &[AgentProfileRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
