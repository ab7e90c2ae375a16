//! CSV output backend.
//!
//! Creates six files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`
//! - `report_history.csv`
//! - `roadblocks.csv`
//! - `nav_history.csv`
//! - `agent_profiles.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentProfileRow, AgentSnapshotRow, NavEventRow, OutputResult, ReportRow, RoadblockRow, TickSummaryRow};

/// Writes simulation output to CSV files.
pub struct CsvWriter {
    snapshots:  Writer<File>,
    summaries:  Writer<File>,
    reports:    Writer<File>,
    roadblocks: Writer<File>,
    nav:        Writer<File>,
    profiles:   Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record([
            "agent_id", "tick", "x", "y", "heading", "current_node", "next_node", "progress", "state",
            "navigation", "path",
        ])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick", "elapsed_secs", "active", "finished", "failed", "reports_applied", "reports_pending",
        ])?;

        let mut reports = Writer::from_path(dir.join("report_history.csv"))?;
        reports.write_record([
            "reporter", "edge_a", "edge_b", "is_real", "submitted_tick", "applied_tick", "lag_secs",
            "report_count",
        ])?;

        let mut roadblocks = Writer::from_path(dir.join("roadblocks.csv"))?;
        roadblocks.write_record(["edge_a", "edge_b", "is_real", "is_reported", "report_count", "times_reported"])?;

        let mut nav = Writer::from_path(dir.join("nav_history.csv"))?;
        nav.write_record(["agent_id", "tick", "reason", "waypoint", "route"])?;

        let mut profiles = Writer::from_path(dir.join("agent_profiles.csv"))?;
        profiles.write_record([
            "agent_id", "start", "end", "speed", "penalty_secs", "follow_navigation", "report_if_roadblock",
            "report_if_no_roadblock",
        ])?;

        Ok(Self {
            snapshots,
            summaries,
            reports,
            roadblocks,
            nav,
            profiles,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.heading.to_string(),
                row.current.to_string(),
                row.next.to_string(),
                row.progress.to_string(),
                row.state.to_owned(),
                row.navigation.to_owned(),
                row.path.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_secs.to_string(),
            row.active.to_string(),
            row.finished.to_string(),
            row.failed.to_string(),
            row.reports_applied.to_string(),
            row.reports_pending.to_string(),
        ])?;
        Ok(())
    }

    fn write_report(&mut self, row: &ReportRow) -> OutputResult<()> {
        self.reports.write_record(&[
            row.reporter.to_string(),
            row.edge_a.to_string(),
            row.edge_b.to_string(),
            (row.is_real as u8).to_string(),
            row.submitted_tick.to_string(),
            row.applied_tick.to_string(),
            row.lag_secs.to_string(),
            row.report_count.to_string(),
        ])?;
        Ok(())
    }

    fn write_roadblocks(&mut self, rows: &[RoadblockRow]) -> OutputResult<()> {
        for row in rows {
            self.roadblocks.write_record(&[
                row.edge_a.to_string(),
                row.edge_b.to_string(),
                (row.is_real as u8).to_string(),
                (row.is_reported as u8).to_string(),
                row.report_count.to_string(),
                row.times_reported.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_nav_history(&mut self, rows: &[NavEventRow]) -> OutputResult<()> {
        for row in rows {
            self.nav.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.reason.to_owned(),
                row.waypoint.to_string(),
                row.route.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_profiles(&mut self, rows: &[AgentProfileRow]) -> OutputResult<()> {
        for row in rows {
            self.profiles.write_record(&[
                row.agent_id.to_string(),
                row.start.to_string(),
                row.end.to_string(),
                row.speed.to_string(),
                row.penalty_secs.to_string(),
                row.follow_navigation.to_string(),
                row.report_if_roadblock.to_string(),
                row.report_if_no_roadblock.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        self.reports.flush()?;
        self.roadblocks.flush()?;
        self.nav.flush()?;
        self.profiles.flush()?;
        Ok(())
    }
}
