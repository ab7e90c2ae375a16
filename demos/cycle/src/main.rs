//! cycle: a runnable roadblock scenario.
//!
//! Loads a JSON scenario (first argument) or the built-in 6-node ring,
//! generates agent profiles, runs the simulation to completion, writes CSV
//! output to `output/cycle`, then resets and runs again to show that a reset
//! replays the same trajectories.
//!
//! Logging is controlled with `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=rb_agent=debug cargo run -p cycle`.

mod scenario;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rb_agent::Agent;
use rb_core::Tick;
use rb_output::{CsvWriter, OutputWriter, SimOutputObserver};
use rb_report::{ReportEvent, RoadblockRegistry};
use rb_sim::{NoopObserver, SimObserver, TickSummary};

use scenario::Scenario;

const OUTPUT_DIR: &str = "output/cycle";

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    snapshot_rows: usize,
    summary_rows:  usize,
    report_rows:   usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, summary_rows: 0, report_rows: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_report(&mut self, event: &ReportEvent) {
        self.report_rows += 1;
        self.inner.on_report(event);
    }

    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.summary_rows += 1;
        self.inner.on_tick_end(tick, summary);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[Agent]) {
        self.snapshot_rows += agents.len();
        self.inner.on_snapshot(tick, agents);
    }

    fn on_sim_end(&mut self, final_tick: Tick, agents: &[Agent], registry: &RoadblockRegistry) {
        self.inner.on_sim_end(final_tick, agents, registry);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Scenario.
    let scenario = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!(path = %path.display(), "loading scenario");
            Scenario::load(&path)?
        }
        None => {
            info!("no scenario given, using the built-in ring");
            Scenario::builtin()?
        }
    };
    let config = scenario.config.clone();
    println!("=== cycle: roadblock routing simulator ===");
    println!(
        "Nodes: {}  |  Roads: {}  |  Agents: {}  |  Roadblocks: {}  |  Seed: {}",
        scenario.nodes.len(),
        scenario.roads.len(),
        scenario.trips.len(),
        scenario.roadblocks.len(),
        config.seed,
    );
    println!();

    // 2. Build sim.
    let mut sim = scenario.into_sim()?;

    // 3. Set up output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer, &config));

    // 4. Run.
    let t0 = Instant::now();
    let summary = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        warn!(error = %e, "output error");
    }

    // 5. Summary.
    println!("Simulation complete in {:.3} s at {}", elapsed.as_secs_f64(), sim.clock);
    println!(
        "  finished {}  |  failed {}  |  still travelling {}  |  reports in flight {}",
        summary.finished, summary.failed, summary.active, summary.reports_pending
    );
    println!("  agent_snapshots.csv : {} rows", obs.snapshot_rows);
    println!("  tick_summaries.csv  : {} rows", obs.summary_rows);
    println!("  report_history.csv  : {} rows", obs.report_rows);
    println!("  agent_profiles.csv  : {} rows", sim.agents().len());
    println!();

    // 6. Roadblock table.
    println!("{:<10} {:<6} {:<9} {:<7}", "Edge", "Real", "Reported", "Count");
    println!("{}", "-".repeat(34));
    for block in sim.registry().read().roadblocks() {
        println!(
            "{:<10} {:<6} {:<9} {:<7}",
            block.edge.to_string(),
            if block.is_real { "yes" } else { "no" },
            if block.is_reported { "yes" } else { "no" },
            block.report_count,
        );
    }
    println!();

    // 7. Final agent table.
    println!("{:<7} {:<18} {:<10} {:<8}", "Agent", "State", "Navigation", "Node");
    println!("{}", "-".repeat(45));
    let first: Vec<_> = sim.agents().iter().map(Agent::snapshot).collect();
    for s in &first {
        println!(
            "{:<7} {:<18} {:<10} {:<8}",
            s.id.0,
            s.state.label(),
            s.navigation.label(),
            s.current.0,
        );
    }
    println!();

    // 8. Reset and replay.
    let cancelled = sim.reset(&mut NoopObserver)?;
    sim.run(&mut NoopObserver)?;
    let replay: Vec<_> = sim.agents().iter().map(Agent::snapshot).collect();
    println!(
        "Reset cancelled {cancelled} in-flight reports; replay {}",
        if replay == first { "matches the first run" } else { "DIFFERS from the first run" }
    );

    Ok(())
}
