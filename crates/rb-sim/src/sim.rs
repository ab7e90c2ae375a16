//! The `Sim` struct and its tick loop.

use rb_agent::{Agent, AgentState, StepContext};
use rb_core::{AgentId, SimClock, SimConfig, Tick};
use rb_report::{ReportEvent, ReportScheduler, SharedRegistry};
use rb_spatial::{CongestionModel, RoadGraph, Router};
use tracing::{debug, info};

use crate::{SimObserver, SimResult, TickSummary};

/// The main simulation runner.
///
/// Each tick:
///
/// 1. **Agents**: every non-terminal agent steps in ascending `AgentId`
///    order against a read snapshot of the registry.
/// 2. **Dispatch**: each report an agent returns is applied at once when its
///    lag rounds to zero ticks, otherwise handed to the scheduler.  A
///    zero-lag report is visible to agents later in the same tick.
/// 3. **Delivery**: the scheduler applies every delayed report now due.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router> {
    pub config: SimConfig,

    /// Tracks the current tick and converts seconds to ticks.
    pub clock: SimClock,

    pub graph: RoadGraph,

    pub router: R,

    /// Static factors, step tables, and live edge occupancy.
    pub congestion: CongestionModel,

    pub(crate) registry: SharedRegistry,
    pub(crate) scheduler: ReportScheduler,
    pub(crate) agents: Vec<Agent>,
}

impl<R: Router> Sim<R> {
    // ── Accessors ─────────────────────────────────────────────────────────

    /// Agents indexed by `AgentId`.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn pending_reports(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Counts for the current state, with no reports attributed to a tick.
    pub fn summary(&self) -> TickSummary {
        let mut summary = TickSummary {
            tick: self.clock.current_tick,
            reports_pending: self.scheduler.pending_count(),
            ..TickSummary::default()
        };
        for agent in &self.agents {
            match agent.state() {
                AgentState::Finished => summary.finished += 1,
                AgentState::Failed(_) => summary.failed += 1,
                _ => summary.active += 1,
            }
        }
        summary
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until `config.end_tick()`, or earlier once every agent has
    /// terminated and no report is in flight.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let mut summary = self.summary();
        while self.clock.current_tick < self.config.end_tick() {
            summary = self.step(observer)?;
            if summary.is_settled() {
                info!(tick = %summary.tick, finished = summary.finished, failed = summary.failed, "all agents done");
                break;
            }
        }
        observer.on_sim_end(self.clock.current_tick, &self.agents, &self.registry.read());
        Ok(summary)
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<TickSummary> {
        let mut summary = self.summary();
        for _ in 0..n {
            summary = self.step(observer)?;
        }
        Ok(summary)
    }

    /// Process the current tick, then advance the clock.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let applied = self.process_tick(now)?;
        for event in &applied {
            observer.on_report(event);
        }

        let summary = TickSummary { tick: now, reports_applied: applied.len(), ..self.summary() };
        debug!(
            tick = %now,
            active = summary.active,
            reports = summary.reports_applied,
            pending = summary.reports_pending,
            "tick done"
        );
        observer.on_tick_end(now, &summary);
        let interval = self.config.output_interval_ticks;
        if interval > 0 && now.0.is_multiple_of(interval) {
            observer.on_snapshot(now, &self.agents);
        }

        self.clock.advance();
        Ok(summary)
    }

    /// Cancel and await every in-flight report, then restore the registry,
    /// occupancy, agents, and clock to their initial state.  Returns how
    /// many reports were cancelled.
    pub fn reset<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<usize> {
        let cancelled = self.scheduler.reset();
        self.registry.write().reset();
        self.congestion.reset_occupancy();
        for agent in &mut self.agents {
            agent.reset(&self.graph, &self.router, &self.congestion)?;
        }
        self.clock.reset();
        info!(cancelled, agents = self.agents.len(), "simulation reset");
        observer.on_reset(cancelled);
        Ok(cancelled)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> SimResult<Vec<ReportEvent>> {
        let mut applied = Vec::new();

        for agent in &mut self.agents {
            if agent.is_terminal() {
                continue;
            }
            // Read lock released before any report is dispatched.
            let requests = {
                let registry = self.registry.read();
                let ctx = StepContext {
                    clock: &self.clock,
                    graph: &self.graph,
                    router: &self.router,
                    registry: &registry,
                };
                agent.step(&ctx, &mut self.congestion)?
            };
            for request in requests {
                applied.extend(self.scheduler.dispatch(request, &self.clock));
            }
        }

        applied.extend(self.scheduler.advance(now)?);
        Ok(applied)
    }
}
