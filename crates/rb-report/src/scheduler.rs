//! Tick-gated, cancellable delivery of delayed reports.
//!
//! # Lifecycle of a delayed report
//!
//! ```text
//! submit(req, due)  →  task spawned, waits on the tick watch channel
//! advance(now)      →  tick published; every task with due <= now is run
//!                      to completion (one registry write each)
//! cancel_all()      →  every outstanding task aborted and awaited
//! ```
//!
//! The scheduler owns a current-thread tokio runtime.  Tasks only run inside
//! `advance` / `cancel_all`, so a run is deterministic and the driver never
//! blocks on a report that is not yet due.  Because the runtime is owned,
//! the scheduler must be used from synchronous code, not from inside another
//! tokio runtime.

use tokio::runtime::{Builder, Runtime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use rb_core::{SimClock, Tick};

use crate::{ReportError, ReportEvent, ReportRequest, ReportResult, SharedRegistry};

struct PendingReport {
    due: Tick,
    request: ReportRequest,
    handle: JoinHandle<Option<ReportEvent>>,
}

/// Owner of every in-flight delayed report.
pub struct ReportScheduler {
    runtime: Runtime,
    registry: SharedRegistry,
    tick_tx: watch::Sender<Tick>,
    pending: Vec<PendingReport>,
}

impl ReportScheduler {
    pub fn new(registry: SharedRegistry) -> ReportResult<Self> {
        let runtime = Builder::new_current_thread().build()?;
        let (tick_tx, _) = watch::channel(Tick::ZERO);
        Ok(Self { runtime, registry, tick_tx, pending: Vec::new() })
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Number of reports not yet applied or cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due ticks of the outstanding reports, in submission order.
    pub fn pending_due(&self) -> Vec<Tick> {
        self.pending.iter().map(|p| p.due).collect()
    }

    /// Route a request by its lag: zero-tick lags are applied now and the
    /// event returned; anything longer is scheduled.
    pub fn dispatch(&mut self, request: ReportRequest, clock: &SimClock) -> Option<ReportEvent> {
        let lag_ticks = clock.ticks_for_secs(request.lag_secs);
        let now = clock.current_tick;
        if lag_ticks == 0 {
            Some(self.registry.write().apply_report(&request, now))
        } else {
            self.submit(request, now + lag_ticks);
            None
        }
    }

    /// Schedule `request` to be applied at `due`.
    pub fn submit(&mut self, request: ReportRequest, due: Tick) {
        let registry = self.registry.clone();
        let mut tick_rx = self.tick_tx.subscribe();

        let handle = self.runtime.spawn(async move {
            loop {
                let now = *tick_rx.borrow_and_update();
                if now >= due {
                    return Some(registry.write().apply_report(&request, now));
                }
                if tick_rx.changed().await.is_err() {
                    // Scheduler dropped before the report landed.
                    return None;
                }
            }
        });

        info!(
            agent = %request.reporter,
            edge = %request.edge,
            due = %due,
            "report scheduled"
        );
        self.pending.push(PendingReport { due, request, handle });
    }

    /// Publish `now` and run every report due at or before it.  Returns the
    /// applied events in submission order.
    pub fn advance(&mut self, now: Tick) -> ReportResult<Vec<ReportEvent>> {
        self.tick_tx.send_replace(now);
        if self.pending.iter().all(|p| p.due > now) {
            return Ok(Vec::new());
        }

        let (due, waiting): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;
        debug!(tick = %now, due = due.len(), waiting = self.pending.len(), "delivering reports");

        self.runtime.block_on(async {
            let mut applied = Vec::with_capacity(due.len());
            for p in due {
                match p.handle.await {
                    Ok(Some(event)) => applied.push(event),
                    Ok(None) => {}
                    Err(e) => return Err(ReportError::TaskFailed(e.to_string())),
                }
            }
            Ok(applied)
        })
    }

    /// Abort every outstanding report and wait for each task to finish.
    /// Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let pending: Vec<PendingReport> = self.pending.drain(..).collect();
        if pending.is_empty() {
            return 0;
        }
        for p in &pending {
            p.handle.abort();
        }
        let cancelled = self.runtime.block_on(async {
            let mut cancelled = 0;
            for p in pending {
                match p.handle.await {
                    Err(e) if e.is_cancelled() => {
                        warn!(agent = %p.request.reporter, edge = %p.request.edge, "report cancelled");
                        cancelled += 1;
                    }
                    _ => {}
                }
            }
            cancelled
        });
        info!(cancelled, "pending reports cancelled");
        cancelled
    }

    /// Cancel everything and rewind the published tick to zero.
    pub fn reset(&mut self) -> usize {
        let cancelled = self.cancel_all();
        self.tick_tx.send_replace(Tick::ZERO);
        cancelled
    }
}

impl Drop for ReportScheduler {
    fn drop(&mut self) {
        for p in &self.pending {
            p.handle.abort();
        }
    }
}
