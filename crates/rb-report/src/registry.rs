//! Roadblock ground truth and the public report set.
//!
//! Real roadblocks are seeded once from the scenario.  A false report on a
//! clear edge lazily creates a *fake* entry, which never obstructs anyone
//! but is publicly reported like any other.  [`RoadblockRegistry::reset`]
//! drops every fake entry and count and re-seeds the real set.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use rb_core::{EdgeKey, Tick};
use rb_spatial::{EdgeSet, RoadGraph};

use crate::{ReportError, ReportEvent, ReportRequest, ReportResult};

/// Registry handle shared between the driver and report tasks.
pub type SharedRegistry = Arc<RwLock<RoadblockRegistry>>;

/// One registry entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roadblock {
    pub edge: EdgeKey,
    pub is_real: bool,
    /// Sticky once set.
    pub is_reported: bool,
    /// Never decreases within a run.
    pub report_count: u32,
}

impl Roadblock {
    fn new(edge: EdgeKey, is_real: bool) -> Self {
        Self { edge, is_real, is_reported: false, report_count: 0 }
    }
}

/// Real and fake roadblocks, the public report set, and the audit history.
#[derive(Clone, Debug, Default)]
pub struct RoadblockRegistry {
    seed: Vec<EdgeKey>,
    blocks: BTreeMap<EdgeKey, Roadblock>,
    public: EdgeSet,
    history: Vec<ReportEvent>,
}

impl RoadblockRegistry {
    /// Seed the registry with the scenario's real roadblocks.
    pub fn new(real: impl IntoIterator<Item = EdgeKey>) -> Self {
        let mut seed: Vec<EdgeKey> = real.into_iter().collect();
        seed.sort_unstable();
        seed.dedup();
        let mut reg = Self { seed, ..Self::default() };
        reg.reseed();
        reg
    }

    /// Like [`new`](Self::new), rejecting edges that are not roads of `graph`.
    pub fn for_graph(graph: &RoadGraph, real: impl IntoIterator<Item = EdgeKey>) -> ReportResult<Self> {
        let real: Vec<EdgeKey> = real.into_iter().collect();
        if let Some(&bad) = real.iter().find(|&&e| graph.edge_weight(e).is_none()) {
            return Err(ReportError::UnknownEdge(bad));
        }
        Ok(Self::new(real))
    }

    /// Wrap in the shared handle used by the scheduler.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    fn reseed(&mut self) {
        self.blocks = self.seed.iter().map(|&e| (e, Roadblock::new(e, true))).collect();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` if `edge` is physically obstructed.
    #[inline]
    pub fn is_real_roadblock(&self, edge: EdgeKey) -> bool {
        self.blocks.get(&edge).is_some_and(|r| r.is_real)
    }

    /// `true` if `edge` has been publicly reported (real or fake).
    #[inline]
    pub fn is_reported(&self, edge: EdgeKey) -> bool {
        self.public.contains(&edge)
    }

    pub fn report_count(&self, edge: EdgeKey) -> u32 {
        self.blocks.get(&edge).map_or(0, |r| r.report_count)
    }

    pub fn get(&self, edge: EdgeKey) -> Option<&Roadblock> {
        self.blocks.get(&edge)
    }

    /// Publicly reported edges, avoided by system-aware routing.
    pub fn public_edges(&self) -> &EdgeSet {
        &self.public
    }

    /// Every entry, real and fake, in edge order.
    pub fn roadblocks(&self) -> impl Iterator<Item = &Roadblock> {
        self.blocks.values()
    }

    pub fn real_count(&self) -> usize {
        self.blocks.values().filter(|r| r.is_real).count()
    }

    pub fn fake_count(&self) -> usize {
        self.blocks.values().filter(|r| !r.is_real).count()
    }

    /// Every applied report, in application order.
    pub fn history(&self) -> &[ReportEvent] {
        &self.history
    }

    /// Ticks at which `edge` was reported.
    pub fn times_reported(&self, edge: EdgeKey) -> Vec<Tick> {
        self.history.iter().filter(|e| e.edge == edge).map(|e| e.applied).collect()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Apply one report: bump the count, mark the edge reported, publish it,
    /// and record the audit event.
    pub fn apply_report(&mut self, request: &ReportRequest, applied: Tick) -> ReportEvent {
        let edge = request.edge;
        let entry = self.blocks.entry(edge).or_insert_with(|| {
            debug!(edge = %edge, "creating fake roadblock");
            Roadblock::new(edge, false)
        });
        entry.report_count += 1;
        entry.is_reported = true;
        self.public.insert(edge);

        let event = ReportEvent {
            reporter: request.reporter,
            edge,
            is_real: entry.is_real,
            submitted: request.submitted,
            applied,
            lag_secs: request.lag_secs,
            report_count: entry.report_count,
        };
        info!(
            agent = %request.reporter,
            edge = %edge,
            real = event.is_real,
            count = event.report_count,
            "report applied"
        );
        self.history.push(event);
        event
    }

    /// Drop fake entries, counts, public reports, and history; re-seed the
    /// real set.
    pub fn reset(&mut self) {
        self.public.clear();
        self.history.clear();
        self.reseed();
    }
}
