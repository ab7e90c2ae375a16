//! Edge congestion: static factors, live occupancy, and the two step tables
//! that turn them into routing cost and travel speed.
//!
//! # Model
//!
//! ```text
//! combined  = static_factor(edge) × occupancy_factor(occupancy(edge))
//! cost_mult = cost_table.lookup(combined)  or  1 / combined
//! speed_mult = min(combined, 1)
//! ```
//!
//! A factor of `1.0` means free flow; smaller values mean heavier
//! congestion.  The occupancy table uses lower-inclusive ranges `[lo, hi)`,
//! the cost table upper-inclusive ranges `(lo, hi]`.
//!
//! Occupancy is mutated only through [`CongestionModel::move_agent`], which
//! validates the whole move before touching the table.

use rustc_hash::FxHashMap;
use tracing::debug;

use rb_core::EdgeKey;

use crate::{CongestionError, CongestionResult, RoadGraph};

/// Combined factors are never allowed below this (avoids infinite costs).
pub const MIN_FACTOR: f64 = 1e-5;

// ── StepTable ─────────────────────────────────────────────────────────────────

/// Which end of a step range is inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound {
    /// `[lo, hi)`
    LowerInclusive,
    /// `(lo, hi]`
    UpperInclusive,
}

/// One step of a piecewise-constant table.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepRange {
    pub lo: f64,
    pub hi: f64,
    pub value: f64,
}

/// Piecewise-constant lookup table.  The first matching range wins.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepTable {
    bound: Bound,
    ranges: Vec<StepRange>,
}

impl StepTable {
    /// Empty occupancy table (`[lo, hi)` ranges, `lo > 0`).
    pub fn occupancy() -> Self {
        Self { bound: Bound::LowerInclusive, ranges: Vec::new() }
    }

    /// Empty cost-multiplier table (`(lo, hi]` ranges, `lo >= 0`).
    pub fn cost() -> Self {
        Self { bound: Bound::UpperInclusive, ranges: Vec::new() }
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn ranges(&self) -> &[StepRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Append a range after validating it.
    pub fn with_range(mut self, lo: f64, hi: f64, value: f64) -> CongestionResult<Self> {
        self.push(lo, hi, value)?;
        Ok(self)
    }

    /// Append a range after validating it.
    pub fn push(&mut self, lo: f64, hi: f64, value: f64) -> CongestionResult<()> {
        let range = StepRange { lo, hi, value };
        self.check(&range)?;
        self.ranges.push(range);
        Ok(())
    }

    /// Validate every range (used after deserializing a table).
    pub fn validate(&self) -> CongestionResult<()> {
        self.ranges.iter().try_for_each(|r| self.check(r))
    }

    fn check(&self, r: &StepRange) -> CongestionResult<()> {
        let bad = |reason| Err(CongestionError::InvalidRange { lo: r.lo, hi: r.hi, reason });
        if r.lo.is_nan() || r.hi.is_nan() {
            return bad("bounds must be numbers");
        }
        if r.lo > r.hi {
            return bad("lower bound exceeds upper bound");
        }
        match self.bound {
            Bound::LowerInclusive if r.lo <= 0.0 => return bad("occupancy lower bound must be positive"),
            Bound::UpperInclusive if r.lo < 0.0 => return bad("factor lower bound must be non-negative"),
            _ => {}
        }
        if !(r.value > 0.0) || !r.value.is_finite() {
            return Err(CongestionError::InvalidStepValue(r.value));
        }
        Ok(())
    }

    /// Value of the first range containing `x`, if any.
    pub fn lookup(&self, x: f64) -> Option<f64> {
        self.ranges
            .iter()
            .find(|r| match self.bound {
                Bound::LowerInclusive => r.lo <= x && x < r.hi,
                Bound::UpperInclusive => r.lo < x && x <= r.hi,
            })
            .map(|r| r.value)
    }
}

// ── CongestionModel ───────────────────────────────────────────────────────────

/// Static and dynamic congestion for every edge of a [`RoadGraph`].
#[derive(Clone, Debug)]
pub struct CongestionModel {
    static_factor: FxHashMap<EdgeKey, f64>,
    occupancy_table: StepTable,
    cost_table: StepTable,
    occupancy: FxHashMap<EdgeKey, u32>,
}

impl Default for CongestionModel {
    fn default() -> Self {
        Self::free_flow()
    }
}

impl CongestionModel {
    /// No static congestion, no tables: every multiplier is `1.0`.
    pub fn free_flow() -> Self {
        Self {
            static_factor:   FxHashMap::default(),
            occupancy_table: StepTable::occupancy(),
            cost_table:      StepTable::cost(),
            occupancy:       FxHashMap::default(),
        }
    }

    /// Build a model from configuration, validating every input against
    /// `graph`.
    pub fn new(
        graph: &RoadGraph,
        static_factors: impl IntoIterator<Item = (EdgeKey, f64)>,
        occupancy_table: StepTable,
        cost_table: StepTable,
    ) -> CongestionResult<Self> {
        occupancy_table.validate()?;
        cost_table.validate()?;
        let mut model = Self { occupancy_table, cost_table, ..Self::free_flow() };
        for (edge, factor) in static_factors {
            model.set_static_factor(graph, edge, factor)?;
        }
        Ok(model)
    }

    /// Set the static factor of one edge.  `factor` must be in `(0, 1]`.
    pub fn set_static_factor(&mut self, graph: &RoadGraph, edge: EdgeKey, factor: f64) -> CongestionResult<()> {
        if graph.edge_weight(edge).is_none() {
            return Err(CongestionError::UnknownEdge(edge));
        }
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(CongestionError::InvalidFactor { edge, factor });
        }
        self.static_factor.insert(edge, factor);
        Ok(())
    }

    pub fn occupancy_table(&self) -> &StepTable {
        &self.occupancy_table
    }

    pub fn cost_table(&self) -> &StepTable {
        &self.cost_table
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Configured static factor (1.0 when unset).
    #[inline]
    pub fn static_factor(&self, edge: EdgeKey) -> f64 {
        self.static_factor.get(&edge).copied().unwrap_or(1.0)
    }

    /// Agents currently traversing `edge`.
    #[inline]
    pub fn occupancy(&self, edge: EdgeKey) -> u32 {
        self.occupancy.get(&edge).copied().unwrap_or(0)
    }

    /// Sum of occupancy over all edges.
    pub fn total_occupancy(&self) -> u64 {
        self.occupancy.values().map(|&n| n as u64).sum()
    }

    /// Occupancy-table factor for the current count (1.0 when no range
    /// matches).
    pub fn occupancy_factor(&self, edge: EdgeKey) -> f64 {
        self.occupancy_table.lookup(self.occupancy(edge) as f64).unwrap_or(1.0)
    }

    /// Static factor × occupancy factor, clamped to `[MIN_FACTOR, 1]`.
    pub fn combined_factor(&self, edge: EdgeKey) -> f64 {
        (self.static_factor(edge) * self.occupancy_factor(edge)).clamp(MIN_FACTOR, 1.0)
    }

    /// Routing cost multiplier applied to the base weight.
    pub fn cost_multiplier(&self, edge: EdgeKey) -> f64 {
        let combined = self.combined_factor(edge);
        self.cost_table.lookup(combined).unwrap_or(1.0 / combined)
    }

    /// Travel speed multiplier; congestion never speeds an agent up.
    pub fn speed_multiplier(&self, edge: EdgeKey) -> f64 {
        self.combined_factor(edge).min(1.0)
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Move one agent from `prev` to `next`: decrement the former, increment
    /// the latter.  Either side may be `None` (entering or leaving the road
    /// network).  Nothing changes if the decrement would underflow.
    pub fn move_agent(&mut self, prev: Option<EdgeKey>, next: Option<EdgeKey>) -> CongestionResult<()> {
        if prev == next {
            return Ok(());
        }
        if let Some(edge) = prev {
            if self.occupancy(edge) == 0 {
                return Err(CongestionError::OccupancyUnderflow(edge));
            }
        }
        if let Some(edge) = prev {
            if let Some(n) = self.occupancy.get_mut(&edge) {
                *n -= 1;
                if *n == 0 {
                    self.occupancy.remove(&edge);
                }
            }
        }
        if let Some(edge) = next {
            *self.occupancy.entry(edge).or_insert(0) += 1;
        }
        Ok(())
    }

    /// Zero the live occupancy table.
    pub fn reset_occupancy(&mut self) {
        debug!(edges = self.occupancy.len(), "clearing edge occupancy");
        self.occupancy.clear();
    }
}
