//! JSON scenario format and the built-in default scenario.
//!
//! Nodes are `[x, y]` pairs indexed from zero; roads, roadblocks, and trips
//! are `[a, b]` node-index pairs.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use rb_agent::{AgentParams, Trip};
use rb_core::{EdgeKey, NodeId, Point2, SimConfig};
use rb_decision::GeneratorSettings;
use rb_spatial::{CongestionModel, DijkstraRouter, RoadGraph, RoadGraphBuilder, StepRange, StepTable};
use rb_sim::{Sim, SimBuilder};

#[derive(Debug, Deserialize)]
pub struct StaticFactor {
    pub road: [u32; 2],
    pub factor: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CongestionSpec {
    pub static_factors: Vec<StaticFactor>,
    /// Occupancy → factor, `[lo, hi)`.
    pub occupancy_table: Vec<StepRange>,
    /// Factor → cost multiplier, `(lo, hi]`.
    pub cost_table: Vec<StepRange>,
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SimConfig,
    #[serde(default)]
    pub params: AgentParams,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub congestion: CongestionSpec,
    pub nodes: Vec<[f64; 2]>,
    pub roads: Vec<[u32; 2]>,
    #[serde(default)]
    pub roadblocks: Vec<[u32; 2]>,
    pub trips: Vec<[u32; 2]>,
}

/// A 6-node ring with two chords.  Two roadblocks sit on the fast chord
/// and on the ring next to the depot.
///
/// ```text
///   0 ──── 1 ──── 2
///   │ ╲           │
///   5 ──── 4 ──── 3
/// ```
pub const DEFAULT_SCENARIO: &str = r#"{
  "config": { "tick_duration_ms": 100, "total_ticks": 3000, "seed": 42, "output_interval_ticks": 10 },
  "params": { "detection_threshold": 15.0, "time_lag_enabled": true, "penalty_enabled": true },
  "generator": {
    "sequence_len": 500,
    "speed": { "mean": 4.0, "std_dev": 1.0 },
    "follow_navigation": { "mean": 0.85, "std_dev": 0.1 },
    "report_if_roadblock": { "mean": 0.7, "std_dev": 0.15 },
    "report_if_no_roadblock": { "mean": 0.05, "std_dev": 0.03 },
    "time_lag": { "enabled": true, "min_secs": 0.0, "max_secs": 3.0 },
    "report_penalty": { "enabled": true, "mean_secs": 1.0, "std_dev_secs": 0.5 }
  },
  "congestion": {
    "static_factors": [ { "road": [1, 2], "factor": 0.5 } ],
    "occupancy_table": [
      { "lo": 3.0, "hi": 6.0, "value": 0.8 },
      { "lo": 6.0, "hi": 1000.0, "value": 0.5 }
    ],
    "cost_table": [ { "lo": 0.0, "hi": 0.5, "value": 3.0 } ]
  },
  "nodes": [[0, 0], [200, 0], [400, 0], [400, 150], [200, 150], [0, 150]],
  "roads": [[0, 1], [1, 2], [2, 3], [3, 4], [4, 5], [5, 0], [1, 4], [0, 4]],
  "roadblocks": [[0, 4], [2, 3]],
  "trips": [[0, 3], [0, 3], [5, 2], [5, 2], [1, 3], [3, 0], [2, 5], [4, 0], [0, 2], [5, 3], [3, 5], [1, 5]]
}"#;

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn builtin() -> Result<Self> {
        serde_json::from_str(DEFAULT_SCENARIO).context("parsing built-in scenario")
    }

    pub fn build_graph(&self) -> Result<RoadGraph> {
        let mut b = RoadGraphBuilder::new();
        for &[x, y] in &self.nodes {
            b.add_node(Point2::new(x, y));
        }
        for &[a, c] in &self.roads {
            b.add_road(NodeId(a), NodeId(c))?;
        }
        Ok(b.build())
    }

    fn build_congestion(&self, graph: &RoadGraph) -> Result<CongestionModel> {
        let mut occupancy = StepTable::occupancy();
        for r in &self.congestion.occupancy_table {
            occupancy.push(r.lo, r.hi, r.value)?;
        }
        let mut cost = StepTable::cost();
        for r in &self.congestion.cost_table {
            cost.push(r.lo, r.hi, r.value)?;
        }
        let factors = self
            .congestion
            .static_factors
            .iter()
            .map(|s| (EdgeKey::new(NodeId(s.road[0]), NodeId(s.road[1])), s.factor));
        Ok(CongestionModel::new(graph, factors, occupancy, cost)?)
    }

    pub fn into_sim(self) -> Result<Sim<DijkstraRouter>> {
        let graph = self.build_graph()?;
        let congestion = self.build_congestion(&graph)?;
        let sim = SimBuilder::new(self.config, graph, DijkstraRouter)
            .trips(self.trips.iter().map(|&[a, b]| Trip::new(NodeId(a), NodeId(b))))
            .generated_profiles(self.generator)
            .congestion(congestion)
            .roadblocks(self.roadblocks.iter().map(|&[a, b]| EdgeKey::new(NodeId(a), NodeId(b))))
            .params(self.params)
            .build()?;
        Ok(sim)
    }
}
