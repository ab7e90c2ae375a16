//! Fluent builder for constructing a [`Sim`].

use rb_agent::{Agent, AgentParams, Trip};
use rb_core::{AgentId, EdgeKey, SimConfig};
use rb_decision::{AgentProfile, GeneratorSettings, ProfileGenerator};
use rb_report::{ReportScheduler, RoadblockRegistry};
use rb_spatial::{CongestionModel, RoadGraph, Router, SpatialError};
use tracing::info;

use crate::{Sim, SimError, SimResult};

/// Where agent profiles come from.
enum Profiles {
    Given(Vec<AgentProfile>),
    Generated(GeneratorSettings),
}

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, tick duration
/// - [`RoadGraph`]: from [`rb_spatial::RoadGraphBuilder`]
/// - `R: Router`: the routing algorithm (e.g. [`rb_spatial::DijkstraRouter`])
/// - trips, and either explicit profiles or generator settings
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                          |
/// |------------------------|----------------------------------|
/// | `.congestion(m)`       | `CongestionModel::free_flow()`   |
/// | `.roadblocks(edges)`   | none                             |
/// | `.params(p)`           | `AgentParams::default()`         |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, graph, DijkstraRouter)
///     .trips(trips)
///     .generated_profiles(GeneratorSettings::default())
///     .roadblocks([EdgeKey::new(NodeId(1), NodeId(2))])
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router> {
    config:     SimConfig,
    graph:      RoadGraph,
    router:     R,
    trips:      Vec<Trip>,
    profiles:   Option<Profiles>,
    congestion: Option<CongestionModel>,
    roadblocks: Vec<EdgeKey>,
    params:     AgentParams,
}

impl<R: Router> SimBuilder<R> {
    pub fn new(config: SimConfig, graph: RoadGraph, router: R) -> Self {
        Self {
            config,
            graph,
            router,
            trips:      Vec::new(),
            profiles:   None,
            congestion: None,
            roadblocks: Vec::new(),
            params:     AgentParams::default(),
        }
    }

    /// One trip per agent; agent ids follow the order given.
    pub fn trips(mut self, trips: impl IntoIterator<Item = Trip>) -> Self {
        self.trips = trips.into_iter().collect();
        self
    }

    /// Explicit per-agent profiles (must match the trip count).
    pub fn profiles(mut self, profiles: Vec<AgentProfile>) -> Self {
        self.profiles = Some(Profiles::Given(profiles));
        self
    }

    /// Sample one profile per trip from `settings`, seeded by `config.seed`.
    pub fn generated_profiles(mut self, settings: GeneratorSettings) -> Self {
        self.profiles = Some(Profiles::Generated(settings));
        self
    }

    /// Congestion inputs.  The model must have been built against the same
    /// graph.
    pub fn congestion(mut self, model: CongestionModel) -> Self {
        self.congestion = Some(model);
        self
    }

    /// Real roadblocks seeded into the registry.
    pub fn roadblocks(mut self, edges: impl IntoIterator<Item = EdgeKey>) -> Self {
        self.roadblocks = edges.into_iter().collect();
        self
    }

    pub fn params(mut self, params: AgentParams) -> Self {
        self.params = params;
        self
    }

    /// Validate inputs, place every agent at its start node, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;
        if !(self.params.detection_threshold >= 0.0) {
            return Err(SimError::Config(format!(
                "detection threshold must be non-negative, got {}",
                self.params.detection_threshold
            )));
        }

        for trip in &self.trips {
            for node in [trip.start, trip.end] {
                if !self.graph.contains(node) {
                    return Err(SpatialError::NodeNotFound(node).into());
                }
            }
        }

        let agent_count = self.trips.len();
        let profiles = match self.profiles {
            Some(Profiles::Given(p)) => {
                if p.len() != agent_count {
                    return Err(SimError::AgentCountMismatch {
                        expected: agent_count,
                        got:      p.len(),
                        what:     "agent profiles",
                    });
                }
                p
            }
            Some(Profiles::Generated(settings)) => {
                ProfileGenerator::new(settings, self.config.seed)?.generate(agent_count)?
            }
            None if agent_count == 0 => Vec::new(),
            None => return Err(SimError::Config("no agent profiles or generator settings supplied".into())),
        };

        let congestion = self.congestion.unwrap_or_else(CongestionModel::free_flow);
        let registry = RoadblockRegistry::for_graph(&self.graph, self.roadblocks)?.into_shared();
        let scheduler = ReportScheduler::new(registry.clone())?;

        let mut agents = Vec::with_capacity(agent_count);
        for (i, (trip, profile)) in self.trips.into_iter().zip(profiles).enumerate() {
            agents.push(Agent::new(
                AgentId(i as u32),
                trip,
                profile,
                self.params,
                &self.graph,
                &self.router,
                &congestion,
            )?);
        }

        info!(
            agents = agents.len(),
            nodes = self.graph.node_count(),
            roads = self.graph.edge_count(),
            roadblocks = registry.read().real_count(),
            "simulation built"
        );

        Ok(Sim {
            clock: self.config.make_clock(),
            config: self.config,
            graph: self.graph,
            router: self.router,
            congestion,
            registry,
            scheduler,
            agents,
        })
    }
}
