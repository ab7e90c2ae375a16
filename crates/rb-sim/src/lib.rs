//! `rb-sim`: tick driver for the roadblock routing simulator.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   1. Agents:   each non-terminal agent steps in ascending AgentId order,
//!                reading congestion and a registry snapshot.
//!   2. Dispatch: zero-lag reports are applied at once; lagged ones go to
//!                the ReportScheduler.
//!   3. Delivery: the scheduler applies every report whose due tick has
//!                been reached.
//! ```
//!
//! `run` stops early once every agent has finished or failed and no report
//! is in flight.  `reset` cancels and awaits every in-flight report before
//! restoring the registry, occupancy, agents, and clock.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Generates agent profiles on Rayon's thread pool.       |
//! | `serde`    | Adds `Serialize`/`Deserialize` to `TickSummary`.       |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rb_core::SimConfig;
//! use rb_decision::GeneratorSettings;
//! use rb_sim::{NoopObserver, SimBuilder};
//! use rb_spatial::DijkstraRouter;
//!
//! let mut sim = SimBuilder::new(config, graph, DijkstraRouter)
//!     .trips(trips)
//!     .generated_profiles(GeneratorSettings::default())
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use sim::Sim;
