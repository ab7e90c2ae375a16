//! `rb-core`: foundational types for the roadblock routing simulator.
//!
//! This crate is a dependency of every other `rb-*` crate.  It has no `rb-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `EdgeKey`                        |
//! | [`geo`]         | `Point2`, planar distance, heading                    |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `AgentRng` (per-agent deterministic RNG)              |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::Point2;
pub use ids::{AgentId, EdgeKey, NodeId};
pub use rng::AgentRng;
pub use time::{SimClock, SimConfig, Tick};
