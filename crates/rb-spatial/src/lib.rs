//! `rb-spatial`: road graph, congestion, and constrained routing.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`network`]    | `RoadGraph` (undirected CSR), `RoadGraphBuilder`          |
//! | [`congestion`] | `CongestionModel`, `StepTable`, live edge occupancy       |
//! | [`router`]     | `Router` trait, `RouteQuery`, `Route`, `DijkstraRouter`   |
//! | [`error`]      | `SpatialError`, `CongestionError`, result aliases         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on step tables.            |

pub mod congestion;
pub mod error;
pub mod network;
pub mod router;

#[cfg(test)]
mod tests;

pub use congestion::{Bound, CongestionModel, StepRange, StepTable};
pub use error::{CongestionError, CongestionResult, SpatialError, SpatialResult};
pub use network::{RoadGraph, RoadGraphBuilder};
pub use router::{DijkstraRouter, EdgeSet, Route, RouteQuery, Router};
