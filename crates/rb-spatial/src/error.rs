//! Spatial-subsystem error types.

use thiserror::Error;

use rb_core::{EdgeKey, NodeId};

/// Errors produced while building or querying a [`RoadGraph`](crate::RoadGraph).
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found in graph")]
    EdgeNotFound(EdgeKey),

    #[error("edge {0} added twice")]
    DuplicateEdge(EdgeKey),

    #[error("self-loop on node {0}")]
    SelfLoop(NodeId),

    #[error("edge {edge} has invalid weight {weight}")]
    InvalidWeight { edge: EdgeKey, weight: f64 },
}

pub type SpatialResult<T> = Result<T, SpatialError>;

/// Errors produced by the [`CongestionModel`](crate::CongestionModel).
///
/// Every variant is a configuration error: the run cannot continue.
#[derive(Debug, Error)]
pub enum CongestionError {
    #[error("congestion factor {factor} on edge {edge} is outside (0, 1]")]
    InvalidFactor { edge: EdgeKey, factor: f64 },

    #[error("congestion configured for unknown edge {0}")]
    UnknownEdge(EdgeKey),

    #[error("malformed step range ({lo}, {hi}): {reason}")]
    InvalidRange { lo: f64, hi: f64, reason: &'static str },

    #[error("step value {0} must be positive and finite")]
    InvalidStepValue(f64),

    #[error("occupancy underflow on edge {0}")]
    OccupancyUnderflow(EdgeKey),
}

pub type CongestionResult<T> = Result<T, CongestionError>;
