//! Decision-subsystem error type.

use thiserror::Error;

use crate::StreamKind;

/// Errors produced by `rb-decision`.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// A cursor ran past the end of its sequence.  The scenario needs a
    /// longer `sequence_len`.
    #[error("{kind} sequence exhausted after {len} draws")]
    Exhausted { kind: StreamKind, len: usize },

    #[error("invalid generator settings: {0}")]
    InvalidSettings(String),
}

pub type DecisionResult<T> = Result<T, DecisionError>;
