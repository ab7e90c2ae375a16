//! Framework error type.
//!
//! Sub-crates define their own error enums and convert `CoreError` into them
//! via `From` impls.

use thiserror::Error;

use crate::{EdgeKey, NodeId};

/// Errors raised while validating core inputs (node references, clock
/// configuration).  All of them are configuration errors: nothing useful can
/// be computed once one is returned.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("edge {0} does not exist in the graph")]
    EdgeNotFound(EdgeKey),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `rb-core`.
pub type CoreResult<T> = Result<T, CoreError>;
