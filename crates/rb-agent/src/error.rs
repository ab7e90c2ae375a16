//! Agent error type.  Every variant is a fatal configuration error; routing
//! misses are not errors (they become `AgentState::Failed`).

use thiserror::Error;

use rb_core::{AgentId, NodeId};
use rb_decision::DecisionError;
use rb_spatial::CongestionError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {agent}: node {node} not in graph")]
    UnknownNode { agent: AgentId, node: NodeId },

    #[error("agent {agent}: {source}")]
    Decision { agent: AgentId, #[source] source: DecisionError },

    #[error(transparent)]
    Congestion(#[from] CongestionError),
}

pub type AgentResult<T> = Result<T, AgentError>;
