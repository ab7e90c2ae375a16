//! `rb-agent`: the agent state machine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`agent`]     | `Agent`, `StepContext`, the per-tick `step`                |
//! | [`state`]     | `AgentState`, `Navigation`, `FailureCause`, `AgentSnapshot`|
//! | [`knowledge`] | `KnowledgeView`: known roadblocks, false reports, path     |
//! | [`history`]   | `NavEvent`, `NavReason`                                    |
//! | [`params`]    | `AgentParams`, `Trip`                                      |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                             |
//!
//! # Side effects
//!
//! An agent touches shared state in exactly two ways: edge occupancy through
//! `CongestionModel::move_agent`, and reports returned from
//! [`Agent::step`] as `ReportRequest`s for the driver to deliver.

pub mod agent;
pub mod error;
pub mod history;
pub mod knowledge;
pub mod params;
pub mod state;

#[cfg(test)]
mod tests;

pub use agent::{Agent, StepContext};
pub use error::{AgentError, AgentResult};
pub use history::{NavEvent, NavReason};
pub use knowledge::KnowledgeView;
pub use params::{AgentParams, Trip};
pub use state::{AgentSnapshot, AgentState, FailureCause, Navigation};
