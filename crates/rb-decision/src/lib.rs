//! `rb-decision`: per-agent decision streams.
//!
//! Every stochastic choice an agent makes (follow the navigator, report a
//! roadblock, report a clear road, how long a report takes to land) is
//! pre-sampled into a finite sequence when the scenario is set up.  Agents
//! consume the sequences through cursors, so a run is fully determined by
//! its seed and replays identically after a reset.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`stream`]    | `Sequence<T>`, `DecisionStream`, `StreamKind`             |
//! | [`settings`]  | `GeneratorSettings`, `Distribution`, lag/penalty settings |
//! | [`generator`] | `ProfileGenerator`, `AgentProfile`                        |
//! | [`error`]     | `DecisionError`, `DecisionResult<T>`                      |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Generate profiles with Rayon.                            |
//! | `serde`    | Derives `Serialize`/`Deserialize` on settings.           |

pub mod error;
pub mod generator;
pub mod settings;
pub mod stream;

#[cfg(test)]
mod tests;

pub use error::{DecisionError, DecisionResult};
pub use generator::{AgentProbabilities, AgentProfile, ProfileGenerator};
pub use settings::{Distribution, GeneratorSettings, PenaltySettings, TimeLagSettings};
pub use stream::{DecisionStream, Sequence, StreamKind};
