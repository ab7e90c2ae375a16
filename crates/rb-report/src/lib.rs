//! `rb-report`: roadblock ground truth, public reports, and delayed
//! report delivery.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`registry`]  | `RoadblockRegistry`, `Roadblock`, `SharedRegistry`         |
//! | [`request`]   | `ReportRequest`, `ReportEvent` (audit record)              |
//! | [`scheduler`] | `ReportScheduler`: tick-gated, cancellable report tasks    |
//! | [`error`]     | `ReportError`, `ReportResult<T>`                           |
//!
//! # Concurrency
//!
//! The registry is shared as `Arc<parking_lot::RwLock<_>>`.  Every report is
//! applied in a single write-locked critical section, so two reports on the
//! same edge always both count.  Delayed reports are tokio tasks on the
//! scheduler's own current-thread runtime; they only make progress while
//! [`ReportScheduler::advance`] or [`ReportScheduler::cancel_all`] drive it,
//! which keeps runs reproducible.

pub mod error;
pub mod registry;
pub mod request;
pub mod scheduler;


pub use error::{ReportError, ReportResult};
pub use registry::{Roadblock, RoadblockRegistry, SharedRegistry};
pub use request::{ReportEvent, ReportRequest};
pub use scheduler::ReportScheduler;
