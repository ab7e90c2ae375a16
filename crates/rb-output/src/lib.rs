//! `rb-output`: simulation output writers for the roadblock simulator.
//!
//! | Table                  | Written                        |
//! |------------------------|--------------------------------|
//! | `agent_snapshots.csv`  | every snapshot interval        |
//! | `tick_summaries.csv`   | every tick                     |
//! | `report_history.csv`   | per applied report             |
//! | `roadblocks.csv`       | once, at the end of the run    |
//! | `nav_history.csv`      | once, at the end of the run    |
//! | `agent_profiles.csv`   | once, at the end of the run    |
//!
//! [`CsvWriter`] implements [`OutputWriter`] and is driven by
//! [`SimOutputObserver`], which implements `rb_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rb_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run(&mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentProfileRow, AgentSnapshotRow, NavEventRow, ReportRow, RoadblockRow, TickSummaryRow};
pub use writer::OutputWriter;
