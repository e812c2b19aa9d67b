//! `pilot-telemetry` — telemetry writers for the autopilot loop.
//!
//! | File                | Columns                                          |
//! |---------------------|--------------------------------------------------|
//! | `status.csv`        | tick, vessel, state, reason, throttle, attitude  |
//! | `debug_vectors.csv` | tick, vessel, kind, x, y, z                      |
//! | `transitions.csv`   | tick, vessel, from, to                           |
//!
//! `attitude` is written as three space-separated components.  Status and
//! debug rows follow the loop's report interval; transitions are written on
//! every tick they happen.
//!
//! The backend implements [`TelemetryWriter`] and is driven by
//! [`TelemetryObserver`], which implements `pilot_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pilot_telemetry::{CsvTelemetryWriter, TelemetryObserver};
//!
//! let writer = CsvTelemetryWriter::new(Path::new("./telemetry"))?;
//! let mut obs = TelemetryObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("telemetry error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use self::csv::CsvTelemetryWriter;
pub use error::{TelemetryError, TelemetryResult};
pub use observer::TelemetryObserver;
pub use row::{DebugVectorRow, StatusRow, TransitionRow};
pub use writer::TelemetryWriter;
