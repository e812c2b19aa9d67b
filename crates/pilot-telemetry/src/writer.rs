//! The `TelemetryWriter` trait implemented by telemetry backends.

use crate::{DebugVectorRow, StatusRow, TelemetryResult, TransitionRow};

/// A sink for telemetry rows.
///
/// Errors are stored by [`TelemetryObserver`][crate::TelemetryObserver] and
/// retrieved with `take_error`, since observer hooks cannot fail.
pub trait TelemetryWriter {
    fn write_status(&mut self, rows: &[StatusRow]) -> TelemetryResult<()>;

    fn write_debug_vectors(&mut self, rows: &[DebugVectorRow]) -> TelemetryResult<()>;

    fn write_transition(&mut self, row: &TransitionRow) -> TelemetryResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> TelemetryResult<()>;
}
