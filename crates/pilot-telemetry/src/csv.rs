//! CSV telemetry backend.
//!
//! Creates three files in the configured output directory:
//! - `status.csv`
//! - `debug_vectors.csv`
//! - `transitions.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::TelemetryWriter;
use crate::{DebugVectorRow, StatusRow, TelemetryResult, TransitionRow};

pub const STATUS_HEADER: [&str; 6] = ["tick", "vessel", "state", "reason", "throttle", "attitude"];
pub const DEBUG_HEADER: [&str; 6] = ["tick", "vessel", "kind", "x", "y", "z"];
pub const TRANSITION_HEADER: [&str; 4] = ["tick", "vessel", "from", "to"];

/// Writes telemetry to CSV files.
pub struct CsvTelemetryWriter {
    status:      Writer<File>,
    debug:       Writer<File>,
    transitions: Writer<File>,
    finished:    bool,
}

impl CsvTelemetryWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> TelemetryResult<Self> {
        let mut status = Writer::from_path(dir.join("status.csv"))?;
        status.write_record(STATUS_HEADER)?;

        let mut debug = Writer::from_path(dir.join("debug_vectors.csv"))?;
        debug.write_record(DEBUG_HEADER)?;

        let mut transitions = Writer::from_path(dir.join("transitions.csv"))?;
        transitions.write_record(TRANSITION_HEADER)?;

        Ok(Self { status, debug, transitions, finished: false })
    }
}

impl TelemetryWriter for CsvTelemetryWriter {
    fn write_status(&mut self, rows: &[StatusRow]) -> TelemetryResult<()> {
        for row in rows {
            let a = row.attitude;
            self.status.write_record(&[
                row.tick.to_string(),
                row.vessel.to_string(),
                row.state.to_owned(),
                row.reason.clone(),
                format!("{:.3}", row.throttle),
                format!("{:.4} {:.4} {:.4}", a.x, a.y, a.z),
            ])?;
        }
        Ok(())
    }

    fn write_debug_vectors(&mut self, rows: &[DebugVectorRow]) -> TelemetryResult<()> {
        for row in rows {
            self.debug.write_record(&[
                row.tick.to_string(),
                row.vessel.to_string(),
                row.kind.to_owned(),
                row.value.x.to_string(),
                row.value.y.to_string(),
                row.value.z.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_transition(&mut self, row: &TransitionRow) -> TelemetryResult<()> {
        self.transitions.write_record(&[
            row.tick.to_string(),
            row.vessel.to_string(),
            row.from.to_owned(),
            row.to.to_owned(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> TelemetryResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.status.flush()?;
        self.debug.flush()?;
        self.transitions.flush()?;
        Ok(())
    }
}
