//! `TelemetryObserver<W>` — bridges `SimObserver` to a `TelemetryWriter`.

use pilot_agent::BehaviorState;
use pilot_behavior::TickReport;
use pilot_core::{Tick, VesselId};
use pilot_sim::SimObserver;

use crate::writer::TelemetryWriter;
use crate::{DebugVectorRow, StatusRow, TelemetryError, TelemetryResult, TransitionRow};

/// A [`SimObserver`] that records every reported status, debug vector and
/// behavior transition to a [`TelemetryWriter`].
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct TelemetryObserver<W: TelemetryWriter> {
    writer:      W,
    /// Record debug vectors as well as status rows.
    with_debug:  bool,
    last_error:  Option<TelemetryError>,
}

impl<W: TelemetryWriter> TelemetryObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, with_debug: true, last_error: None }
    }

    /// Skip `debug_vectors.csv` rows; useful for long runs.
    pub fn without_debug_vectors(mut self) -> Self {
        self.with_debug = false;
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<TelemetryError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: TelemetryResult<()>) {
        // Keep only the first error.
        if let Err(e) = result
            && self.last_error.is_none()
        {
            self.last_error = Some(e);
        }
    }
}

impl<W: TelemetryWriter> SimObserver for TelemetryObserver<W> {
    fn on_behavior_change(&mut self, tick: Tick, vessel: VesselId, from: BehaviorState, to: BehaviorState) {
        let row = TransitionRow { tick: tick.0, vessel: vessel.0, from: from.as_str(), to: to.as_str() };
        let result = self.writer.write_transition(&row);
        self.store_err(result);
    }

    fn on_reports(&mut self, tick: Tick, reports: &[TickReport]) {
        if reports.is_empty() {
            return;
        }
        let rows: Vec<StatusRow> = reports.iter().map(|r| StatusRow::from_report(tick, r)).collect();
        let result = self.writer.write_status(&rows);
        self.store_err(result);

        if self.with_debug {
            let vectors: Vec<DebugVectorRow> = reports
                .iter()
                .flat_map(|r| r.debug.iter().map(move |v| DebugVectorRow::new(tick, r.vessel.0, v)))
                .collect();
            if !vectors.is_empty() {
                let result = self.writer.write_debug_vectors(&vectors);
                self.store_err(result);
            }
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
