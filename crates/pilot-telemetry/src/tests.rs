//! Integration tests for pilot-telemetry.

#[cfg(test)]
mod csv_tests {
    use pilot_core::Vec3;
    use tempfile::TempDir;

    use crate::csv::CsvTelemetryWriter;
    use crate::row::{DebugVectorRow, StatusRow, TransitionRow};
    use crate::writer::TelemetryWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn status_row(vessel: u32, tick: u64) -> StatusRow {
        StatusRow {
            tick,
            vessel,
            state:    "firing",
            reason:   "Firing Guns, Gun Range".into(),
            throttle: 0.25,
            attitude: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    fn read_all(path: std::path::PathBuf) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvTelemetryWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("status.csv").exists());
        assert!(dir.path().join("debug_vectors.csv").exists());
        assert!(dir.path().join("transitions.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvTelemetryWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (status, _) = read_all(dir.path().join("status.csv"));
        assert_eq!(status, ["tick", "vessel", "state", "reason", "throttle", "attitude"]);
        let (debug, _) = read_all(dir.path().join("debug_vectors.csv"));
        assert_eq!(debug, ["tick", "vessel", "kind", "x", "y", "z"]);
        let (transitions, _) = read_all(dir.path().join("transitions.csv"));
        assert_eq!(transitions, ["tick", "vessel", "from", "to"]);
    }

    #[test]
    fn status_rows_written() {
        let dir = tmp();
        let mut w = CsvTelemetryWriter::new(dir.path()).unwrap();
        w.write_status(&[status_row(3, 7), status_row(4, 7)]).unwrap();
        w.finish().unwrap();

        let (_, rows) = read_all(dir.path().join("status.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "7");
        assert_eq!(&rows[0][1], "3");
        assert_eq!(&rows[0][2], "firing");
        // The comma in the reason is quoted, not split.
        assert_eq!(&rows[0][3], "Firing Guns, Gun Range");
        assert_eq!(&rows[0][4], "0.250");
        assert_eq!(&rows[0][5], "0.0000 0.0000 1.0000");
        assert_eq!(&rows[1][1], "4");
    }

    #[test]
    fn debug_and_transition_rows_written() {
        let dir = tmp();
        let mut w = CsvTelemetryWriter::new(dir.path()).unwrap();
        w.write_debug_vectors(&[DebugVectorRow {
            tick:   2,
            vessel: 1,
            kind:   "aim_point",
            value:  Vec3::new(1.5, -2.0, 0.0),
        }])
        .unwrap();
        w.write_transition(&TransitionRow { tick: 2, vessel: 1, from: "idle", to: "firing" }).unwrap();
        w.finish().unwrap();

        let (_, debug) = read_all(dir.path().join("debug_vectors.csv"));
        assert_eq!(debug.len(), 1);
        assert_eq!(&debug[0][2], "aim_point");
        assert_eq!(&debug[0][3], "1.5");
        assert_eq!(&debug[0][4], "-2");

        let (_, transitions) = read_all(dir.path().join("transitions.csv"));
        assert_eq!(transitions.len(), 1);
        assert_eq!(&transitions[0][2], "idle");
        assert_eq!(&transitions[0][3], "firing");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvTelemetryWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        let result = CsvTelemetryWriter::new(&dir.path().join("does/not/exist"));
        assert!(result.is_err());
    }
}

// ── Observer wired to the loop ────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use pilot_agent::{Agent, BehaviorState, TrafficStore};
    use pilot_behavior::{
        ActuatorCommand, ControlContext, DebugKind, DebugVector, OrbitalCommand, Pilot, Status, TickReport,
    };
    use pilot_core::{Diagnostics, LoopConfig, Tick, Vec3, VesselId};
    use pilot_sim::{SimBuilder, SimResult, VesselInputs, WorldView};
    use tempfile::TempDir;

    use crate::row::{DebugVectorRow, StatusRow, TransitionRow};
    use crate::{CsvTelemetryWriter, TelemetryObserver, TelemetryResult, TelemetryWriter};

    struct StillWorld {
        traffic: TrafficStore,
    }

    impl WorldView for StillWorld {
        fn inputs(&self, vessel: VesselId, _tick: Tick) -> Option<VesselInputs> {
            Some(VesselInputs::new(Agent { id: vessel, ..Agent::default() }))
        }

        fn traffic(&self) -> &TrafficStore {
            &self.traffic
        }

        fn apply(&mut self, _report: &TickReport, _behavior: BehaviorState) {}

        fn advance(&mut self, _tick: Tick, _dt: f32) -> SimResult<()> {
            Ok(())
        }
    }

    /// Fires from tick 2 on, dodging gunfire, and always reports an aim point.
    struct Gunner {
        state: BehaviorState,
        diag:  Diagnostics,
    }

    impl Pilot for Gunner {
        fn step(&mut self, ctx: &ControlContext<'_>) -> TickReport {
            let firing = ctx.tick.0 >= 2;
            self.state = if firing { BehaviorState::Firing } else { BehaviorState::Idle };
            let reason = if firing { "Firing Guns" } else { "Idle" };
            TickReport {
                vessel:  ctx.me.id,
                status:  Status::new(self.state, reason).with_evasion(firing),
                command: ActuatorCommand::Orbital(OrbitalCommand {
                    attitude: Vec3::X,
                    throttle: 0.5,
                    ..OrbitalCommand::default()
                }),
                debug:   vec![DebugVector { kind: DebugKind::AimPoint, value: Vec3::new(0.0, 10.0, 0.0) }],
            }
        }

        fn behavior(&self) -> BehaviorState {
            self.state
        }

        fn diagnostics(&self) -> &Diagnostics {
            &self.diag
        }
    }

    fn gunner() -> Box<dyn Pilot> {
        Box::new(Gunner { state: BehaviorState::Idle, diag: Diagnostics::default() })
    }

    fn config(total_ticks: u64, output_interval_ticks: u64) -> LoopConfig {
        LoopConfig { dt: 0.02, total_ticks, seed: 1, output_interval_ticks }
    }

    fn rows(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn integration_csv() {
        let mut sim = SimBuilder::new(config(6, 2), StillWorld { traffic: TrafficStore::default() })
            .pilot(VesselId(0), gunner())
            .pilot(VesselId(1), gunner())
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let writer = CsvTelemetryWriter::new(dir.path()).unwrap();
        let mut obs = TelemetryObserver::new(writer);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // output_interval = 2 → reports at ticks 0, 2, 4 for two vessels.
        let status = rows(&dir, "status.csv");
        assert_eq!(status.len(), 6);
        assert_eq!(&status[0][3], "Idle");
        assert_eq!(&status[2][0], "2");
        assert_eq!(&status[2][2], "firing");
        assert_eq!(&status[2][3], "Firing Guns & Evading Gunfire");
        assert_eq!(&status[2][5], "1.0000 0.0000 0.0000");

        assert_eq!(rows(&dir, "debug_vectors.csv").len(), 6);

        // Transitions are written whenever they happen, interval or not.
        let transitions = rows(&dir, "transitions.csv");
        assert_eq!(transitions.len(), 2);
        assert_eq!(&transitions[0][0], "2");
        assert_eq!(&transitions[0][1], "0");
        assert_eq!(&transitions[1][1], "1");
    }

    #[test]
    fn debug_vectors_can_be_skipped() {
        let mut sim = SimBuilder::new(config(3, 1), StillWorld { traffic: TrafficStore::default() })
            .pilot(VesselId(0), gunner())
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let writer = CsvTelemetryWriter::new(dir.path()).unwrap();
        let mut obs = TelemetryObserver::new(writer).without_debug_vectors();
        sim.run(&mut obs).unwrap();

        assert_eq!(rows(&dir, "status.csv").len(), 3);
        assert!(rows(&dir, "debug_vectors.csv").is_empty());
    }

    /// Fails every status write and counts finish calls.
    #[derive(Default)]
    struct Broken {
        finished: usize,
    }

    impl TelemetryWriter for Broken {
        fn write_status(&mut self, _rows: &[StatusRow]) -> TelemetryResult<()> {
            Err(std::io::Error::other("disk full").into())
        }

        fn write_debug_vectors(&mut self, _rows: &[DebugVectorRow]) -> TelemetryResult<()> {
            Ok(())
        }

        fn write_transition(&mut self, _row: &TransitionRow) -> TelemetryResult<()> {
            Ok(())
        }

        fn finish(&mut self) -> TelemetryResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn first_write_error_is_kept() {
        let mut sim = SimBuilder::new(config(3, 1), StillWorld { traffic: TrafficStore::default() })
            .pilot(VesselId(0), gunner())
            .build()
            .unwrap();

        let mut obs = TelemetryObserver::new(Broken::default());
        sim.run(&mut obs).unwrap();

        let err = obs.take_error().expect("write error stored");
        assert!(err.to_string().contains("disk full"));
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().finished, 1);
    }
}
