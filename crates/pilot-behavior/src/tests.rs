//! Unit, property and scenario tests for pilot-behavior.

#[cfg(test)]
mod helpers {
    use pilot_agent::{Agent, Kinematics, PublicStatus, Situation, TrafficStore, TrafficStoreBuilder};
    use pilot_core::{Orientation, Vec3, VesselId};
    use pilot_spatial::{Pathfinder, SpatialResult, TerrainQuery, TraversabilityGraph};

    pub const DT: f32 = 0.02;

    /// Armed orbital vessel at the origin, at rest.
    pub fn ship(propulsion: bool, weapons: bool) -> Agent {
        Agent {
            id: VesselId(0),
            max_acceleration: 10.0,
            max_angular_acceleration: 1.0,
            propulsion,
            weapons,
            ..Agent::default()
        }
    }

    /// Landed ground vehicle at `position` facing `nose`.
    pub fn tank(position: Vec3, nose: Vec3, speed: f32) -> Agent {
        Agent {
            id: VesselId(0),
            kinematics: Kinematics::new(position, nose.normalize() * speed, Vec3::ZERO),
            orientation: Orientation::from_nose_top(nose, Vec3::Y),
            radius: 5.0,
            half_width: 2.0,
            mass: 10.0,
            propulsion: true,
            situation: Situation { landed: true, ..Situation::default() },
            ..Agent::default()
        }
    }

    pub fn other(id: u32, position: Vec3, velocity: Vec3) -> PublicStatus {
        Agent {
            id: VesselId(id),
            kinematics: Kinematics::new(position, velocity, Vec3::ZERO),
            orientation: Orientation::from_nose_top(velocity, Vec3::Y),
            situation: Situation { landed: true, ..Situation::default() },
            ..Agent::default()
        }
        .public_status(None)
    }

    pub fn traffic(peers: &[PublicStatus]) -> TrafficStore {
        peers
            .iter()
            .enumerate()
            .fold(TrafficStoreBuilder::with_capacity(peers.len()), |b, (i, s)| b.push(format!("v{i}"), *s))
            .build()
            .unwrap()
    }

    /// Always routes straight to the destination.
    pub struct Straight;

    impl Pathfinder for Straight {
        fn find_path(
            &self,
            _graph: &mut TraversabilityGraph,
            _terrain: &dyn TerrainQuery,
            _from: Vec3,
            to: Vec3,
        ) -> SpatialResult<Vec<Vec3>> {
            Ok(vec![to])
        }
    }
}

// ── Status and commands ───────────────────────────────────────────────────────

#[cfg(test)]
mod status_tests {
    use pilot_agent::BehaviorState;
    use pilot_core::{Vec3, VesselId};

    use crate::{ActuatorCommand, Command, EVASION_SUFFIX, OrbitalCommand, Status, SurfaceCommand};

    #[test]
    fn evasion_suffix_is_appended() {
        let s = Status::new(BehaviorState::Drifting, "Maneuvering (Drift)");
        assert_eq!(s.to_string(), "Maneuvering (Drift)");
        let s = s.with_evasion(true);
        assert_eq!(s.to_string(), format!("Maneuvering (Drift){EVASION_SUFFIX}"));
        assert_eq!(s.state, BehaviorState::Drifting);
    }

    #[test]
    fn command_accessors() {
        let follow = Command::Follow { leader: VesselId(4), offset: Vec3::X };
        assert_eq!(follow.leader(), Some(VesselId(4)));
        assert_eq!(follow.destination(), None);
        assert_eq!(Command::Attack(Vec3::Z).destination(), Some(Vec3::Z));
        assert_eq!(Command::None.as_str(), "none");
        assert_eq!(Command::RunWaypoints { points: vec![], laps: 2 }.as_str(), "run_waypoints");
    }

    #[test]
    fn actuator_accessors() {
        let o = ActuatorCommand::Orbital(OrbitalCommand { throttle: 0.5, attitude: Vec3::Y, ..Default::default() });
        assert_eq!(o.throttle(), 0.5);
        assert_eq!(o.heading(), Vec3::Y);
        let s = ActuatorCommand::Surface(SurfaceCommand { rcs_enabled: true, ..Default::default() });
        assert!(s.rcs_enabled());
        assert_eq!(s.throttle(), 0.0);
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use pilot_core::{Diagnostics, VesselId};

    use crate::{BehaviorError, OrbitalConfig, OrbitalPilot, SurfaceConfig, SurfacePilot};

    #[test]
    fn defaults_are_in_range() {
        let mut diag = Diagnostics::default();
        let o = OrbitalConfig::default().clamped(&mut diag);
        let s = SurfaceConfig::default().clamped(&mut diag);
        assert_eq!(diag.clamped_config, 0);
        assert_eq!(o, OrbitalConfig::default());
        assert_eq!(s, SurfaceConfig::default());
    }

    #[test]
    fn orbital_values_are_clamped_and_counted() {
        let mut diag = Diagnostics::default();
        let cfg = OrbitalConfig { firing_speed: 5_000.0, evasion_threshold: -3.0, ..Default::default() }
            .clamped(&mut diag);
        assert_eq!(cfg.firing_speed, 1_000.0);
        assert_eq!(cfg.evasion_threshold, 0.0);
        assert_eq!(diag.clamped_config, 2);
    }

    #[test]
    fn standoff_and_terrain_height_are_clamped() {
        let mut diag = Diagnostics::default();
        let cfg = OrbitalConfig {
            vessel_standoff_distance: -50.0,
            default_terrain_height: f32::INFINITY,
            ..Default::default()
        }
        .clamped(&mut diag);
        assert_eq!(cfg.vessel_standoff_distance, 0.0);
        assert_eq!(cfg.default_terrain_height, OrbitalConfig::default().default_terrain_height);
        assert_eq!(diag.clamped_config, 2);
    }

    #[test]
    fn surface_clamps_nested_avoidance() {
        let mut diag = Diagnostics::default();
        let mut cfg = SurfaceConfig::default();
        cfg.avoidance.check_interval_ticks = 0;
        let cfg = cfg.clamped(&mut diag);
        assert_eq!(cfg.avoidance.check_interval_ticks, 1);
        assert_eq!(diag.clamped_config, 1);
    }

    #[test]
    fn non_finite_falls_back_to_default() {
        let mut diag = Diagnostics::default();
        let cfg = OrbitalConfig { maneuver_speed: f32::NAN, ..Default::default() }.clamped(&mut diag);
        assert_eq!(cfg.maneuver_speed, OrbitalConfig::default().maneuver_speed);
        assert_eq!(diag.clamped_config, 1);
    }

    #[test]
    fn surface_tiers() {
        let mut diag = Diagnostics::default();
        let normal = SurfaceConfig { max_speed: 200.0, ..Default::default() }.clamped(&mut diag);
        assert_eq!(normal.max_speed, 80.0);

        let eleven = SurfaceConfig { max_speed: 200.0, up_to_eleven: true, ..Default::default() }.clamped(&mut diag);
        assert_eq!(eleven.max_speed, 200.0);

        let silly = SurfaceConfig { max_speed: 1_000.0, up_to_eleven: true, ..Default::default() }.clamped(&mut diag);
        assert_eq!(silly.max_speed, 400.0);
        assert_eq!(diag.clamped_config, 2);
    }

    #[test]
    fn max_range_is_raised_to_min() {
        let mut diag = Diagnostics::default();
        let cfg = SurfaceConfig { min_engagement_range: 5_000.0, max_engagement_range: 1_000.0, ..Default::default() }
            .clamped(&mut diag);
        assert_eq!(cfg.max_engagement_range, 5_000.0);
        assert_eq!(diag.clamped_config, 1);
    }

    #[test]
    fn bad_intervals_are_rejected() {
        let cfg = OrbitalConfig { combat_update_interval: 0.0, ..Default::default() };
        assert!(matches!(OrbitalPilot::new(cfg, 1, VesselId(0)), Err(BehaviorError::Config(_))));

        let mut cfg = SurfaceConfig::default();
        cfg.grid.cells_per_side = 1;
        assert!(matches!(SurfacePilot::new(cfg, 1, VesselId(0)), Err(BehaviorError::Spatial(_))));
    }

    #[test]
    fn pilot_reports_clamping() {
        use crate::Pilot;
        let pilot = SurfacePilot::new(SurfaceConfig { steer_mult: 0.0, ..Default::default() }, 1, VesselId(0)).unwrap();
        assert_eq!(pilot.diagnostics().clamped_config, 1);
        assert_eq!(pilot.config().steer_mult, 0.2);
    }
}

// ── Gunfire evasion ───────────────────────────────────────────────────────────

#[cfg(test)]
mod evasion_tests {
    use pilot_core::{Vec3, VesselId};

    use super::helpers::ship;
    use crate::evasion::WEAVE_LIMIT;
    use crate::{EvasionTuning, GunfireEvasion, ThreatSignal, Weave};

    fn tuning() -> EvasionTuning {
        EvasionTuning {
            min_time:            0.5,
            threshold:           25.0,
            time_threshold:      0.1,
            min_range_threshold: 10.0,
            ignore_my_target_targeting_me: false,
        }
    }

    fn fire(source: Option<VesselId>) -> ThreatSignal {
        ThreatSignal {
            under_fire: true,
            miss_distance: 5.0,
            miss_time: 1.0,
            threat_position: Vec3::new(500.0, 0.0, 0.0),
            threat_source: source,
            ..ThreatSignal::NONE
        }
    }

    #[test]
    fn one_tick_of_fire_holds_for_min_time() {
        let me = ship(true, true);
        let mut e = GunfireEvasion::new();
        let dt = 0.125;

        assert!(e.update(&me, &fire(None), None, &tuning(), dt));
        assert_eq!(e.threat_relative(), Vec3::new(500.0, 0.0, 0.0));

        // Three more ticks bring the timer to 0.5 and reset it.
        for _ in 0..3 {
            assert!(e.update(&me, &ThreatSignal::NONE, None, &tuning(), dt));
        }
        assert!(!e.update(&me, &ThreatSignal::NONE, None, &tuning(), dt));
        assert!(e.rcs_overlay(Vec3::Y).is_none());
    }

    #[test]
    fn thresholds_filter_fire() {
        let me = ship(true, true);
        let t = tuning();

        let wide = ThreatSignal { miss_distance: 40.0, ..fire(None) };
        assert!(!GunfireEvasion::new().update(&me, &wide, None, &t, 0.1));

        let instant = ThreatSignal { miss_time: 0.05, ..fire(None) };
        assert!(!GunfireEvasion::new().update(&me, &instant, None, &t, 0.1));

        let point_blank = ThreatSignal { threat_position: Vec3::new(5.0, 0.0, 0.0), ..fire(None) };
        assert!(!GunfireEvasion::new().update(&me, &point_blank, None, &t, 0.1));
    }

    #[test]
    fn my_target_can_be_ignored() {
        let me = ship(true, true);
        let t = EvasionTuning { ignore_my_target_targeting_me: true, ..tuning() };
        let threat = fire(Some(VesselId(7)));
        assert!(!GunfireEvasion::new().update(&me, &threat, Some(VesselId(7)), &t, 0.1));
        assert!(GunfireEvasion::new().update(&me, &threat, Some(VesselId(8)), &t, 0.1));
    }

    #[test]
    fn overlay_is_perpendicular_to_threat() {
        let me = ship(true, true);
        let mut e = GunfireEvasion::new();
        e.update(&me, &fire(None), None, &tuning(), 0.1);
        let rcs = e.rcs_overlay(Vec3::new(1.0, 1.0, 0.0)).unwrap();
        approx::assert_abs_diff_eq!(rcs.dot(Vec3::X), 0.0, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(rcs.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn weave_stays_within_limit() {
        let mut w = Weave::default();
        let factor = 6.5;
        let mut max: f32 = 0.0;
        let mut flipped = false;
        let mut last = 0.0;
        for _ in 0..500 {
            let a = w.advance(factor, 0.1);
            max = max.max(a.abs());
            flipped |= a < last;
            last = a;
        }
        assert!(max <= WEAVE_LIMIT * factor + 1e-4);
        assert!(flipped);
        w.reset();
        assert_eq!(w.adjustment(), 0.0);
    }
}

// ── Orbital ladder ────────────────────────────────────────────────────────────

#[cfg(test)]
mod ladder_tests {
    use pilot_agent::{Agent, TrafficStore};
    use pilot_core::{Tick, Vec3, VesselId};

    use super::helpers::{DT, other, ship, traffic};
    use crate::orbital::ladder::{Priority, decide};
    use crate::orbital::maneuver::Maneuver;
    use crate::{
        Command, ControlContext, GunState, IncomingMissile, OrbitState, OrbitalConfig, ThreatSignal, WeaponContext,
    };

    fn orbit(periapsis: f32, apoapsis: f32, altitude: f32) -> OrbitState {
        OrbitState { periapsis, apoapsis, altitude, time_to_periapsis: 100.0, time_to_apoapsis: 1_000.0, ..Default::default() }
    }

    fn decide_orbit(o: &OrbitState) -> Maneuver {
        let me = ship(true, true);
        let empty = TrafficStore::default();
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty).with_orbit(Some(o));
        let c = decide(&OrbitalConfig::default(), &ctx);
        assert_eq!(c.priority, Priority::CorrectOrbit);
        c.maneuver
    }

    #[test]
    fn orbit_correction_selection() {
        // Safe altitude is the 70 km atmosphere.
        assert_eq!(decide_orbit(&orbit(50_000.0, 100_000.0, 80_000.0)), Maneuver::Circularize);
        assert_eq!(decide_orbit(&orbit(50_000.0, 60_000.0, 55_000.0)), Maneuver::RaiseApoapsis);
        assert_eq!(decide_orbit(&orbit(50_000.0, 80_000.0, 60_000.0)), Maneuver::ClimbOut);

        let escaping = OrbitState { apoapsis: -1.0, time_to_periapsis: -100.0, ..orbit(90_000.0, -1.0, 90_000.0) };
        assert_eq!(decide_orbit(&escaping), Maneuver::Escape);
    }

    #[test]
    fn safe_orbit_is_left_alone() {
        let me = ship(true, true);
        let empty = TrafficStore::default();
        let o = OrbitState::default();
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty).with_orbit(Some(&o));
        assert_eq!(decide(&OrbitalConfig::default(), &ctx).priority, Priority::Idle);
    }

    #[test]
    fn imminent_missile_outranks_everything() {
        let me = ship(true, true);
        let empty = TrafficStore::default();
        let o = orbit(50_000.0, 100_000.0, 80_000.0);
        let command = Command::MoveTo(Vec3::Z * 1_000.0);
        let missile = IncomingMissile {
            id:             VesselId(9),
            position:       Vec3::X * 100.0,
            velocity:       -Vec3::X * 50.0,
            time_to_impact: 2.0,
            distance:       100.0,
        };
        let threat = ThreatSignal { incoming_missile: Some(missile), evade_threshold: 3.0, ..ThreatSignal::NONE };
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty)
            .with_orbit(Some(&o))
            .with_command(&command)
            .with_threat(&threat);
        assert_eq!(decide(&OrbitalConfig::default(), &ctx).priority, Priority::EvadeMissile);

        // Outside the threshold the missile is not yet dodged.
        let later = ThreatSignal { evade_threshold: 1.0, ..threat };
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty).with_command(&command).with_threat(&later);
        assert_eq!(decide(&OrbitalConfig::default(), &ctx).priority, Priority::Commanded);
    }

    #[test]
    fn unarmed_vessel_withdraws_from_drifting_hostile() {
        let me = ship(true, false);
        let hostile = other(1, Vec3::Z * 1_000.0, Vec3::ZERO);
        let t = traffic(&[hostile]);
        let hostiles = [VesselId(1)];
        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_hostiles(&hostiles);
        let c = decide(&OrbitalConfig::default(), &ctx);
        assert_eq!(c.priority, Priority::Withdraw);
        let Maneuver::Withdraw { delta_v } = c.maneuver else {
            panic!("expected withdraw, got {:?}", c.maneuver);
        };
        approx::assert_abs_diff_eq!(delta_v.length(), 200.0, epsilon = 1e-3);
        assert_eq!(delta_v.dot(Vec3::Z), 0.0, "burn is along the right axis, not toward the hostile");
    }

    #[test]
    fn ready_gun_fires() {
        let me = ship(true, true);
        let t = traffic(&[other(1, Vec3::Z * 1_000.0, Vec3::ZERO)]);
        let weapons = WeaponContext {
            gun_range: 1_500.0,
            gun: Some(GunState { can_fire_soon: true, max_range: 2_000.0, ..Default::default() }),
            ..WeaponContext::NONE
        };
        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_target(Some(VesselId(1))).with_weapons(&weapons);
        assert_eq!(decide(&OrbitalConfig::default(), &ctx).priority, Priority::FireGuns);

        // Too fast relative to the target: manoeuvre instead.
        let mut fast = me.clone();
        fast.kinematics.velocity = Vec3::X * 100.0;
        let ctx = ControlContext::new(Tick(0), DT, &fast, &t).with_target(Some(VesselId(1))).with_weapons(&weapons);
        assert_eq!(decide(&OrbitalConfig::default(), &ctx).priority, Priority::Engage);
    }

    #[test]
    fn rungs_are_ordered() {
        let ladder = [
            Priority::EvadeMissile,
            Priority::CorrectOrbit,
            Priority::Commanded,
            Priority::Withdraw,
            Priority::FireGuns,
            Priority::FireMissiles,
            Priority::Engage,
            Priority::Idle,
        ];
        assert!(ladder.windows(2).all(|w| w[0] < w[1]));
    }

    /// The engage rung for a target at `position` moving at `velocity`, with
    /// the default envelope of 500..600 m and no weapon selected.
    fn engage(me: &Agent, position: Vec3, velocity: Vec3) -> Maneuver {
        let t = traffic(&[other(1, position, velocity)]);
        let ctx = ControlContext::new(Tick(0), DT, me, &t).with_target(Some(VesselId(1)));
        let c = decide(&OrbitalConfig::default(), &ctx);
        assert_eq!(c.priority, Priority::Engage);
        c.maneuver
    }

    #[test]
    fn too_close_burns_away() {
        let me = ship(true, true);
        assert_eq!(
            engage(&me, Vec3::Z * 300.0, Vec3::ZERO),
            Maneuver::Away { target: VesselId(1), min_range: 500.0 }
        );
    }

    #[test]
    fn beyond_envelope_intercepts() {
        let me = ship(true, true);
        assert_eq!(
            engage(&me, Vec3::Z * 2_000.0, Vec3::ZERO),
            Maneuver::Intercept { target: VesselId(1), min_range: 500.0, max_range: 600.0 }
        );
    }

    #[test]
    fn fast_relative_drift_is_killed_first() {
        let mut me = ship(true, true);
        me.kinematics.velocity = Vec3::X * 50.0;
        assert_eq!(engage(&me, Vec3::Z * 550.0, Vec3::ZERO), Maneuver::KillVelocity { target: VesselId(1) });
    }

    #[test]
    fn slow_crossing_kills_angular_velocity() {
        // 15 m/s across 550 m is about 1.6°, over the 1° limit but under the
        // 20 m/s firing speed.
        let mut me = ship(true, true);
        me.kinematics.velocity = Vec3::X * 15.0;
        assert_eq!(engage(&me, Vec3::Z * 550.0, Vec3::ZERO), Maneuver::KillAngularVelocity { target: VesselId(1) });
    }

    #[test]
    fn receding_target_inside_min_range_drifts_away() {
        // Too close, but the target opens the range by itself faster than an
        // escape burn would.
        let me = ship(true, true);
        assert_eq!(
            engage(&me, Vec3::Z * 450.0, Vec3::Z * 19.0),
            Maneuver::DriftAway { target: VesselId(1), min_range: 500.0 }
        );
    }

    #[test]
    fn settled_in_envelope_drifts() {
        assert_eq!(
            engage(&ship(true, true), Vec3::Z * 550.0, Vec3::ZERO),
            Maneuver::Drift { target: VesselId(1), facing: Vec3::Z }
        );
        assert_eq!(
            engage(&ship(false, true), Vec3::Z * 550.0, Vec3::ZERO),
            Maneuver::Stranded { target: VesselId(1), facing: Vec3::Z }
        );
    }
}

// ── Orbital pilot ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod orbital_tests {
    use pilot_agent::{BehaviorState, TrafficStore};
    use pilot_core::{Tick, Vec3, VesselId};
    use proptest::prelude::*;

    use super::helpers::{DT, other, ship, traffic};
    use crate::orbital::maneuver::Maneuver;
    use crate::{
        ActuatorCommand, Command, ControlContext, GunState, IncomingMissile, OrbitalConfig, OrbitalPilot, Pilot,
        ThreatSignal, WeaponContext,
    };

    fn pilot(cfg: OrbitalConfig) -> OrbitalPilot {
        OrbitalPilot::new(cfg, 42, VesselId(0)).unwrap()
    }

    fn orbital(cmd: ActuatorCommand) -> crate::OrbitalCommand {
        match cmd {
            ActuatorCommand::Orbital(c) => c,
            ActuatorCommand::Surface(_) => panic!("surface command from orbital pilot"),
        }
    }

    #[test]
    fn distant_target_is_intercepted() {
        let me = ship(true, true);
        let t = traffic(&[other(1, Vec3::Z * 2_000.0, Vec3::ZERO)]);
        let weapons = WeaponContext { gun_range: 1_500.0, ..WeaponContext::NONE };
        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_target(Some(VesselId(1))).with_weapons(&weapons);

        let mut p = pilot(OrbitalConfig::default());
        let report = p.step(&ctx);
        assert_eq!(report.status.state, BehaviorState::ManeuveringToward);
        assert_eq!(report.status.reason, "Maneuvering (Intercept Target)");
        assert_eq!(p.behavior(), BehaviorState::ManeuveringToward);
        assert_eq!(p.variant(), "orbital");
    }

    #[test]
    fn fires_along_supplied_solution() {
        let me = ship(true, true);
        let t = traffic(&[other(1, Vec3::Z * 1_000.0, Vec3::ZERO)]);
        let solution = Vec3::new(0.0, 0.1, 1.0).normalize();
        let weapons = WeaponContext {
            gun_range: 1_500.0,
            gun: Some(GunState {
                can_fire_soon: true,
                max_range: 2_000.0,
                firing_solution: Some(solution),
                ..Default::default()
            }),
            ..WeaponContext::NONE
        };
        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_target(Some(VesselId(1))).with_weapons(&weapons);

        let report = pilot(OrbitalConfig::default()).step(&ctx);
        assert_eq!(report.status.state, BehaviorState::Firing);
        assert_eq!(report.status.reason, "Firing Guns");
        let cmd = orbital(report.command);
        assert_eq!(cmd.attitude, solution);
        assert!(cmd.rcs_enabled);
        assert!(!cmd.lerp_attitude);
    }

    #[test]
    fn unarmed_without_engines_idles() {
        let me = ship(false, false);
        let empty = TrafficStore::default();
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty);
        let report = pilot(OrbitalConfig::default()).step(&ctx);
        assert_eq!(report.status.state, BehaviorState::Idle);
        assert_eq!(report.status.reason, "Idle (Unarmed)");
        assert_eq!(report.command.throttle(), 0.0);
    }

    #[test]
    fn commanded_burn_restarts_after_time_limit() {
        let me = ship(true, true);
        let empty = TrafficStore::default();
        let command = Command::MoveTo(Vec3::Z * 5_000.0);
        let cfg = OrbitalConfig { commanded_burn_time: 1.0, ..Default::default() };
        let mut p = pilot(cfg);

        // Limit is three burn times; the throttle ramps 1 → 0 over one.
        let throttles: Vec<f32> = (0..5)
            .map(|i| {
                let ctx = ControlContext::new(Tick(i), 1.0, &me, &empty).with_command(&command);
                let r = p.step(&ctx);
                assert_eq!(r.status.reason, "Maneuvering (Commanded Position)");
                r.command.throttle()
            })
            .collect();
        assert_eq!(throttles, vec![1.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn missile_preempts_commanded_move() {
        let me = ship(true, true);
        let empty = TrafficStore::default();
        let command = Command::MoveTo(Vec3::Z * 5_000.0);
        let mut p = pilot(OrbitalConfig::default());

        let ctx = ControlContext::new(Tick(0), DT, &me, &empty).with_command(&command);
        assert_eq!(p.step(&ctx).status.state, BehaviorState::Moving);

        let threat = ThreatSignal {
            incoming_missile: Some(IncomingMissile {
                id:             VesselId(9),
                position:       Vec3::X * 100.0,
                velocity:       -Vec3::X * 50.0,
                time_to_impact: 2.0,
                distance:       100.0,
            }),
            evade_threshold: 3.0,
            ..ThreatSignal::NONE
        };
        let ctx = ControlContext::new(Tick(1), DT, &me, &empty).with_command(&command).with_threat(&threat);
        let report = p.step(&ctx);
        assert_eq!(report.status.state, BehaviorState::Evading);
        assert_eq!(report.status.reason, "Evading Missile");
        let cmd = orbital(report.command);
        assert_eq!(cmd.throttle, 1.0);
        assert_eq!(cmd.alignment_tolerance_deg, 45.0);
        approx::assert_abs_diff_eq!(cmd.attitude.dot(Vec3::X), 0.0, epsilon = 1e-5);

        // Once the missile is gone the command resumes.
        let ctx = ControlContext::new(Tick(2), DT, &me, &empty).with_command(&command);
        assert_eq!(p.step(&ctx).status.state, BehaviorState::Moving);
    }

    #[test]
    fn higher_rung_preempts_running_maneuver() {
        let me = ship(true, true);
        let t = traffic(&[other(1, Vec3::Z * 2_000.0, Vec3::ZERO)]);
        let weapons = WeaponContext { gun_range: 1_500.0, ..WeaponContext::NONE };
        let mut p = pilot(OrbitalConfig::default());

        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_target(Some(VesselId(1))).with_weapons(&weapons);
        assert_eq!(p.step(&ctx).status.state, BehaviorState::ManeuveringToward);

        // Guns come into range: firing outranks the running intercept.
        let ready = WeaponContext {
            gun: Some(GunState { can_fire_soon: true, max_range: 3_000.0, ..Default::default() }),
            gun_range: 2_500.0,
            ..WeaponContext::NONE
        };
        let ctx = ControlContext::new(Tick(1), DT, &me, &t).with_target(Some(VesselId(1))).with_weapons(&ready);
        assert_eq!(p.step(&ctx).status.state, BehaviorState::Firing);
    }

    #[test]
    fn same_rung_waits_for_running_maneuver() {
        let t = traffic(&[other(1, Vec3::Z * 550.0, Vec3::ZERO)]);
        let mut me = ship(true, true);
        me.kinematics.velocity = Vec3::X * 50.0;
        let mut p = pilot(OrbitalConfig::default());

        let ctx = ControlContext::new(Tick(0), 1.0, &me, &t).with_target(Some(VesselId(1)));
        p.step(&ctx);
        assert!(matches!(p.maneuver(), Maneuver::KillVelocity { .. }));

        // The ladder now prefers the angular rung, but it is no higher, so the
        // velocity kill keeps authority until its 2.5 s clock runs out.
        me.kinematics.velocity = Vec3::X * 15.0;
        for tick in 1..3 {
            let ctx = ControlContext::new(Tick(tick), 1.0, &me, &t).with_target(Some(VesselId(1)));
            p.step(&ctx);
            assert!(matches!(p.maneuver(), Maneuver::KillVelocity { .. }), "tick {tick}");
        }
        let ctx = ControlContext::new(Tick(3), 1.0, &me, &t).with_target(Some(VesselId(1)));
        p.step(&ctx);
        assert!(matches!(p.maneuver(), Maneuver::KillAngularVelocity { .. }));
    }

    #[test]
    fn lost_target_ends_maneuver() {
        let me = ship(true, true);
        let t = traffic(&[other(1, Vec3::Z * 2_000.0, Vec3::ZERO)]);
        let weapons = WeaponContext { gun_range: 1_500.0, ..WeaponContext::NONE };
        let mut p = pilot(OrbitalConfig::default());

        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_target(Some(VesselId(1))).with_weapons(&weapons);
        p.step(&ctx);
        let ctx = ControlContext::new(Tick(1), DT, &me, &t).with_weapons(&weapons);
        let report = p.step(&ctx);
        assert_eq!(report.status.state, BehaviorState::Idle);
        assert_eq!(report.status.reason, "Idle");
    }

    #[test]
    fn gunfire_suffix_on_status() {
        let me = ship(true, true);
        let empty = TrafficStore::default();
        let threat = ThreatSignal {
            under_fire: true,
            miss_distance: 5.0,
            miss_time: 1.0,
            threat_position: Vec3::X * 800.0,
            ..ThreatSignal::NONE
        };
        let mut p = pilot(OrbitalConfig::default());
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty).with_threat(&threat);
        let report = p.step(&ctx);
        assert!(p.is_evading_gunfire());
        assert!(report.status.evading_gunfire);
        assert_eq!(report.status.to_string(), "Idle & Evading Gunfire");
        assert!(report.command.rcs_enabled());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn one_state_per_tick(
            x in -5_000.0f32..5_000.0,
            z in -5_000.0f32..5_000.0,
            vx in -200.0f32..200.0,
            propulsion in any::<bool>(),
            weapons in any::<bool>(),
            with_target in any::<bool>(),
        ) {
            let me = ship(propulsion, weapons);
            let t = traffic(&[other(1, Vec3::new(x, 0.0, z + 50.0), Vec3::new(vx, 0.0, 0.0))]);
            let hostiles = [VesselId(1)];
            let gun = WeaponContext { gun_range: 1_500.0, ..WeaponContext::NONE };
            let target = with_target.then_some(VesselId(1));
            let mut p = pilot(OrbitalConfig::default());

            for i in 0..3 {
                let ctx = ControlContext::new(Tick(i), DT, &me, &t)
                    .with_target(target)
                    .with_hostiles(&hostiles)
                    .with_weapons(&gun);
                let report = p.step(&ctx);
                prop_assert_eq!(report.status.state, p.behavior());
                prop_assert!(!report.status.reason.is_empty());
                let throttle = report.command.throttle();
                prop_assert!((0.0..=1.0).contains(&throttle), "throttle {}", throttle);
            }
        }
    }
}

// ── Surface route keeping ─────────────────────────────────────────────────────

#[cfg(test)]
mod route_tests {
    use pilot_core::{Diagnostics, MovementClass, Vec3, VesselId};
    use pilot_spatial::{
        FlatTerrain, GridSpec, Pathfinder, SpatialResult, TerrainQuery, TraversabilityGraph, TraversalProfile,
    };

    use super::helpers::{Straight, other};
    use crate::surface::route::{Navigator, WaypointRun};

    fn navigator() -> Navigator {
        let profile = TraversalProfile { class: MovementClass::Land, max_slope_deg: 10.0, min_obstacle_mass: 0.0 };
        Navigator::with_pathfinder(profile, GridSpec::default(), Box::new(Straight))
    }

    #[test]
    fn waypoint_run_laps() {
        let points = vec![Vec3::new(0.0, 0.0, 1_000.0), Vec3::new(1_000.0, 0.0, 1_000.0)];
        let mut run = WaypointRun::new(points.clone(), 2);
        assert!(run.matches(&points, 2));
        assert!(!run.matches(&points, 3));

        assert_eq!(run.update(Vec3::ZERO, Vec3::Y), Some(points[0]));
        assert_eq!(run.index(), 0);
        approx::assert_abs_diff_eq!(run.range(), 1_000.0, epsilon = 1e-3);

        assert_eq!(run.update(points[0], Vec3::Y), Some(points[1]));
        assert_eq!((run.index(), run.lap()), (1, 1));

        assert_eq!(run.update(points[1], Vec3::Y), Some(points[0]));
        assert_eq!((run.index(), run.lap()), (0, 2));

        run.update(points[0], Vec3::Y);
        assert_eq!(run.update(points[1], Vec3::Y), None);
        assert!(run.is_finished());
    }

    #[test]
    fn zero_laps_means_one() {
        let run = WaypointRun::new(vec![Vec3::Z], 0);
        assert_eq!(run.laps(), 1);
        assert!(WaypointRun::new(Vec::new(), 1).is_finished());
    }

    #[test]
    fn steer_point_replans_on_new_goal() {
        let terrain = FlatTerrain::default();
        let mut nav = navigator();
        let mut diag = Diagnostics::default();

        let a = Vec3::new(0.0, 0.0, 2_000.0);
        assert_eq!(nav.steer_point(&terrain, Vec3::ZERO, a, &mut diag), a);
        let b = Vec3::new(2_000.0, 0.0, 0.0);
        assert_eq!(nav.steer_point(&terrain, Vec3::ZERO, b, &mut diag), b);
        assert!(!nav.has_more_waypoints());
        assert_eq!(diag.path_fallbacks, 0);
    }

    #[test]
    fn home_is_first_position() {
        let mut nav = navigator();
        assert_eq!(nav.home(Vec3::X), Vec3::X);
        assert_eq!(nav.home(Vec3::Z), Vec3::X);
    }

    #[test]
    fn open_ground_needs_no_bypass() {
        let terrain = FlatTerrain::default();
        let mut nav = navigator();
        let mut diag = Diagnostics::default();
        let target = other(3, Vec3::new(0.0, 0.0, 800.0), Vec3::ZERO);
        nav.check_bypass(&terrain, Vec3::ZERO, &target, &mut diag);
        assert!(nav.bypass().is_none());
        assert!(nav.is_traversable(&terrain, Vec3::ZERO, Vec3::new(0.0, 0.0, 800.0)));
    }

    #[test]
    fn open_ground_far_from_first_query_is_traversable() {
        let terrain = FlatTerrain::default();
        let mut nav = navigator();
        assert!(nav.is_traversable(&terrain, Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)));
        // Well outside the grid built around the first query.
        assert!(nav.is_traversable(&terrain, Vec3::new(3_000.0, 0.0, 0.0), Vec3::new(3_100.0, 0.0, 0.0)));
        assert!(nav.is_traversable(&terrain, Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0)));
    }

    /// Routes through a point off to the side.
    struct Detour;

    impl Pathfinder for Detour {
        fn find_path(
            &self,
            _graph: &mut TraversabilityGraph,
            _terrain: &dyn TerrainQuery,
            from: Vec3,
            to: Vec3,
        ) -> SpatialResult<Vec<Vec3>> {
            Ok(vec![(from + to) * 0.5 + Vec3::X * 500.0, to])
        }
    }

    #[test]
    fn bypass_clears_when_target_changes() {
        // Water everywhere: a land vehicle cannot reach the target directly.
        let terrain = FlatTerrain { height: -10.0, obstacles: Vec::new() };
        let profile = TraversalProfile { class: MovementClass::Land, max_slope_deg: 10.0, min_obstacle_mass: 0.0 };
        let mut nav = Navigator::with_pathfinder(profile, GridSpec::default(), Box::new(Detour));
        let mut diag = Diagnostics::default();
        let target = other(3, Vec3::new(0.0, 0.0, 1_500.0), Vec3::ZERO);
        nav.check_bypass(&terrain, Vec3::ZERO, &target, &mut diag);
        let bypass = nav.bypass().expect("blocked line starts a bypass");
        assert_eq!(bypass.target, VesselId(3));
        assert_eq!(nav.path().map(|p| p.destination()), Some(Vec3::new(500.0, 0.0, 750.0)));

        nav.clear_stale_bypass(Some(VesselId(3)), None, |_| Some(target.position()));
        assert!(nav.bypass().is_some());
        nav.clear_stale_bypass(Some(VesselId(4)), None, |_| Some(target.position()));
        assert!(nav.bypass().is_none());
    }
}

// ── Surface control ───────────────────────────────────────────────────────────

#[cfg(test)]
mod steer_tests {
    use pilot_core::{Diagnostics, Vec3};

    use super::helpers::tank;
    use crate::surface::steer::{Intent, throttle};
    use crate::{SurfaceCommand, SurfaceConfig};

    #[test]
    fn throttle_accelerates_from_rest() {
        let me = tank(Vec3::ZERO, Vec3::Z, 0.0);
        let intent = Intent { speed: 20.0, ..Intent::hold(&me) };
        let mut out = SurfaceCommand::default();
        throttle(&SurfaceConfig::default(), &me, &intent, &mut Diagnostics::default(), &mut out);
        assert_eq!(out.throttle, 1.0);
        assert_eq!(out.target_speed, 20.0);
        assert!(!out.brakes);
    }

    #[test]
    fn reversing_at_speed_brakes() {
        let me = tank(Vec3::ZERO, Vec3::Z, 20.0);
        let intent = Intent { speed: -30.0, reversing: true, ..Intent::hold(&me) };
        let mut out = SurfaceCommand::default();
        throttle(&SurfaceConfig::default(), &me, &intent, &mut Diagnostics::default(), &mut out);
        assert_eq!(out.target_speed, -30.0);
        assert!(out.brakes);
        assert_eq!(out.throttle, -1.0);
    }

    #[test]
    fn negative_speed_without_reverse_is_a_stop() {
        let me = tank(Vec3::ZERO, Vec3::Z, 2.0);
        let intent = Intent { speed: -30.0, ..Intent::hold(&me) };
        let mut out = SurfaceCommand::default();
        throttle(&SurfaceConfig::default(), &me, &intent, &mut Diagnostics::default(), &mut out);
        assert_eq!(out.target_speed, 0.0);
        approx::assert_abs_diff_eq!(out.throttle, -0.5, epsilon = 1e-5);
    }
}

// ── Surface pilot ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod surface_tests {
    use pilot_agent::{BehaviorState, Situation, TrafficStore};
    use pilot_core::{MovementClass, Tick, Vec3, VesselId};

    use super::helpers::{DT, Straight, other, tank, traffic};
    use crate::surface::{formation_slot, sidestep};
    use crate::{ActuatorCommand, Command, ControlContext, OrbitDirection, Pilot, SurfaceConfig, SurfacePilot, TickReport};

    fn pilot(cfg: SurfaceConfig) -> SurfacePilot {
        SurfacePilot::new(cfg, 7, VesselId(0)).unwrap().with_pathfinder(Box::new(Straight))
    }

    fn surface(report: &TickReport) -> crate::SurfaceCommand {
        match report.command {
            ActuatorCommand::Surface(c) => c,
            ActuatorCommand::Orbital(_) => panic!("orbital command from surface pilot"),
        }
    }

    fn step(p: &mut SurfacePilot, me: &pilot_agent::Agent) -> TickReport {
        let empty = TrafficStore::default();
        p.step(&ControlContext::new(Tick(0), DT, me, &empty))
    }

    #[test]
    fn panic_situations() {
        let mut p = pilot(SurfaceConfig::default());
        let mut me = tank(Vec3::ZERO, Vec3::Z, 5.0);

        me.situation = Situation::default();
        let r = step(&mut p, &me);
        assert_eq!((r.status.state, r.status.reason.as_str()), (BehaviorState::Custom, "Airtime!"));
        assert_eq!(surface(&r).target_speed, 0.0);

        me.situation = Situation { splashed: true, ..Situation::default() };
        let r = step(&mut p, &me);
        assert_eq!((r.status.state, r.status.reason.as_str()), (BehaviorState::Stranded, "Floating"));

        let mut boat = pilot(SurfaceConfig { class: MovementClass::Water, ..Default::default() });
        me.situation = Situation { landed: true, ..Situation::default() };
        let r = step(&mut boat, &me);
        assert_eq!(r.status.reason, "Stranded");

        me.situation = Situation { splashed: true, submerged: true, ..Situation::default() };
        let r = step(&mut boat, &me);
        assert_eq!(r.status.reason, "Sunk");

        let mut sub = pilot(SurfaceConfig { class: MovementClass::Submarine, ..Default::default() });
        let r = step(&mut sub, &me);
        assert_ne!(r.status.state, BehaviorState::Stranded);
    }

    #[test]
    fn idle_at_home() {
        let mut p = pilot(SurfaceConfig::default());
        let me = tank(Vec3::ZERO, Vec3::Z, 0.0);
        let r = step(&mut p, &me);
        assert_eq!(r.status.state, BehaviorState::Idle);
        assert_eq!(r.status.reason, "Not doing anything in particular");
        assert_eq!(p.variant(), "surface");
    }

    #[test]
    fn drives_a_waypoint_course() {
        let mut p = pilot(SurfaceConfig::default());
        let me = tank(Vec3::ZERO, Vec3::Z, 0.0);
        let empty = TrafficStore::default();
        let command = Command::RunWaypoints {
            points: vec![Vec3::new(0.0, 0.0, 100.0), Vec3::new(0.0, 0.0, 1_000.0)],
            laps:   1,
        };
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty).with_command(&command);
        let r = p.step(&ctx);
        assert_eq!(r.status.state, BehaviorState::Moving);
        assert_eq!(r.status.reason, "Waypoint 1 (1000m)");
        let cmd = surface(&r);
        assert_eq!(cmd.target_speed, p.config().cruise_speed);
        assert!(cmd.throttle > 0.0);
        assert!(r.debug.iter().any(|d| d.value == Vec3::new(0.0, 0.0, 1_000.0)));
    }

    #[test]
    fn moves_to_commanded_point() {
        let mut p = pilot(SurfaceConfig::default());
        let me = tank(Vec3::ZERO, Vec3::Z, 0.0);
        let empty = TrafficStore::default();
        let command = Command::MoveTo(Vec3::new(0.0, 0.0, 3_000.0));
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty).with_command(&command);
        let r = p.step(&ctx);
        assert_eq!(r.status.reason, "Moving");
        assert_eq!(surface(&r).target_direction, Vec3::new(0.0, 0.0, 3_000.0));
    }

    #[test]
    fn follows_leader() {
        let mut p = pilot(SurfaceConfig::default());
        let me = tank(Vec3::ZERO, Vec3::Z, 0.0);
        let t = traffic(&[other(1, Vec3::new(0.0, 0.0, 1_000.0), Vec3::Z * 10.0)]);
        let command = Command::Follow { leader: VesselId(1), offset: Vec3::new(0.0, 0.0, -50.0) };
        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_command(&command);
        let r = p.step(&ctx);
        assert_eq!(r.status.state, BehaviorState::Following);
        let cmd = surface(&r);
        assert!(cmd.target_direction.normalize().abs_diff_eq(Vec3::Z, 1e-5));
        assert_eq!(cmd.target_speed, p.config().max_speed);
    }

    #[test]
    fn formation_slot_uses_leader_frame() {
        let leader = other(1, Vec3::new(100.0, 0.0, 0.0), Vec3::X * 10.0);
        let slot = formation_slot(&leader, Vec3::new(10.0, 0.0, -20.0), Vec3::Y);
        // Leader faces +x, so its right is -z and its back is -x.
        assert!(slot.abs_diff_eq(Vec3::new(80.0, 0.0, -10.0), 1e-4), "slot {slot}");
    }

    #[test]
    fn emplacement_aims_only_inside_envelope() {
        let cfg = SurfaceConfig { class: MovementClass::Stationary, ..Default::default() };
        let mut p = pilot(cfg);
        let mut me = tank(Vec3::ZERO, Vec3::Z, 0.0);
        me.weapons = true;
        let t = traffic(&[other(1, Vec3::new(0.0, 0.0, 1_000.0), Vec3::ZERO)]);
        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_target(Some(VesselId(1)));
        let r = p.step(&ctx);
        assert_eq!(r.status.reason, "Engaging target");
        assert_eq!(surface(&r).target_speed, 0.0);

        let far = traffic(&[other(1, Vec3::new(0.0, 0.0, 9_000.0), Vec3::ZERO)]);
        let ctx = ControlContext::new(Tick(1), DT, &me, &far).with_target(Some(VesselId(1)));
        let r = p.step(&ctx);
        assert_eq!((r.status.state, r.status.reason.as_str()), (BehaviorState::Idle, "On Alert"));
    }

    #[test]
    fn tank_closes_on_distant_target() {
        let mut p = pilot(SurfaceConfig::default());
        let mut me = tank(Vec3::ZERO, Vec3::Z, 0.0);
        me.weapons = true;
        let t = traffic(&[other(1, Vec3::new(0.0, 0.0, 6_000.0), Vec3::ZERO)]);
        let ctx = ControlContext::new(Tick(0), DT, &me, &t).with_target(Some(VesselId(1)));
        let r = p.step(&ctx);
        assert_eq!(r.status.state, BehaviorState::ManeuveringToward);
        assert_eq!(surface(&r).target_speed, p.config().max_speed);
    }

    #[test]
    fn under_fire_goes_flat_out_and_weaves() {
        let mut p = pilot(SurfaceConfig::default());
        let me = tank(Vec3::ZERO, Vec3::Z, 0.0);
        let empty = TrafficStore::default();
        let threat = crate::ThreatSignal { under_fire: true, ..crate::ThreatSignal::NONE };
        let ctx = ControlContext::new(Tick(0), DT, &me, &empty).with_threat(&threat);
        let cmd = surface(&p.step(&ctx));
        assert_eq!(cmd.target_speed, p.config().max_speed);
        assert!(cmd.rcs_enabled);
    }

    #[test]
    fn sidestep_schedule() {
        let cfg = SurfaceConfig { orbit_direction: OrbitDirection::Port, ..Default::default() };
        let attack = 30.0 / 90.0;
        approx::assert_abs_diff_eq!(sidestep(&cfg, cfg.max_engagement_range), attack, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(sidestep(&cfg, cfg.min_engagement_range + 1e-3), 1.0, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(sidestep(&cfg, 0.0), 1.5, epsilon = 1e-5);
        assert!(sidestep(&cfg, cfg.max_engagement_range * 10.0) < 1e-5);
    }
}
