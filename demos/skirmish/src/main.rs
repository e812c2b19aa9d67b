//! skirmish — two small teams fighting it out under the autopilot core.
//!
//! Blue and red each field a tank and a spacecraft; blue adds a wingman that
//! holds formation on its tank, red an unarmed supply truck running a
//! waypoint course.  Ground vehicles fight on a flat plain dotted with
//! buildings; spacecraft fight in orbit high above, past an unpowered hulk
//! that nobody flies.
//!
//! Telemetry lands in `output/skirmish/`.  Set `RUST_LOG=debug` to watch
//! behavior transitions as they happen.

mod arena;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pilot_agent::{Agent, Kinematics, Situation};
use pilot_behavior::{Command, IdlePilot, OrbitalConfig, SurfaceConfig};
use pilot_core::{LoopConfig, Orientation, Vec3, VesselId};
use pilot_sim::SimBuilder;
use pilot_spatial::{SphereScenery, StaticObstacle};
use pilot_telemetry::{CsvTelemetryWriter, TelemetryObserver};

use arena::{Arena, Craft};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const DT:                    f32 = 0.02;
const DURATION_SECS:         u64 = 120;
const OUTPUT_INTERVAL_TICKS: u64 = 5;
const GUN_RANGE:             f32 = 1_500.0;
const ORBIT_ALTITUDE:        f32 = 100_000.0;
const OUTPUT_DIR:            &str = "output/skirmish";

const BLUE: u8 = 0;
const RED:  u8 = 1;
const NONE: u8 = 2;

// ── Vehicles ──────────────────────────────────────────────────────────────────

fn tank(id: u32, position: Vec3, nose: Vec3, armed: bool) -> Agent {
    Agent {
        id:                       VesselId(id),
        kinematics:               Kinematics::new(position, Vec3::ZERO, Vec3::ZERO),
        orientation:              Orientation::from_nose_top(nose, Vec3::Y),
        max_acceleration:         6.0,
        max_angular_acceleration: 2.0,
        radius:                   4.0,
        half_width:               2.0,
        mass:                     30.0,
        propulsion:               true,
        weapons:                  armed,
        situation:                Situation { landed: true, ..Situation::default() },
        ..Agent::default()
    }
}

fn spacecraft(id: u32, x: f32, nose: Vec3) -> Agent {
    Agent {
        id:                       VesselId(id),
        kinematics:               Kinematics::new(Vec3::new(x, ORBIT_ALTITUDE, 0.0), Vec3::ZERO, Vec3::ZERO),
        orientation:              Orientation::from_nose_top(nose, Vec3::Y),
        max_acceleration:         15.0,
        max_angular_acceleration: 1.0,
        radius:                   6.0,
        half_width:               4.0,
        mass:                     50.0,
        propulsion:               true,
        weapons:                  true,
        situation:                Situation {
            altitude:       ORBIT_ALTITUDE,
            radar_altitude: ORBIT_ALTITUDE,
            ..Situation::default()
        },
        ..Agent::default()
    }
}

/// Dead spacecraft tumbling slowly through the battle space.
fn hulk(id: u32, position: Vec3) -> Agent {
    Agent {
        id:         VesselId(id),
        kinematics: Kinematics::new(position, Vec3::new(2.0, 0.0, -1.0), Vec3::ZERO),
        radius:     10.0,
        half_width: 6.0,
        mass:       80.0,
        situation:  Situation { altitude: ORBIT_ALTITUDE, radar_altitude: ORBIT_ALTITUDE, ..Situation::default() },
        ..Agent::default()
    }
}

fn roster() -> Vec<Craft> {
    let badger = VesselId(0);
    vec![
        Craft::new("Badger", BLUE, tank(0, Vec3::new(-1_500.0, 0.0, 0.0), Vec3::X, true), false),
        Craft::new("Otter", BLUE, tank(1, Vec3::new(-1_530.0, 0.0, -30.0), Vec3::X, true), false)
            .with_command(Command::Follow { leader: badger, offset: Vec3::new(-30.0, 0.0, -30.0) }),
        Craft::new("Kestrel", BLUE, spacecraft(2, -3_000.0, Vec3::X), true),
        Craft::new("Jackal", RED, tank(3, Vec3::new(1_500.0, 0.0, 0.0), -Vec3::X, true), false),
        Craft::new("Mule", RED, tank(4, Vec3::new(1_200.0, 0.0, 800.0), Vec3::Z, false), false)
            .with_command(Command::RunWaypoints {
                points: vec![
                    Vec3::new(1_200.0, 0.0, 1_400.0),
                    Vec3::new(2_000.0, 0.0, 1_400.0),
                    Vec3::new(2_000.0, 0.0, 800.0),
                ],
                laps: 2,
            }),
        Craft::new("Raven", RED, spacecraft(5, 3_000.0, -Vec3::X), true),
        Craft::new("Hulk", NONE, hulk(6, Vec3::new(0.0, ORBIT_ALTITUDE, 9_000.0)), true).derelict(),
    ]
}

fn town() -> SphereScenery {
    let building = |x: f32, z: f32, radius: f32| StaticObstacle {
        position: Vec3::new(x, 0.0, z),
        radius,
        mass: 1.0e6,
    };
    SphereScenery {
        buildings: vec![
            building(0.0, 150.0, 40.0),
            building(-200.0, -250.0, 60.0),
            building(350.0, 0.0, 35.0),
        ],
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = LoopConfig {
        dt:                    DT,
        total_ticks:           (DURATION_SECS as f32 / DT).round() as u64,
        seed:                  SEED,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
    };

    let roster = roster();
    println!("=== skirmish ===");
    println!("Vessels: {}  |  {} s at dt = {} s  |  Seed: {SEED}", roster.len(), DURATION_SECS, DT);
    println!();

    // 1. World.
    let variants: Vec<(VesselId, bool, bool)> = roster.iter().map(|c| (c.agent.id, c.orbital, c.derelict)).collect();
    let arena = Arena::new(roster, town(), GUN_RANGE)?;

    // 2. Pilots, one per vessel, by variant.
    let tank_cfg = SurfaceConfig {
        min_engagement_range: 300.0,
        max_engagement_range: GUN_RANGE,
        ..SurfaceConfig::default()
    };
    let ship_cfg = OrbitalConfig { min_engagement_range: 400.0, ..OrbitalConfig::default() };

    let mut builder = SimBuilder::new(config, arena);
    for (id, orbital, derelict) in variants {
        builder = if derelict {
            builder.pilot(id, Box::new(IdlePilot::default()))
        } else if orbital {
            builder.orbital(id, ship_cfg)
        } else {
            builder.surface(id, tank_cfg.clone())
        };
    }
    let mut sim = builder.build()?;

    // 3. Telemetry.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvTelemetryWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = TelemetryObserver::new(writer);

    // 4. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();
    if let Some(e) = obs.take_error() {
        eprintln!("telemetry error: {e}");
    }
    info!(ticks = sim.clock.current_tick.0, secs = elapsed.as_secs_f64(), "run complete");

    // 5. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!();
    println!("{:<10} {:<6} {:>6}  {:<26}", "Vessel", "Team", "Hull", "Last behavior");
    println!("{}", "-".repeat(52));
    let mut vessels = Vec::new();
    for c in sim.world.craft() {
        let team = match c.team {
            BLUE => "blue",
            RED => "red",
            _ => "-",
        };
        let behavior = c.behavior().map_or("-", |b| b.as_str());
        println!("{:<10} {:<6} {:>6.1}  {:<26}", c.name, team, c.hull.max(0.0), behavior);
        vessels.push(json!({
            "id":       c.agent.id.0,
            "name":     c.name,
            "team":     team,
            "alive":    c.alive(),
            "hull":     c.hull.max(0.0),
            "behavior": behavior,
            "position": [c.agent.position().x, c.agent.position().y, c.agent.position().z],
        }));
    }

    let diag = sim.diagnostics();
    let summary = json!({
        "seed":         SEED,
        "ticks":        sim.clock.current_tick.0,
        "wall_secs":    elapsed.as_secs_f64(),
        "still_active": sim.active_count(),
        "diagnostics":  {
            "non_finite":     diag.non_finite,
            "path_fallbacks": diag.path_fallbacks,
            "clamped_config": diag.clamped_config,
        },
        "vessels":      vessels,
    });
    std::fs::write(Path::new(OUTPUT_DIR).join("summary.json"), serde_json::to_string_pretty(&summary)?)?;
    println!();
    println!("Telemetry written to {OUTPUT_DIR}/");

    Ok(())
}
