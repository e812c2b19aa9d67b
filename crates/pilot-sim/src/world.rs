//! The host's side of the loop: where per-vehicle inputs come from and where
//! actuator commands go.

use pilot_agent::{Agent, BehaviorState, TrafficStore};
use pilot_behavior::{Command, OrbitState, ThreatSignal, TickReport, WeaponContext};
use pilot_core::{Tick, VesselId};
use pilot_spatial::{FlatTerrain, NoScenery, SceneryQuery, TerrainQuery};

use crate::SimResult;

static SEA_LEVEL: FlatTerrain = FlatTerrain { height: 0.0, obstacles: Vec::new() };
static NO_SCENERY: NoScenery = NoScenery;

/// Everything the world supplies about one controlled vessel for one tick.
///
/// Owned so the control phase can borrow it while pilots run in parallel.
#[derive(Clone, Debug, PartialEq)]
pub struct VesselInputs {
    pub agent:    Agent,
    pub target:   Option<VesselId>,
    pub hostiles: Vec<VesselId>,
    pub command:  Command,
    pub threat:   ThreatSignal,
    pub weapons:  WeaponContext,
    pub orbit:    Option<OrbitState>,
}

impl VesselInputs {
    /// Inputs with no target, command, threat, weapons or orbit.
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            target:   None,
            hostiles: Vec::new(),
            command:  Command::None,
            threat:   ThreatSignal::NONE,
            weapons:  WeaponContext::NONE,
            orbit:    None,
        }
    }
}

/// Read side and write side of the simulated world.
///
/// Each tick the loop calls, in order:
///
/// 1. [`inputs`][Self::inputs] for every controlled vessel, ascending id;
///    `None` removes the vessel from the loop for good.
/// 2. [`traffic`][Self::traffic], [`terrain`][Self::terrain] and
///    [`scenery`][Self::scenery] while pilots run, possibly from several
///    threads at once.
/// 3. [`apply`][Self::apply] once per report, ascending id.
/// 4. [`advance`][Self::advance] once.
pub trait WorldView: Sync {
    fn inputs(&self, vessel: VesselId, tick: Tick) -> Option<VesselInputs>;

    /// Every vessel observable this tick.
    fn traffic(&self) -> &TrafficStore;

    fn terrain(&self) -> &dyn TerrainQuery {
        &SEA_LEVEL
    }

    fn scenery(&self) -> &dyn SceneryQuery {
        &NO_SCENERY
    }

    /// Hand one vessel's command to the world.  `behavior` is the tag other
    /// vessels should see in its `PublicStatus` from the next tick on.
    fn apply(&mut self, report: &TickReport, behavior: BehaviorState);

    /// Integrate the world forward by `dt` seconds.
    fn advance(&mut self, tick: Tick, dt: f32) -> SimResult<()>;
}
