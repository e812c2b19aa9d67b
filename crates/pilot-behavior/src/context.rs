//! Read-only inputs passed to a pilot every tick.

use pilot_agent::{Agent, PublicStatus, TrafficStore};
use pilot_core::{Tick, VesselId};
use pilot_spatial::{FlatTerrain, NoScenery, SceneryQuery, TerrainQuery};

use crate::{Command, OrbitState, ThreatSignal, WeaponContext};

static NO_COMMAND: Command = Command::None;
static NO_THREAT: ThreatSignal = ThreatSignal::NONE;
static NO_WEAPONS: WeaponContext = WeaponContext::NONE;
static SEA_LEVEL: FlatTerrain = FlatTerrain { height: 0.0, obstacles: Vec::new() };
static NO_SCENERY: NoScenery = NoScenery;

/// A read-only snapshot of everything one controller may consult for one
/// tick.
///
/// The host builds one context per vehicle per tick from its world view.
/// Nothing here is mutated by the pilot; state that persists between ticks
/// lives inside the pilot itself.
///
/// # Lifetimes
///
/// All borrows live for the duration of one tick.
pub struct ControlContext<'a> {
    pub tick: Tick,

    /// Physics step in seconds.
    pub dt: f32,

    /// The controlled vessel.
    pub me: &'a Agent,

    /// Every other vessel this controller can observe.
    pub traffic: &'a TrafficStore,

    /// Target chosen by the targeting collaborator.
    pub target: Option<VesselId>,

    /// Visible hostiles, used to pick a withdrawal direction.
    pub hostiles: &'a [VesselId],

    pub command: &'a Command,
    pub threat:  &'a ThreatSignal,
    pub weapons: &'a WeaponContext,

    /// Orbital variant only.
    pub orbit: Option<&'a OrbitState>,

    pub terrain: &'a dyn TerrainQuery,
    pub scenery: &'a dyn SceneryQuery,
}

impl<'a> ControlContext<'a> {
    /// Context with no target, no command, no threats, no weapons, no orbit,
    /// flat terrain at sea level and no scenery.
    #[inline]
    pub fn new(tick: Tick, dt: f32, me: &'a Agent, traffic: &'a TrafficStore) -> Self {
        Self {
            tick,
            dt,
            me,
            traffic,
            target:   None,
            hostiles: &[],
            command:  &NO_COMMAND,
            threat:   &NO_THREAT,
            weapons:  &NO_WEAPONS,
            orbit:    None,
            terrain:  &SEA_LEVEL,
            scenery:  &NO_SCENERY,
        }
    }

    pub fn with_target(mut self, target: Option<VesselId>) -> Self {
        self.target = target;
        self
    }

    pub fn with_hostiles(mut self, hostiles: &'a [VesselId]) -> Self {
        self.hostiles = hostiles;
        self
    }

    pub fn with_command(mut self, command: &'a Command) -> Self {
        self.command = command;
        self
    }

    pub fn with_threat(mut self, threat: &'a ThreatSignal) -> Self {
        self.threat = threat;
        self
    }

    pub fn with_weapons(mut self, weapons: &'a WeaponContext) -> Self {
        self.weapons = weapons;
        self
    }

    pub fn with_orbit(mut self, orbit: Option<&'a OrbitState>) -> Self {
        self.orbit = orbit;
        self
    }

    pub fn with_world(mut self, terrain: &'a dyn TerrainQuery, scenery: &'a dyn SceneryQuery) -> Self {
        self.terrain = terrain;
        self.scenery = scenery;
        self
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// Public status of the current target, if it is still observable.
    #[inline]
    pub fn target_status(&self) -> Option<PublicStatus> {
        self.target.and_then(|id| self.traffic.get(id))
    }

    /// Public status of the formation leader, if following one.
    #[inline]
    pub fn leader_status(&self) -> Option<PublicStatus> {
        self.command.leader().and_then(|id| self.traffic.get(id))
    }

    /// Nearest visible hostile.
    pub fn nearest_hostile(&self) -> Option<PublicStatus> {
        let here = self.me.position();
        self.hostiles
            .iter()
            .filter_map(|&id| self.traffic.get(id))
            .min_by(|a, b| {
                let da = (a.position() - here).length_squared();
                let db = (b.position() - here).length_squared();
                da.total_cmp(&db)
            })
    }
}
