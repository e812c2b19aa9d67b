//! A toy world: flat ground with a few buildings, a slice of empty orbit
//! above it, point-mass physics and hit points.

use pilot_agent::{Agent, BehaviorState, TrafficStore, TrafficStoreBuilder};
use pilot_behavior::{
    ActuatorCommand, Command, GunState, OrbitState, OrbitalCommand, SelectedWeapon, SurfaceCommand,
    ThreatSignal, TickReport, WeaponClass, WeaponContext,
};
use pilot_core::math::{angle_deg, project_on_plane, rotate_towards};
use pilot_core::{Orientation, Tick, Vec3, VesselId};
use pilot_sim::{SimError, SimResult, VesselInputs, WorldView};
use pilot_spatial::{FlatTerrain, SceneryQuery, SphereScenery, TerrainQuery};
use tracing::info;

/// Damage per second dealt while firing on a target in range.
const GUN_DPS: f32 = 4.0;

/// Incoming fire is reported when a hostile's nose is within this many
/// degrees of the line to us.
const UNDER_FIRE_CONE_DEG: f32 = 8.0;

/// Fraction of main-engine acceleration available to the auxiliary thrusters.
const RCS_AUTHORITY: f32 = 0.2;

pub struct Craft {
    pub name:     String,
    pub team:     u8,
    pub agent:    Agent,
    pub orbital:  bool,
    /// No pilot logic: drifts as traffic only.
    pub derelict: bool,
    pub command:  Command,
    pub hull:     f32,
    /// Turn rate in degrees per second.
    pub turn_deg: f32,
    behavior:     Option<BehaviorState>,
    pending:      Option<ActuatorCommand>,
}

impl Craft {
    pub fn new(name: &str, team: u8, agent: Agent, orbital: bool) -> Self {
        Self {
            name: name.to_owned(),
            team,
            agent,
            orbital,
            derelict: false,
            command:  Command::None,
            hull:     100.0,
            turn_deg: if orbital { 20.0 } else { 45.0 },
            behavior: None,
            pending:  None,
        }
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }

    pub fn derelict(mut self) -> Self {
        self.derelict = true;
        self
    }

    pub fn alive(&self) -> bool {
        self.hull > 0.0
    }

    /// Last behavior its pilot committed to.
    pub fn behavior(&self) -> Option<BehaviorState> {
        self.behavior
    }
}

pub struct Arena {
    craft:     Vec<Craft>,
    traffic:   TrafficStore,
    terrain:   FlatTerrain,
    scenery:   SphereScenery,
    orbit:     OrbitState,
    gun_range: f32,
}

impl Arena {
    pub fn new(mut craft: Vec<Craft>, scenery: SphereScenery, gun_range: f32) -> SimResult<Self> {
        craft.sort_by_key(|c| c.agent.id);
        let mut arena = Self {
            craft,
            traffic: TrafficStore::default(),
            terrain: FlatTerrain { height: 0.0, obstacles: scenery.buildings.clone() },
            scenery,
            orbit: OrbitState::default(),
            gun_range,
        };
        arena.refresh_traffic()?;
        Ok(arena)
    }

    pub fn craft(&self) -> &[Craft] {
        &self.craft
    }

    fn get(&self, id: VesselId) -> Option<&Craft> {
        self.craft.binary_search_by_key(&id, |c| c.agent.id).ok().map(|i| &self.craft[i])
    }

    /// Live enemies of `me`, nearest first.
    fn hostiles(&self, me: &Craft) -> Vec<&Craft> {
        let here = me.agent.position();
        let mut enemies: Vec<&Craft> = self
            .craft
            .iter()
            .filter(|c| c.alive() && !c.derelict && c.team != me.team && c.orbital == me.orbital)
            .collect();
        enemies.sort_by(|a, b| {
            let da = (a.agent.position() - here).length_squared();
            let db = (b.agent.position() - here).length_squared();
            da.total_cmp(&db)
        });
        enemies
    }

    fn weapons(&self, me: &Craft, target: Option<&Craft>) -> WeaponContext {
        if !me.agent.weapons {
            return WeaponContext::NONE;
        }
        let solution = target.map(|t| (t.agent.position() - me.agent.position()).normalize_or_zero());
        WeaponContext {
            gun_range: self.gun_range,
            selected:  Some(SelectedWeapon {
                class:            WeaponClass::Gun,
                engage_min_range: 0.0,
                engage_max_range: self.gun_range,
            }),
            gun: Some(GunState {
                can_fire_soon:   true,
                max_range:       self.gun_range,
                firing_solution: solution,
                ..GunState::default()
            }),
            missile: None,
        }
    }

    fn threat(&self, me: &Craft, hostiles: &[&Craft]) -> ThreatSignal {
        let here = me.agent.position();
        let shooter = hostiles.iter().find(|h| {
            let to_me = here - h.agent.position();
            h.agent.weapons
                && to_me.length() <= self.gun_range
                && angle_deg(h.agent.orientation.nose, to_me) <= UNDER_FIRE_CONE_DEG
        });
        match shooter {
            Some(s) => ThreatSignal {
                under_fire:      true,
                miss_distance:   me.agent.radius * 2.0,
                miss_time:       1.0,
                threat_position: s.agent.position(),
                threat_source:   Some(s.agent.id),
                ..ThreatSignal::NONE
            },
            None => ThreatSignal::NONE,
        }
    }

    fn refresh_traffic(&mut self) -> SimResult<()> {
        let alive: Vec<&Craft> = self.craft.iter().filter(|c| c.alive()).collect();
        let builder = alive.iter().fold(TrafficStoreBuilder::with_capacity(alive.len()), |b, c| {
            let mut status = c.agent.public_status(c.behavior);
            status.leader = c.command.leader();
            b.push(c.name.clone(), status)
        });
        self.traffic = builder.build().map_err(|e| SimError::World(e.to_string()))?;
        Ok(())
    }

    /// Gun hits: a shooter whose nearest enemy is in range wears it down.
    /// Ground vehicles carry turrets and shoot whenever armed; spacecraft
    /// only while their pilot is in the firing state.
    fn resolve_fire(&mut self, tick: Tick, dt: f32) {
        let mut hits = Vec::new();
        let shooting = |c: &Craft| {
            c.alive() && c.agent.weapons && (!c.orbital || c.behavior == Some(BehaviorState::Firing))
        };
        for c in self.craft.iter().filter(|c| shooting(c)) {
            let nearest = self.hostiles(c).first().map(|t| (t.agent.id, t.agent.position()));
            if let Some((id, at)) = nearest
                && (at - c.agent.position()).length() <= self.gun_range
            {
                hits.push(id);
            }
        }
        for id in hits {
            if let Ok(i) = self.craft.binary_search_by_key(&id, |c| c.agent.id) {
                let target = &mut self.craft[i];
                let was_alive = target.alive();
                target.hull -= GUN_DPS * dt;
                if was_alive && !target.alive() {
                    info!(vessel = %id, name = %target.name, %tick, "destroyed");
                }
            }
        }
    }
}

impl WorldView for Arena {
    fn inputs(&self, vessel: VesselId, _tick: Tick) -> Option<VesselInputs> {
        let me = self.get(vessel).filter(|c| c.alive())?;
        let hostiles = self.hostiles(me);
        let target = hostiles.first().copied();

        let mut input = VesselInputs::new(me.agent.clone());
        input.target = target.map(|t| t.agent.id);
        input.hostiles = hostiles.iter().map(|h| h.agent.id).collect();
        input.command = me.command.clone();
        input.threat = self.threat(me, &hostiles);
        input.weapons = self.weapons(me, target);
        input.orbit = me.orbital.then_some(self.orbit);
        Some(input)
    }

    fn traffic(&self) -> &TrafficStore {
        &self.traffic
    }

    fn terrain(&self) -> &dyn TerrainQuery {
        &self.terrain
    }

    fn scenery(&self) -> &dyn SceneryQuery {
        &self.scenery
    }

    fn apply(&mut self, report: &TickReport, behavior: BehaviorState) {
        if let Ok(i) = self.craft.binary_search_by_key(&report.vessel, |c| c.agent.id) {
            let c = &mut self.craft[i];
            c.behavior = Some(behavior);
            c.pending = Some(report.command);
        }
    }

    fn advance(&mut self, tick: Tick, dt: f32) -> SimResult<()> {
        for c in self.craft.iter_mut().filter(|c| c.alive()) {
            let turn = c.turn_deg.to_radians() * dt;
            match c.pending.take() {
                Some(ActuatorCommand::Surface(cmd)) => drive(&mut c.agent, &cmd, turn, dt),
                Some(ActuatorCommand::Orbital(cmd)) => fly(&mut c.agent, &cmd, turn, dt),
                None => {}
            }
        }
        self.resolve_fire(tick, dt);
        self.refresh_traffic()
    }
}

// ── Physics ───────────────────────────────────────────────────────────────────

/// Ground vehicle: turn toward the commanded direction, accelerate along the
/// nose, stay on the ground plane.
fn drive(agent: &mut Agent, cmd: &SurfaceCommand, turn: f32, dt: f32) {
    let nose = agent.orientation.nose;
    let want = project_on_plane(cmd.target_direction, Vec3::Y).normalize_or_zero();
    let nose = if want == Vec3::ZERO { nose } else { rotate_towards(nose, want, turn, 0.0) };

    let mut speed = agent.velocity().dot(agent.orientation.nose);
    speed += cmd.throttle * agent.max_acceleration * dt;
    if cmd.brakes {
        speed *= 0.9;
    }

    let velocity = nose * speed;
    let mut position = agent.position() + velocity * dt;
    position.y = 0.0;

    agent.kinematics.acceleration = (velocity - agent.velocity()) / dt;
    agent.kinematics.velocity = velocity;
    agent.kinematics.position = position;
    agent.orientation = Orientation::from_nose_top(nose, Vec3::Y);
}

/// Spacecraft: slew toward the commanded attitude, burn the main engine only
/// when aligned, add auxiliary thrust.  No gravity.
fn fly(agent: &mut Agent, cmd: &OrbitalCommand, turn: f32, dt: f32) {
    let want = cmd.attitude.normalize_or_zero();
    let mut nose = agent.orientation.nose;
    if want != Vec3::ZERO {
        nose = rotate_towards(nose, want, turn, 0.0);
    }

    let mut accel = Vec3::ZERO;
    if want != Vec3::ZERO && angle_deg(nose, want) <= cmd.alignment_tolerance_deg {
        accel += nose * cmd.throttle * agent.max_acceleration;
    }
    if cmd.rcs_enabled {
        accel += cmd.rcs_vector.clamp_length_max(1.0) * agent.max_acceleration * RCS_AUTHORITY;
    }

    agent.kinematics.acceleration = accel;
    agent.kinematics.velocity += accel * dt;
    agent.kinematics.position += agent.kinematics.velocity * dt;
    agent.orientation = Orientation::from_nose_top(nose, agent.up);
}
