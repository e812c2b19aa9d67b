//! The `Sim` struct and its tick loop.

use pilot_agent::BehaviorState;
use pilot_behavior::{ControlContext, Pilot, TickReport};
use pilot_core::{ControlClock, Diagnostics, LoopConfig, Tick, VesselId};
use tracing::debug;

use crate::{SimObserver, SimResult, VesselInputs, WorldView};

// ── Per-vessel bookkeeping ────────────────────────────────────────────────────

/// One controlled vessel: its pilot plus what the loop remembers about it.
pub(crate) struct VesselSlot {
    id:       VesselId,
    pilot:    Box<dyn Pilot>,
    /// Behavior committed on the previous tick.
    behavior: BehaviorState,
    /// Tick on which `behavior` was entered.
    since:    Tick,
}

impl VesselSlot {
    pub(crate) fn new(id: VesselId, pilot: Box<dyn Pilot>) -> Self {
        let behavior = pilot.behavior();
        Self { id, pilot, behavior, since: Tick::ZERO }
    }
}

/// What one tick produced, handed to the observer after the world is updated.
struct TickOutcome {
    removed:     Vec<VesselId>,
    transitions: Vec<(VesselId, BehaviorState, BehaviorState)>,
    reports:     Vec<TickReport>,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The host control loop.
///
/// `Sim<W>` owns one pilot per vessel and drives the fixed-timestep loop:
///
/// 1. **Inputs** (sequential, ascending `VesselId`): pull each vessel's
///    snapshot from the world.  Vessels whose snapshot is gone are dropped.
/// 2. **Control** (optionally parallel with the `parallel` feature): step
///    every pilot against a read-only [`ControlContext`].
/// 3. **Apply** (sequential, ascending `VesselId`): hand each report to the
///    world together with the pilot's committed behavior.
/// 4. **Advance**: the world integrates one step of `dt`.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<W: WorldView> {
    pub config: LoopConfig,
    pub clock:  ControlClock,
    pub world:  W,

    /// Controlled vessels, sorted by id.
    pub(crate) vessels: Vec<VesselSlot>,
}

impl<W: WorldView> Sim<W> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step_tick(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step_tick(observer)?;
        }
        Ok(())
    }

    /// Ids of the vessels still under control, ascending.
    pub fn vessel_ids(&self) -> impl Iterator<Item = VesselId> + '_ {
        self.vessels.iter().map(|s| s.id)
    }

    pub fn active_count(&self) -> usize {
        self.vessels.len()
    }

    pub fn pilot(&self, vessel: VesselId) -> Option<&dyn Pilot> {
        self.slot(vessel).map(|s| s.pilot.as_ref())
    }

    /// Behavior `vessel` committed on the last tick and the tick it entered
    /// that behavior.
    pub fn behavior(&self, vessel: VesselId) -> Option<(BehaviorState, Tick)> {
        self.slot(vessel).map(|s| (s.behavior, s.since))
    }

    /// Diagnostic counters summed over every vessel still under control.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut total = Diagnostics::default();
        for slot in &self.vessels {
            total.merge(slot.pilot.diagnostics());
        }
        total
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn slot(&self, vessel: VesselId) -> Option<&VesselSlot> {
        self.vessels
            .binary_search_by_key(&vessel, |s| s.id)
            .ok()
            .map(|i| &self.vessels[i])
    }

    fn step_tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let outcome = self.process_tick(now)?;

        for &vessel in &outcome.removed {
            observer.on_vessel_removed(now, vessel);
        }
        for &(vessel, from, to) in &outcome.transitions {
            observer.on_behavior_change(now, vessel, from, to);
        }
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_reports(now, &outcome.reports);
        }
        observer.on_tick_end(now, self.vessels.len());

        self.clock.advance();
        Ok(())
    }

    fn process_tick(&mut self, now: Tick) -> SimResult<TickOutcome> {
        // ── Phase 1: collect inputs, drop vanished vessels ────────────────
        let world = &self.world;
        let mut inputs = Vec::with_capacity(self.vessels.len());
        let mut removed = Vec::new();
        self.vessels.retain(|slot| match world.inputs(slot.id, now) {
            Some(input) => {
                inputs.push(input);
                true
            }
            None => {
                debug!(vessel = %slot.id, tick = %now, variant = slot.pilot.variant(), "vessel left the loop");
                removed.push(slot.id);
                false
            }
        });

        // ── Phase 2: control (produce) ────────────────────────────────────
        let reports = self.compute_reports(now, &inputs);

        // ── Phase 3: apply (consume) ──────────────────────────────────────
        //
        // Reports are in ascending vessel order regardless of how phase 2
        // was scheduled.
        let mut transitions = Vec::new();
        for (slot, report) in self.vessels.iter_mut().zip(&reports) {
            let behavior = slot.pilot.behavior();
            if behavior != slot.behavior {
                debug!(
                    vessel = %slot.id,
                    from   = %slot.behavior,
                    to     = %behavior,
                    held   = now.since(slot.since),
                    "behavior transition"
                );
                transitions.push((slot.id, slot.behavior, behavior));
                slot.behavior = behavior;
                slot.since = now;
            }
            self.world.apply(report, behavior);
        }

        // ── Phase 4: advance the world ────────────────────────────────────
        self.world.advance(now, self.clock.dt)?;

        Ok(TickOutcome { removed, transitions, reports })
    }

    /// Step every pilot once.  With the `parallel` Cargo feature the pilots
    /// run on Rayon's thread pool.
    fn compute_reports(&mut self, now: Tick, inputs: &[VesselInputs]) -> Vec<TickReport> {
        let world = &self.world;
        let dt = self.clock.dt;

        #[cfg(not(feature = "parallel"))]
        {
            self.vessels
                .iter_mut()
                .zip(inputs)
                .map(|(slot, input)| step_pilot(slot.pilot.as_mut(), world, input, now, dt))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.vessels
                .par_iter_mut()
                .zip(inputs.par_iter())
                .map(|(slot, input)| step_pilot(slot.pilot.as_mut(), world, input, now, dt))
                .collect()
        }
    }
}

/// Assemble one vessel's context and run its pilot.
fn step_pilot<W: WorldView>(
    pilot: &mut dyn Pilot,
    world: &W,
    input: &VesselInputs,
    now:   Tick,
    dt:    f32,
) -> TickReport {
    let ctx = ControlContext::new(now, dt, &input.agent, world.traffic())
        .with_target(input.target)
        .with_hostiles(&input.hostiles)
        .with_command(&input.command)
        .with_threat(&input.threat)
        .with_weapons(&input.weapons)
        .with_orbit(input.orbit.as_ref())
        .with_world(world.terrain(), world.scenery());
    pilot.step(&ctx)
}
