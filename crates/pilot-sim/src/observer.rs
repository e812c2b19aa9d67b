//! Hooks for watching the control loop: telemetry, logs, test probes.

use pilot_agent::BehaviorState;
use pilot_behavior::TickReport;
use pilot_core::{Tick, VesselId};

/// Callbacks from [`Sim`][crate::Sim] as each tick runs.  Every method is a
/// no-op by default.
///
/// # Example — behavior log
///
/// ```rust,ignore
/// struct Transitions;
///
/// impl SimObserver for Transitions {
///     fn on_behavior_change(&mut self, tick: Tick, vessel: VesselId, from: BehaviorState, to: BehaviorState) {
///         println!("{tick} {vessel}: {from} -> {to}");
///     }
/// }
/// ```
pub trait SimObserver {
    /// Before inputs are collected.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// A vessel's world snapshot disappeared; its pilot has been dropped.
    fn on_vessel_removed(&mut self, _tick: Tick, _vessel: VesselId) {}

    /// A pilot committed to a different behavior than on its previous tick.
    fn on_behavior_change(
        &mut self,
        _tick:   Tick,
        _vessel: VesselId,
        _from:   BehaviorState,
        _to:     BehaviorState,
    ) {}

    /// Every `config.output_interval_ticks` ticks, after the world has
    /// advanced.  Reports are in ascending vessel order.
    fn on_reports(&mut self, _tick: Tick, _reports: &[TickReport]) {}

    /// Last hook of the tick; `active` counts vessels still under control.
    fn on_tick_end(&mut self, _tick: Tick, _active: usize) {}

    /// Once, from `run`, after `end_tick` is reached.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// Ignores everything.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
