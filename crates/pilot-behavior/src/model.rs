//! The `Pilot` trait — one controller instance per vehicle.

use pilot_agent::BehaviorState;
use pilot_core::Diagnostics;

use crate::{ControlContext, TickReport};

/// A per-vehicle controller.
///
/// The host calls [`step`][Self::step] once per physics tick with a fresh
/// [`ControlContext`].  Each call commits to exactly one [`BehaviorState`]
/// and returns the actuator command for that tick.
///
/// # Ownership
///
/// A pilot owns all of its runtime state (maneuver timers, hysteresis
/// counters, paths, RNG) and is never shared between vehicles.  The loop may
/// step different vehicles' pilots on different threads, so implementations
/// must be `Send`.
///
/// # Example
///
/// ```rust,ignore
/// let mut pilot = OrbitalPilot::new(OrbitalConfig::default(), seed, me.id)?;
/// let ctx = ControlContext::new(tick, dt, &me, &traffic).with_target(Some(enemy));
/// let report = pilot.step(&ctx);
/// apply(report.command);
/// ```
pub trait Pilot: Send {
    /// Run one control tick.
    fn step(&mut self, ctx: &ControlContext<'_>) -> TickReport;

    /// Behavior committed on the most recent tick; what other vessels see
    /// through `PublicStatus`.
    fn behavior(&self) -> BehaviorState;

    /// Degraded-numerics counters accumulated so far.
    fn diagnostics(&self) -> &Diagnostics;

    /// Short label for logs and telemetry.
    fn variant(&self) -> &'static str {
        "custom"
    }
}
