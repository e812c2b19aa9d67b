//! A pilot that never does anything.

use pilot_agent::BehaviorState;
use pilot_core::Diagnostics;

use crate::{ActuatorCommand, ControlContext, OrbitalCommand, Pilot, Status, TickReport};

/// A [`Pilot`] that always reports `Idle` with zero throttle.
///
/// Useful as a placeholder in tests or for inert hulks that only need to be
/// present as traffic.
#[derive(Clone, Debug, Default)]
pub struct IdlePilot {
    diag: Diagnostics,
}

impl Pilot for IdlePilot {
    fn step(&mut self, ctx: &ControlContext<'_>) -> TickReport {
        TickReport {
            vessel:  ctx.me.id,
            status:  Status::new(BehaviorState::Idle, "Idle"),
            command: ActuatorCommand::Orbital(OrbitalCommand::default()),
            debug:   Vec::new(),
        }
    }

    fn behavior(&self) -> BehaviorState {
        BehaviorState::Idle
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    fn variant(&self) -> &'static str {
        "idle"
    }
}
