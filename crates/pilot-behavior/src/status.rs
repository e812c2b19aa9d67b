//! The human-readable status published every tick.

use std::fmt;

use pilot_agent::BehaviorState;

/// Appended to the reason while the gunfire evasion overlay is active.
pub const EVASION_SUFFIX: &str = " & Evading Gunfire";

/// One committed behavior plus the text shown to telemetry and UI.
/// Never fed back into control.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    pub state:           BehaviorState,
    pub reason:          String,
    pub evading_gunfire: bool,
}

impl Status {
    pub fn new(state: BehaviorState, reason: impl Into<String>) -> Self {
        Self { state, reason: reason.into(), evading_gunfire: false }
    }

    pub fn with_evasion(mut self, evading: bool) -> Self {
        self.evading_gunfire = evading;
        self
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)?;
        if self.evading_gunfire {
            f.write_str(EVASION_SUFFIX)?;
        }
        Ok(())
    }
}
