//! Directives from the command layer.

use pilot_core::{Vec3, VesselId};

/// The current external directive.  The controller reads it every tick; the
/// command layer may change it at any time.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Free: engage whatever the targeting collaborator selects.
    #[default]
    None,
    /// Travel to a world position.
    MoveTo(Vec3),
    /// Hold a formation slot on a leader.
    Follow {
        leader: VesselId,
        /// Slot in the leader's frame: `x` right, `y` up, `z` forward.
        offset: Vec3,
    },
    /// Travel to a world position at attack speed.
    Attack(Vec3),
    /// Drive a waypoint course, `laps` times round.
    RunWaypoints { points: Vec<Vec3>, laps: u32 },
}

impl Command {
    #[inline]
    pub fn leader(&self) -> Option<VesselId> {
        match self {
            Command::Follow { leader, .. } => Some(*leader),
            _ => None,
        }
    }

    /// Fixed world destination, if the directive has one.
    pub fn destination(&self) -> Option<Vec3> {
        match self {
            Command::MoveTo(p) | Command::Attack(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::None                => "none",
            Command::MoveTo(_)           => "move_to",
            Command::Follow { .. }       => "follow",
            Command::Attack(_)           => "attack",
            Command::RunWaypoints { .. } => "run_waypoints",
        }
    }
}
