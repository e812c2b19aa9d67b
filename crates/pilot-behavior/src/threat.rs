//! Threat picture supplied by the weapon/targeting collaborator.

use pilot_core::{Vec3, VesselId};

/// A missile tracked as inbound on us.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncomingMissile {
    pub id:             VesselId,
    pub position:       Vec3,
    pub velocity:       Vec3,
    /// Estimated seconds to impact.
    pub time_to_impact: f32,
    pub distance:       f32,
}

/// Everything the controller is told about threats this tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreatSignal {
    pub incoming_missile: Option<IncomingMissile>,
    /// Time-to-impact at or below which missile evasion starts.
    pub evade_threshold:  f32,
    /// Rounds are passing close by.
    pub under_fire:       bool,
    /// Closest predicted miss distance of incoming fire.
    pub miss_distance:    f32,
    /// Time until that closest miss.
    pub miss_time:        f32,
    /// Where incoming fire originates.
    pub threat_position:  Vec3,
    /// Vessel firing on us, when known.
    pub threat_source:    Option<VesselId>,
}

impl ThreatSignal {
    pub const NONE: ThreatSignal = ThreatSignal {
        incoming_missile: None,
        evade_threshold:  0.0,
        under_fire:       false,
        miss_distance:    0.0,
        miss_time:        0.0,
        threat_position:  Vec3::ZERO,
        threat_source:    None,
    };

    #[inline]
    pub fn missile_incoming(&self) -> bool {
        self.incoming_missile.is_some()
    }

    /// The incoming missile, if it is close enough in time to dodge now.
    pub fn missile_to_evade(&self) -> Option<&IncomingMissile> {
        self.incoming_missile.as_ref().filter(|m| m.time_to_impact <= self.evade_threshold)
    }

    /// Squared distance from `from` to the source of incoming fire.
    #[inline]
    pub fn threat_distance_sqr(&self, from: Vec3) -> f32 {
        (self.threat_position - from).length_squared()
    }

    pub fn missile_distance(&self) -> Option<f32> {
        self.incoming_missile.map(|m| m.distance)
    }
}
