//! Pairwise vessel encounter prediction.

use pilot_agent::{Agent, PeerKind, PublicStatus, TrafficStore};
use pilot_core::math::move_towards;
use pilot_core::{Vec3, VesselId};

/// A predicted collision with one peer.
#[derive(Clone, Debug, PartialEq)]
pub struct Encounter {
    pub with:  VesselId,
    pub name:  String,
    /// Unit lateral dodge, along our right axis or its opposite.
    pub dodge: Vec3,
}

/// Step both bodies forward under constant acceleration and return a dodge
/// if their separation ever drops below the sum of their radii.
///
/// Sample times run from `min(step, horizon)` in `step` increments and stop
/// short of `horizon`.  The dodge side is the one away from the peer's
/// predicted position, so both parties of a head-on encounter peel off to
/// their own right or left consistently.
pub fn predict_collision(me: &Agent, peer: &PublicStatus, horizon: f32, step: f32) -> Option<Vec3> {
    if !(horizon > 0.0 && step > 0.0) {
        return None;
    }
    let radii = me.radius + peer.radius;
    let right = me.orientation.right;

    let mut t = step.min(horizon);
    while t < horizon {
        let theirs = peer.kinematics.position_at(t);
        let mine = me.kinematics.position_at(t);
        if (theirs - mine).length_squared() < radii * radii {
            return Some(if (theirs - mine).dot(right) > 0.0 { -right } else { right });
        }
        t = move_towards(t, horizon, step);
    }
    None
}

/// `true` for peers that local avoidance must consider.
///
/// Ignored: ourselves, anything lighter than `avoid_mass`, missiles and the
/// incoming missile (evasion handles those), airborne vessels, and vessels
/// following us.  Debris is considered whether or not it is on the ground.
fn is_relevant(me: &Agent, peer: &PublicStatus, avoid_mass: f32, incoming_missile: Option<VesselId>) -> bool {
    if peer.id == me.id || peer.mass < avoid_mass {
        return false;
    }
    if Some(peer.id) == incoming_missile {
        return false;
    }
    match peer.kind {
        PeerKind::Missile => false,
        PeerKind::Debris => true,
        PeerKind::Vessel => peer.grounded && peer.leader != Some(me.id),
    }
}

/// First predicted encounter among `traffic`, in traffic order.
///
/// This is the first hit found, not the nearest or most urgent one.
pub fn scan_vessels(
    me: &Agent,
    traffic: &TrafficStore,
    avoid_mass: f32,
    incoming_missile: Option<VesselId>,
    horizon: f32,
    step: f32,
) -> Option<Encounter> {
    traffic
        .iter()
        .filter(|peer| is_relevant(me, peer, avoid_mass, incoming_missile))
        .find_map(|peer| {
            predict_collision(me, &peer, horizon, step).map(|dodge| Encounter {
                with: peer.id,
                name: traffic.name_of(peer.id).unwrap_or_default().to_owned(),
                dodge,
            })
        })
}
