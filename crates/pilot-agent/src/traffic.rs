//! Structure-of-Arrays storage of every vessel a controller can observe.
//!
//! The host refreshes one `TrafficStore` per tick and shares it read-only
//! with all controllers.  Row `i` of every `Vec` describes the same vessel;
//! `index_of` maps a `VesselId` to its row.

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use pilot_core::{Vec3, VesselId};

use crate::{BehaviorState, Kinematics, PeerKind, PublicStatus};

/// Observed vessels in SoA layout.
///
/// Every `Vec` field has exactly `count` elements.  Build with
/// [`TrafficStoreBuilder`][crate::TrafficStoreBuilder].
#[derive(Debug, Default)]
pub struct TrafficStore {
    pub count: usize,

    pub id:       Vec<VesselId>,
    pub name:     Vec<String>,

    // ── Kinematics ────────────────────────────────────────────────────────
    pub position:     Vec<Vec3>,
    pub velocity:     Vec<Vec3>,
    pub acceleration: Vec<Vec3>,
    pub nose:         Vec<Vec3>,

    // ── Physical ──────────────────────────────────────────────────────────
    pub radius:   Vec<f32>,
    pub mass:     Vec<f32>,
    pub kind:     Vec<PeerKind>,
    pub grounded: Vec<bool>,

    // ── Public controller state ───────────────────────────────────────────
    pub behavior: Vec<Option<BehaviorState>>,
    pub leader:   Vec<Option<VesselId>>,
    pub target:   Vec<Option<VesselId>>,

    pub(crate) index: HashMap<VesselId, usize>,
}

impl TrafficStore {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn index_of(&self, id: VesselId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Assemble the public view of row `i`.
    ///
    /// # Panics
    /// Panics if `i >= count`.
    pub fn status_at(&self, i: usize) -> PublicStatus {
        PublicStatus {
            id:         self.id[i],
            kinematics: Kinematics::new(self.position[i], self.velocity[i], self.acceleration[i]),
            nose:       self.nose[i],
            radius:     self.radius[i],
            mass:       self.mass[i],
            kind:       self.kind[i],
            grounded:   self.grounded[i],
            behavior:   self.behavior[i],
            leader:     self.leader[i],
            target:     self.target[i],
        }
    }

    /// Public view of `id`, or `None` if it is not (or no longer) observed.
    pub fn get(&self, id: VesselId) -> Option<PublicStatus> {
        self.index_of(id).map(|i| self.status_at(i))
    }

    pub fn name_of(&self, id: VesselId) -> Option<&str> {
        self.index_of(id).map(|i| self.name[i].as_str())
    }

    /// Iterate all rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = PublicStatus> + '_ {
        (0..self.count).map(|i| self.status_at(i))
    }
}
