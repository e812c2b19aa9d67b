//! Fluent builder for [`TrafficStore`].
//!
//! # Usage
//!
//! ```rust
//! use pilot_agent::{Agent, TrafficStoreBuilder};
//!
//! let me = Agent::default();
//! let traffic = TrafficStoreBuilder::with_capacity(1)
//!     .push("alpha", me.public_status(None))
//!     .build()
//!     .unwrap();
//! assert_eq!(traffic.len(), 1);
//! ```

use crate::{AgentError, AgentResult, PublicStatus, TrafficStore};

pub struct TrafficStoreBuilder {
    rows: Vec<(String, PublicStatus)>,
}

impl TrafficStoreBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { rows: Vec::with_capacity(capacity) }
    }

    /// Append one observed vessel.
    pub fn push(mut self, name: impl Into<String>, status: PublicStatus) -> Self {
        self.rows.push((name.into(), status));
        self
    }

    /// Scatter the rows into SoA arrays and index them by id.
    ///
    /// Fails if two rows share a `VesselId`.
    pub fn build(self) -> AgentResult<TrafficStore> {
        let n = self.rows.len();
        let mut store = TrafficStore {
            count:        n,
            id:           Vec::with_capacity(n),
            name:         Vec::with_capacity(n),
            position:     Vec::with_capacity(n),
            velocity:     Vec::with_capacity(n),
            acceleration: Vec::with_capacity(n),
            nose:         Vec::with_capacity(n),
            radius:       Vec::with_capacity(n),
            mass:         Vec::with_capacity(n),
            kind:         Vec::with_capacity(n),
            grounded:     Vec::with_capacity(n),
            behavior:     Vec::with_capacity(n),
            leader:       Vec::with_capacity(n),
            target:       Vec::with_capacity(n),
            index:        Default::default(),
        };

        for (row, (name, s)) in self.rows.into_iter().enumerate() {
            if store.index.insert(s.id, row).is_some() {
                return Err(AgentError::DuplicateVessel(s.id));
            }
            store.id.push(s.id);
            store.name.push(name);
            store.position.push(s.kinematics.position);
            store.velocity.push(s.kinematics.velocity);
            store.acceleration.push(s.kinematics.acceleration);
            store.nose.push(s.nose);
            store.radius.push(s.radius);
            store.mass.push(s.mass);
            store.kind.push(s.kind);
            store.grounded.push(s.grounded);
            store.behavior.push(s.behavior);
            store.leader.push(s.leader);
            store.target.push(s.target);
        }

        Ok(store)
    }
}
