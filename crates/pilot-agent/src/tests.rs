//! Unit tests for pilot-agent.

#[cfg(test)]
mod traffic_store {
    use pilot_core::{Vec3, VesselId};

    use crate::{Agent, AgentError, BehaviorState, Kinematics, TrafficStoreBuilder};

    fn agent(id: u32, x: f32) -> Agent {
        Agent {
            id: VesselId(id),
            kinematics: Kinematics::new(Vec3::new(x, 0.0, 0.0), Vec3::Z, Vec3::ZERO),
            ..Agent::default()
        }
    }

    #[test]
    fn rows_are_indexed_by_id() {
        let store = TrafficStoreBuilder::with_capacity(2)
            .push("a", agent(10, 1.0).public_status(None))
            .push("b", agent(20, 2.0).public_status(Some(BehaviorState::Withdrawing)))
            .build()
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.index_of(VesselId(20)), Some(1));
        assert_eq!(store.name_of(VesselId(10)), Some("a"));

        let b = store.get(VesselId(20)).unwrap();
        assert_eq!(b.position(), Vec3::new(2.0, 0.0, 0.0));
        assert!(b.is_withdrawing());
        assert!(store.get(VesselId(30)).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = TrafficStoreBuilder::with_capacity(2)
            .push("a", agent(1, 0.0).public_status(None))
            .push("a again", agent(1, 5.0).public_status(None))
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentError::DuplicateVessel(VesselId(1))));
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let store = TrafficStoreBuilder::with_capacity(3)
            .push("c", agent(3, 0.0).public_status(None))
            .push("a", agent(1, 0.0).public_status(None))
            .push("b", agent(2, 0.0).public_status(None))
            .build()
            .unwrap();
        let ids: Vec<_> = store.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, [3, 1, 2]);
    }
}

#[cfg(test)]
mod kinematics {
    use pilot_core::Vec3;

    use crate::Kinematics;

    #[test]
    fn constant_acceleration_prediction() {
        let k = Kinematics::new(Vec3::ZERO, Vec3::X * 10.0, Vec3::Y * 2.0);
        assert_eq!(k.position_at(2.0), Vec3::new(20.0, 4.0, 0.0));
    }
}
