//! Unit and property tests for pilot-predict.

#[cfg(test)]
mod motion_tests {
    use approx::assert_relative_eq;
    use pilot_core::Vec3;

    use crate::{NO_SOLUTION_TIME, displacement, predict_position, solve_time};

    #[test]
    fn projectile_displacement() {
        let d = displacement(Vec3::X * 10.0, Vec3::Y * -10.0, 2.0);
        assert_eq!(d, Vec3::new(20.0, -20.0, 0.0));
        assert_eq!(predict_position(Vec3::ONE, Vec3::ZERO, Vec3::ZERO, 5.0), Vec3::ONE);
    }

    #[test]
    fn solve_time_from_rest() {
        // 50 = ½·1·t² → t = 10
        assert_relative_eq!(solve_time(50.0, 1.0, 0.0), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn solve_time_zero_acceleration_is_guarded() {
        assert_eq!(solve_time(100.0, 0.0, 0.0), NO_SOLUTION_TIME);
        assert_relative_eq!(solve_time(100.0, 0.0, 5.0), 20.0);
        assert!(solve_time(100.0, 1e-9, 0.0).is_finite());
    }
}

#[cfg(test)]
mod cpa_tests {
    use approx::assert_relative_eq;
    use pilot_core::Vec3;
    use proptest::prelude::*;

    use crate::{MAX_CPA_HORIZON, closing_time, time_to_cpa};

    #[test]
    fn head_on_pair() {
        let t = closing_time(Vec3::X * 1000.0, Vec3::X * -100.0, MAX_CPA_HORIZON);
        assert_relative_eq!(t.unwrap(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn diverging_pair_has_no_approach() {
        assert!(closing_time(Vec3::X * 1000.0, Vec3::X * 100.0, MAX_CPA_HORIZON).is_none());
        assert!(closing_time(Vec3::X * 1000.0, Vec3::Y * 100.0, MAX_CPA_HORIZON).is_none());
        assert_eq!(time_to_cpa(Vec3::X * 1000.0, Vec3::X * 100.0, Vec3::ZERO, MAX_CPA_HORIZON), 0.0);
    }

    #[test]
    fn slow_closing_is_not_an_approach() {
        assert!(closing_time(Vec3::X * 1000.0, Vec3::X * -5.0, MAX_CPA_HORIZON).is_none());
    }

    #[test]
    fn horizon_clamps() {
        let t = time_to_cpa(Vec3::X * 1000.0, Vec3::X * -100.0, Vec3::ZERO, 4.0);
        assert_eq!(t, 4.0);
    }

    #[test]
    fn accelerating_pair() {
        // Starts 100 apart at rest, closing at 2 u/s² → meets at t = 10.
        let t = time_to_cpa(Vec3::X * 100.0, Vec3::ZERO, Vec3::X * -2.0, MAX_CPA_HORIZON);
        assert_relative_eq!(t, 10.0, epsilon = 1e-3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Non-closing relative velocity never yields an approach.
        #[test]
        fn prop_non_closing_is_none(
            px in -1000.0f32..1000.0, py in -1000.0f32..1000.0, pz in 10.0f32..1000.0,
            vx in -100.0f32..100.0, vy in -100.0f32..100.0, vz in -100.0f32..100.0,
        ) {
            let p = Vec3::new(px, py, pz);
            let v = Vec3::new(vx, vy, vz);
            prop_assume!(p.dot(v) >= 0.0);
            prop_assert!(closing_time(p, v, MAX_CPA_HORIZON).is_none());
        }

        /// The reported time is a true minimum over sampled alternatives.
        #[test]
        fn prop_cpa_is_minimal(
            px in -1000.0f32..1000.0, py in -1000.0f32..1000.0, pz in -1000.0f32..1000.0,
            vx in -100.0f32..100.0, vy in -100.0f32..100.0, vz in -100.0f32..100.0,
        ) {
            let p = Vec3::new(px, py, pz);
            let v = Vec3::new(vx, vy, vz);
            let t = time_to_cpa(p, v, Vec3::ZERO, 100.0);
            prop_assert!((0.0..=100.0).contains(&t));

            let at = |s: f32| (p + v * s).length();
            let best = at(t);
            for k in 0..=20 {
                let s = k as f32 * 5.0;
                prop_assert!(best <= at(s) + 1e-2 * (1.0 + at(s)), "t={t} best={best} s={s} at={}", at(s));
            }
        }
    }
}

#[cfg(test)]
mod intercept_tests {
    use approx::assert_relative_eq;
    use pilot_agent::{Agent, BehaviorState, Kinematics, PublicStatus};
    use pilot_core::math::angle_deg;
    use pilot_core::{Vec3, VesselId};

    use crate::{
        BurnEstimate, Geometry, angular_velocity_deg, away_check, burn_estimate, can_intercept,
        closest_approach_point, is_near_intercept, near_intercept,
    };

    fn me(velocity: Vec3) -> Agent {
        Agent {
            id: VesselId(0),
            kinematics: Kinematics::new(Vec3::ZERO, velocity, Vec3::ZERO),
            max_acceleration: 10.0,
            max_angular_acceleration: 1.0,
            propulsion: true,
            weapons: true,
            ..Agent::default()
        }
    }

    fn target(position: Vec3, velocity: Vec3) -> PublicStatus {
        let mut t = Agent {
            id: VesselId(1),
            kinematics: Kinematics::new(position, velocity, Vec3::ZERO),
            ..Agent::default()
        }
        .public_status(None);
        t.radius = 5.0;
        t
    }

    #[test]
    fn near_intercept_boundary_is_inclusive() {
        let burn = BurnEstimate { kill_velocity: 6.0, rotate: 4.0 };
        assert!(is_near_intercept(10.0, &burn));
        assert!(is_near_intercept(9.0, &burn));
        assert!(!is_near_intercept(10.001, &burn));
        assert!(!is_near_intercept(0.0, &burn));
    }

    #[test]
    fn burn_estimate_components() {
        // Nose already retrograde to the relative velocity → no rotation.
        let b = burn_estimate(Vec3::Z * 100.0, -Vec3::Z, 10.0, 1.0);
        assert_relative_eq!(b.kill_velocity, 10.0);
        assert_relative_eq!(b.rotate, 0.0);
        // No thrust still yields a finite (huge) estimate.
        assert!(burn_estimate(Vec3::Z, Vec3::Z, 0.0, 0.0).total().is_finite());
    }

    #[test]
    fn far_slow_target_is_not_near() {
        let agent = me(Vec3::ZERO);
        let tgt = target(Vec3::Z * 2000.0, Vec3::ZERO);
        let geom = Geometry::between(&agent, &tgt);
        assert!(!near_intercept(&agent, &geom, 500.0, 1500.0));
    }

    #[test]
    fn fast_close_target_is_near() {
        // Closing at 300 u/s from 1000 out, 10 u/s² → 30 s to stop.
        let agent = me(Vec3::Z * 300.0);
        let tgt = target(Vec3::Z * 1000.0, Vec3::ZERO);
        let geom = Geometry::between(&agent, &tgt);
        assert!(near_intercept(&agent, &geom, 100.0, 1500.0));
    }

    #[test]
    fn lead_point_is_capped_off_line_of_sight() {
        let agent = me(Vec3::new(200.0, 0.0, 50.0));
        let tgt = target(Vec3::Z * 3000.0, Vec3::ZERO);
        let geom = Geometry::between(&agent, &tgt);
        let lead = closest_approach_point(&geom, 500.0, 1500.0);
        assert!(angle_deg(lead, geom.to_target) <= 22.5 + 1e-3);
        assert!(lead.x > 0.0, "offset follows lateral drift");
    }

    #[test]
    fn lead_point_offset_is_symmetric() {
        // Both sides of a mutual engagement see the same closest approach.
        let a = me(Vec3::new(30.0, 0.0, 60.0));
        let b_status = target(Vec3::new(0.0, 0.0, 4000.0), Vec3::new(-30.0, 0.0, -60.0));
        let b = Agent {
            id: b_status.id,
            kinematics: b_status.kinematics,
            ..a.clone()
        };
        let ga = Geometry::between(&a, &b_status);
        let gb = Geometry::between(&b, &a.public_status(None));
        let la = closest_approach_point(&ga, 500.0, 1500.0);
        let lb = closest_approach_point(&gb, 500.0, 1500.0);
        assert_relative_eq!(
            angle_deg(la, ga.to_target),
            angle_deg(lb, gb.to_target),
            epsilon = 1e-3
        );
    }

    #[test]
    fn angular_velocity_of_crossing_target() {
        let geom = Geometry { to_target: Vec3::Z * 100.0, rel_vel: Vec3::X * 100.0, target_accel: Vec3::ZERO };
        assert_relative_eq!(angular_velocity_deg(&geom), 45.0, epsilon = 1e-3);
    }

    #[test]
    fn away_check_when_drifting_inside_min_range() {
        let agent = me(Vec3::ZERO);
        let tgt = target(Vec3::Z * 100.0, Vec3::ZERO);
        let geom = Geometry::between(&agent, &tgt);
        assert!(away_check(&agent, &geom, 500.0));

        // Already separating fast: no manual escape needed.
        let receding = target(Vec3::Z * 100.0, Vec3::Z * 500.0);
        let geom = Geometry::between(&agent, &receding);
        assert!(!away_check(&agent, &geom, 500.0));
    }

    #[test]
    fn withdrawing_target_is_only_chased_when_catchable() {
        let agent = me(Vec3::ZERO);
        let mut tgt = target(Vec3::Z * 5000.0, Vec3::Z * 50.0);
        tgt.behavior = Some(BehaviorState::Withdrawing);
        tgt.kinematics.acceleration = Vec3::Z * 20.0;
        let geom = Geometry::between(&agent, &tgt);
        assert!(!can_intercept(&tgt, &geom, agent.max_acceleration, 1500.0));
        assert!(can_intercept(&tgt, &geom, 30.0, 1500.0));

        tgt.behavior = Some(BehaviorState::Idle);
        assert!(can_intercept(&tgt, &geom, agent.max_acceleration, 1500.0));
    }
}
