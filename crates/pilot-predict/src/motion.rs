//! Constant-acceleration kinematics.

use pilot_core::Vec3;

use crate::NO_SOLUTION_TIME;

/// `d = v·t + ½·a·t²`
#[inline]
pub fn displacement(velocity: Vec3, acceleration: Vec3, t: f32) -> Vec3 {
    velocity * t + 0.5 * acceleration * t * t
}

#[inline]
pub fn predict_position(position: Vec3, velocity: Vec3, acceleration: Vec3, t: f32) -> Vec3 {
    position + displacement(velocity, acceleration, t)
}

/// Time to cover `distance` from `initial_velocity` under constant
/// `acceleration` (positive root of `½·a·t² + v·t - d = 0`).
///
/// Near-zero acceleration degrades to `d / v`, or [`NO_SOLUTION_TIME`] when
/// the distance can never be covered.
pub fn solve_time(distance: f32, acceleration: f32, initial_velocity: f32) -> f32 {
    if acceleration.abs() < 1e-6 {
        if initial_velocity > 1e-6 {
            return (distance / initial_velocity).max(0.0);
        }
        return if distance <= 0.0 { 0.0 } else { NO_SOLUTION_TIME };
    }

    let discriminant = initial_velocity * initial_velocity + 2.0 * acceleration * distance;
    if discriminant < 0.0 {
        return NO_SOLUTION_TIME;
    }
    ((-initial_velocity + discriminant.sqrt()) / acceleration).max(0.0)
}
