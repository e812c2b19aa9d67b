//! Vector helpers on top of `glam::Vec3`.
//!
//! Angles crossing the public API are in **degrees** unless the name says
//! otherwise; steering tunables, tolerances and limits are all expressed in
//! degrees.  Zero-length inputs never produce NaN: the helpers return the
//! documented neutral value instead.

use glam::{Quat, Vec3};

/// Squared length under which a vector is treated as zero.
pub const EPSILON_SQR: f32 = 1e-10;

// ── Scalars ───────────────────────────────────────────────────────────────────

/// Clamp that tolerates `lo > hi` instead of panicking like `f32::clamp`.
/// With crossed bounds `lo` is tested first: anything below `lo` returns
/// `lo`, anything else above `hi` returns `hi`.
#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

#[inline]
pub fn clamp01(x: f32) -> f32 {
    clamp(x, 0.0, 1.0)
}

/// Linear interpolation with `t` clamped to [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

/// Move `current` toward `target` by at most `max_delta`.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// `+1` for non-negative input, `-1` otherwise.
#[inline]
pub fn sign(x: f32) -> f32 {
    if x >= 0.0 { 1.0 } else { -1.0 }
}

// ── Vectors ───────────────────────────────────────────────────────────────────

/// Remove the component of `v` along `normal`.  `normal` need not be unit
/// length; a zero normal returns `v` unchanged.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let n2 = normal.length_squared();
    if n2 < EPSILON_SQR {
        v
    } else {
        v - normal * (v.dot(normal) / n2)
    }
}

/// Component of `v` along `onto`.
#[inline]
pub fn project(v: Vec3, onto: Vec3) -> Vec3 {
    let n2 = onto.length_squared();
    if n2 < EPSILON_SQR {
        Vec3::ZERO
    } else {
        onto * (v.dot(onto) / n2)
    }
}

/// Unsigned angle between two vectors in degrees; `0` if either is zero.
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < EPSILON_SQR {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Angle from `from` to `to` in degrees, signed positive when `to` leans
/// toward `reference_right`.
pub fn signed_angle_deg(from: Vec3, to: Vec3, reference_right: Vec3) -> f32 {
    angle_deg(from, to) * sign(to.dot(reference_right))
}

/// Reflect `v` about the plane with the given (unit) normal.
#[inline]
pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Rotate `current` toward `target` by at most `max_radians`, while moving its
/// magnitude toward the target's by at most `max_magnitude_delta`.
///
/// Pass `f32::MAX` as the magnitude delta to adopt the target's length, or
/// `0.0` to keep the current length.
pub fn rotate_towards(current: Vec3, target: Vec3, max_radians: f32, max_magnitude_delta: f32) -> Vec3 {
    let cur_mag = current.length();
    let tgt_mag = target.length();
    if cur_mag * cur_mag < EPSILON_SQR || tgt_mag * tgt_mag < EPSILON_SQR {
        let delta = target - current;
        let dist = delta.length();
        if dist <= max_magnitude_delta || dist * dist < EPSILON_SQR {
            return target;
        }
        return current + delta / dist * max_magnitude_delta;
    }

    let from = current / cur_mag;
    let to = target / tgt_mag;
    let new_mag = move_towards(cur_mag, tgt_mag, max_magnitude_delta);
    let angle = from.dot(to).clamp(-1.0, 1.0).acos();
    if angle <= max_radians {
        return to * new_mag;
    }

    let axis = from.cross(to);
    let axis = if axis.length_squared() < EPSILON_SQR {
        from.any_orthonormal_vector()
    } else {
        axis.normalize()
    };
    Quat::from_axis_angle(axis, max_radians) * from * new_mag
}

/// Spherical interpolation from `a` to `b`, `t` clamped to [0, 1].
/// Direction rotates along the great arc; magnitude interpolates linearly.
pub fn slerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    let t = clamp01(t);
    let a_mag = a.length();
    let b_mag = b.length();
    if a_mag * a_mag < EPSILON_SQR || b_mag * b_mag < EPSILON_SQR {
        return a.lerp(b, t);
    }
    let angle = angle_deg(a, b).to_radians();
    let dir = rotate_towards(a / a_mag, b / b_mag, angle * t, 0.0);
    dir * (a_mag + (b_mag - a_mag) * t)
}

/// `true` if every component is finite.
#[inline]
pub fn is_finite(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

// ── Orientation ───────────────────────────────────────────────────────────────

/// Orthonormal body basis of a vessel in world space.
///
/// `nose` is the direction of travel / thrust, `right` the starboard side and
/// `top` the dorsal side.  Angular velocities are reported in this frame as
/// `(pitch about right, roll about nose, yaw about top)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Orientation {
    pub nose:  Vec3,
    pub right: Vec3,
    pub top:   Vec3,
}

impl Orientation {
    /// Build a right-handed basis from a nose direction and an approximate
    /// top direction.  Falls back to any perpendicular when they are parallel.
    pub fn from_nose_top(nose: Vec3, top_hint: Vec3) -> Self {
        let nose = nose.try_normalize().unwrap_or(Vec3::Z);
        let top = project_on_plane(top_hint, nose)
            .try_normalize()
            .unwrap_or_else(|| nose.any_orthonormal_vector());
        let right = top.cross(nose);
        Self { nose, right, top }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self { nose: Vec3::Z, right: Vec3::X, top: Vec3::Y }
    }
}
