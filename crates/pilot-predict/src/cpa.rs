//! Time to closest point of approach.

use pilot_core::Vec3;
use pilot_core::math::clamp;

use crate::MIN_CLOSING_SPEED;

/// Time in `[0, max_time]` at which `|rel_pos + rel_vel·t + ½·rel_acc·t²|` is
/// smallest.
///
/// `rel_pos` and `rel_vel` describe the other body relative to the observer.
/// A diverging pair returns `0`.
pub fn time_to_cpa(rel_pos: Vec3, rel_vel: Vec3, rel_acc: Vec3, max_time: f32) -> f32 {
    let a2 = rel_acc.length_squared();
    if a2 < 1e-10 {
        let v2 = rel_vel.length_squared();
        if v2 < 1e-10 {
            return 0.0;
        }
        return clamp(-rel_pos.dot(rel_vel) / v2, 0.0, max_time);
    }

    // d/dt |p + v·t + ½·a·t²|² = 0  →  ½a²·t³ + 1.5(v·a)·t² + (v² + p·a)·t + p·v = 0
    let (roots, n) = cubic_roots(
        0.5 * a2 as f64,
        1.5 * rel_vel.dot(rel_acc) as f64,
        (rel_vel.length_squared() + rel_pos.dot(rel_acc)) as f64,
        rel_pos.dot(rel_vel) as f64,
    );

    let separation = |t: f32| (rel_pos + rel_vel * t + 0.5 * rel_acc * t * t).length_squared();
    let mut best_t = 0.0;
    let mut best_d = separation(0.0);
    let candidates = roots[..n].iter().map(|&r| r as f32).chain(std::iter::once(max_time));
    for t in candidates {
        if !(t.is_finite() && t > 0.0 && t <= max_time) {
            continue;
        }
        let d = separation(t);
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }
    best_t
}

/// Like [`time_to_cpa`] for constant velocity, but answers "no approach"
/// (`None`) unless the pair closes faster than [`MIN_CLOSING_SPEED`].
pub fn closing_time(rel_pos: Vec3, rel_vel: Vec3, max_time: f32) -> Option<f32> {
    let closing_speed = -rel_vel.dot(rel_pos.normalize_or_zero());
    if closing_speed <= MIN_CLOSING_SPEED {
        return None;
    }
    Some(time_to_cpa(rel_pos, rel_vel, Vec3::ZERO, max_time))
}

/// Real roots of `a·x³ + b·x² + c·x + d`.  Degrades to the quadratic or
/// linear case when leading coefficients vanish.
fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> ([f64; 3], usize) {
    const EPS: f64 = 1e-12;
    let mut out = [0.0; 3];

    if a.abs() < EPS {
        if b.abs() < EPS {
            if c.abs() < EPS {
                return (out, 0);
            }
            out[0] = -d / c;
            return (out, 1);
        }
        let disc = c * c - 4.0 * b * d;
        if disc < 0.0 {
            return (out, 0);
        }
        let s = disc.sqrt();
        out[0] = (-c + s) / (2.0 * b);
        out[1] = (-c - s) / (2.0 * b);
        return (out, 2);
    }

    // Depressed cubic t³ + p·t + q with x = t - b/3a.
    let shift = b / (3.0 * a);
    let p = (3.0 * a * c - b * b) / (3.0 * a * a);
    let q = (2.0 * b * b * b - 9.0 * a * b * c + 27.0 * a * a * d) / (27.0 * a * a * a);
    let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    if p.abs() < EPS {
        out[0] = (-q).cbrt() - shift;
        return (out, 1);
    }
    if disc > EPS {
        let s = disc.sqrt();
        out[0] = (-q / 2.0 + s).cbrt() + (-q / 2.0 - s).cbrt() - shift;
        (out, 1)
    } else if disc >= -EPS {
        out[0] = 3.0 * q / p - shift;
        out[1] = -3.0 * q / (2.0 * p) - shift;
        (out, 2)
    } else {
        let m = 2.0 * (-p / 3.0).sqrt();
        let theta = ((3.0 * q / (2.0 * p)) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0).acos() / 3.0;
        for (k, root) in out.iter_mut().enumerate() {
            *root = m * (theta - 2.0 * std::f64::consts::PI * k as f64 / 3.0).cos() - shift;
        }
        (out, 3)
    }
}

#[cfg(test)]
mod cubic_tests {
    use super::cubic_roots;

    #[test]
    fn three_real_roots() {
        // (x - 1)(x - 2)(x + 3) = x³ - 7x + 6
        let (roots, n) = cubic_roots(1.0, 0.0, -7.0, 6.0);
        assert_eq!(n, 3);
        let mut r: Vec<f64> = roots.to_vec();
        r.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((r[0] + 3.0).abs() < 1e-9);
        assert!((r[1] - 1.0).abs() < 1e-9);
        assert!((r[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn single_real_root() {
        // x³ + x - 2 has the single real root 1
        let (roots, n) = cubic_roots(1.0, 0.0, 1.0, -2.0);
        assert_eq!(n, 1);
        assert!((roots[0] - 1.0).abs() < 1e-9);
    }
}
