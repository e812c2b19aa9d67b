//! An ordered waypoint list consumed one point at a time.

use pilot_core::Vec3;

/// Waypoints toward a destination.  Never empty: the last point is always the
/// exact destination the path was planned for.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointPath {
    points: Vec<Vec3>,
    cursor: usize,
}

impl WaypointPath {
    /// Path made of `points`, with `destination` appended unless it is
    /// already the last point.
    pub fn new(mut points: Vec<Vec3>, destination: Vec3) -> Self {
        if points.last() != Some(&destination) {
            points.push(destination);
        }
        Self { points, cursor: 0 }
    }

    /// Single-segment path straight to `destination`.
    pub fn direct(destination: Vec3) -> Self {
        Self { points: vec![destination], cursor: 0 }
    }

    /// The waypoint currently being steered for.
    #[inline]
    pub fn current(&self) -> Vec3 {
        self.points[self.cursor]
    }

    #[inline]
    pub fn destination(&self) -> Vec3 {
        self.points[self.points.len() - 1]
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.cursor + 1 == self.points.len()
    }

    /// Waypoints not yet consumed, the current one included.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.points.len() - self.cursor
    }

    /// Move on to the next waypoint.  Returns `false` (and stays put) when
    /// already on the final one.
    pub fn advance(&mut self) -> bool {
        if self.is_final() {
            false
        } else {
            self.cursor += 1;
            true
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Unconsumed waypoints.
    pub fn upcoming(&self) -> &[Vec3] {
        &self.points[self.cursor..]
    }
}
