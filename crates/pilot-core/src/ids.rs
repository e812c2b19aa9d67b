//! Identifiers for vessels and grid cells.
//!
//! Both are `Copy + Ord + Hash` newtypes over `u32`.  Sorting by `VesselId`
//! fixes the order in which the host loop visits vessels, so it doubles as
//! the tie-break for anything that must be deterministic across runs.

use std::fmt;

/// Identity of a vessel: a controlled vehicle, a peer, a missile or debris.
///
/// Assigned by the host; the core never allocates ids.  `Default` is
/// [`VesselId::INVALID`] so a forgotten id is visible rather than silently 0.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VesselId(pub u32);

impl VesselId {
    pub const INVALID: VesselId = VesselId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for VesselId {
    #[inline]
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<u32> for VesselId {
    #[inline]
    fn from(raw: u32) -> Self {
        VesselId(raw)
    }
}

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() { write!(f, "vessel#{}", self.0) } else { f.write_str("vessel#?") }
    }
}

/// Row-major index of a cell in a `TraversabilityGraph` grid.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellId(pub u32);

impl CellId {
    /// Marks "not reached" in search bookkeeping.
    pub const INVALID: CellId = CellId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Position in per-cell `Vec`s.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {}", self.0)
    }
}
