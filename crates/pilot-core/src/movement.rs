//! Movement class of a surface vehicle.
//!
//! The class decides which terrain a vehicle may cross and therefore keys the
//! `TraversabilityGraph` together with the slope limit.  Orbital vehicles do
//! not use it.

/// What kind of surface a vehicle can drive on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementClass {
    /// Fixed emplacement; never moves, only aims.
    Stationary,
    #[default]
    Land,
    Water,
    /// Land or water.
    Amphibious,
    /// Water only, may dive.
    Submarine,
}

impl MovementClass {
    #[inline]
    pub fn is_mobile(self) -> bool {
        !matches!(self, MovementClass::Stationary)
    }

    #[inline]
    pub fn crosses_land(self) -> bool {
        matches!(self, MovementClass::Land | MovementClass::Amphibious)
    }

    #[inline]
    pub fn crosses_water(self) -> bool {
        matches!(self, MovementClass::Water | MovementClass::Amphibious | MovementClass::Submarine)
    }

    /// Human-readable label, useful for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            MovementClass::Stationary => "stationary",
            MovementClass::Land       => "land",
            MovementClass::Water      => "water",
            MovementClass::Amphibious => "amphibious",
            MovementClass::Submarine  => "submarine",
        }
    }
}

impl std::fmt::Display for MovementClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
