//! Weapon context supplied by the weapon/targeting collaborator.

use pilot_core::Vec3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponClass {
    Gun,
    Rocket,
    Laser,
    Missile,
    Torpedo,
}

impl WeaponClass {
    /// Ballistic or beam weapons aimed by pointing the hull or a turret.
    #[inline]
    pub fn is_projectile(self) -> bool {
        matches!(self, WeaponClass::Gun | WeaponClass::Rocket | WeaponClass::Laser)
    }
}

/// The selected weapon and its engagement envelope.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectedWeapon {
    pub class:            WeaponClass,
    pub engage_min_range: f32,
    pub engage_max_range: f32,
}

/// State of the current gun.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GunState {
    /// Will be able to fire within the next few ticks.
    pub can_fire_soon:    bool,
    pub max_range:        f32,
    /// World-space aim direction that puts rounds on target, once solved.
    pub firing_solution:  Option<Vec3>,
    pub bullet_velocity:  f32,
    /// Fixed mount (no yaw or pitch freedom): the hull must do the aiming.
    pub fixed:            bool,
}

impl Default for GunState {
    fn default() -> Self {
        Self {
            can_fire_soon:   false,
            max_range:       0.0,
            firing_solution: None,
            bullet_velocity: 1000.0,
            fixed:           false,
        }
    }
}

/// State of the current missile.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MissileState {
    /// The launch has already been cleared; no aiming needed.
    pub launch_authorized: bool,
    /// Aim direction for launch, once solved.
    pub fire_solution:     Option<Vec3>,
}

/// What the weapon collaborator reports this tick.  Whether the vessel has
/// any weapons at all is part of the [`Agent`][pilot_agent::Agent] snapshot.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponContext {
    /// Engagement range the targeting collaborator uses for guns.
    pub gun_range: f32,
    pub selected:  Option<SelectedWeapon>,
    pub gun:       Option<GunState>,
    pub missile:   Option<MissileState>,
}

impl WeaponContext {
    pub const NONE: WeaponContext = WeaponContext { gun_range: 0.0, selected: None, gun: None, missile: None };

    pub fn selected_class(&self) -> Option<WeaponClass> {
        self.selected.map(|w| w.class)
    }
}
