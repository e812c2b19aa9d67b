//! Avoidance thresholds.
//!
//! Counter levels are in control ticks (50 per second at the default step).
//!
//! ```text
//!       > normal_level   recovering from a stuck reverse, no early reversing
//!   0 ..= normal_level   normal driving
//!  stuck_level .. 0      reversing
//!       < stuck_level    reversing and possibly stuck
//! ```
//!
//! [`AvoidanceConfig::clamped`] keeps the levels in that order and the
//! cadences and horizons positive.

use tracing::warn;

use pilot_core::Diagnostics;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AvoidanceConfig {
    /// Ticks between scans while not actively avoiding.
    pub check_interval_ticks: u32,
    /// Countdown before the first scan.
    pub initial_check_ticks:  u32,

    /// Encounter horizon in seconds before the drift multiplier.
    pub vessel_horizon_secs:  f32,
    /// Sub-step of the encounter horizon.
    pub vessel_step_secs:     f32,

    /// Threat range grows by this many seconds of travel.
    pub threat_range_secs:    f32,
    /// Lower bound of the upper threat-range limit.
    pub threat_range_floor:   f32,

    pub normal_level:         i32,
    pub stuck_level:          i32,
    /// Level set when reversing toward a wall or after the reverse timer.
    pub reverse_abort_level:  i32,
    pub stuck_recovery_level: i32,

    /// Moving reverse ticks allowed with nothing ahead.
    pub reverse_clear_ticks:   u32,
    /// Moving reverse ticks allowed while something is still detected.
    pub reverse_blocked_ticks: u32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            check_interval_ticks:  20,
            initial_check_ticks:   6,
            vessel_horizon_secs:   5.0,
            vessel_step_secs:      0.5,
            threat_range_secs:     10.0,
            threat_range_floor:    200.0,
            normal_level:          100,
            stuck_level:           -250,
            reverse_abort_level:   150,
            stuck_recovery_level:  200,
            reverse_clear_ticks:   150,
            reverse_blocked_ticks: 300,
        }
    }
}

impl AvoidanceConfig {
    /// Encounter horizon for a vehicle with the given drift limit: tighter
    /// turners look further ahead, up to ten times the base.
    pub fn vessel_horizon(&self, max_drift_deg: f32) -> f32 {
        let mult = pilot_core::math::clamp(10.0 / max_drift_deg.max(1e-3), 1.0, 10.0);
        self.vessel_horizon_secs * mult
    }

    /// Copy with cadences, horizons and hysteresis levels pulled into a
    /// usable shape.  Each adjustment is logged at `warn` and counted in
    /// [`Diagnostics::clamped_config`].
    pub fn clamped(mut self, diag: &mut Diagnostics) -> Self {
        let d = Self::default();

        let v = self.check_interval_ticks.max(1);
        fix(&mut self.check_interval_ticks, v, "check_interval_ticks", diag);
        let horizon = finite_in(self.vessel_horizon_secs, d.vessel_horizon_secs, 0.5, 60.0);
        fix(&mut self.vessel_horizon_secs, horizon, "vessel_horizon_secs", diag);
        let step = finite_in(self.vessel_step_secs, d.vessel_step_secs, 0.02, self.vessel_horizon_secs);
        fix(&mut self.vessel_step_secs, step, "vessel_step_secs", diag);
        let secs = finite_in(self.threat_range_secs, d.threat_range_secs, 0.0, 60.0);
        fix(&mut self.threat_range_secs, secs, "threat_range_secs", diag);
        let floor = finite_in(self.threat_range_floor, d.threat_range_floor, 0.0, 10_000.0);
        fix(&mut self.threat_range_floor, floor, "threat_range_floor", diag);

        // stuck < 0 <= normal < abort, recovery
        let v = self.stuck_level.min(-1);
        fix(&mut self.stuck_level, v, "stuck_level", diag);
        let v = self.normal_level.max(0);
        fix(&mut self.normal_level, v, "normal_level", diag);
        let above_normal = self.normal_level.saturating_add(1);
        let v = self.reverse_abort_level.max(above_normal);
        fix(&mut self.reverse_abort_level, v, "reverse_abort_level", diag);
        let v = self.stuck_recovery_level.max(above_normal);
        fix(&mut self.stuck_recovery_level, v, "stuck_recovery_level", diag);

        let v = self.reverse_clear_ticks.max(1);
        fix(&mut self.reverse_clear_ticks, v, "reverse_clear_ticks", diag);
        let blocked = self.reverse_blocked_ticks.max(self.reverse_clear_ticks);
        fix(&mut self.reverse_blocked_ticks, blocked, "reverse_blocked_ticks", diag);
        self
    }
}

fn finite_in(value: f32, default: f32, lo: f32, hi: f32) -> f32 {
    if value.is_finite() { value.clamp(lo, hi.max(lo)) } else { default }
}

fn fix<T>(field: &mut T, clamped: T, name: &'static str, diag: &mut Diagnostics)
where
    T: Copy + PartialEq + std::fmt::Debug,
{
    if *field != clamped {
        warn!(name, value = ?*field, clamped = ?clamped, "avoidance setting out of range");
        diag.clamped_config += 1;
        *field = clamped;
    }
}
