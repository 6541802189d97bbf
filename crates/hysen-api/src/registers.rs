//! Register codes and limits understood by the controller firmware.

// ── Binary flags ──
pub const OFF: u8 = 0;
pub const ON: u8 = 1;

// ── Operation mode ──
pub const MODE_MANUAL: u8 = 0;
pub const MODE_AUTO: u8 = 1;

// ── Weekly schedule pattern ──
/// Monday–Friday + Saturday/Sunday.
pub const SCHEDULE_12345_67: u8 = 0;
/// Monday–Saturday + Sunday.
pub const SCHEDULE_123456_7: u8 = 1;
/// Same program every day.
pub const SCHEDULE_1234567: u8 = 2;

// ── Sensor selection ──
pub const SENSOR_INTERNAL: u8 = 0;
pub const SENSOR_EXTERNAL: u8 = 1;
/// Internal sensor controls, external sensor acts as a limit.
pub const SENSOR_INT_EXT: u8 = 2;

// ── Clock ──
pub const WEEKDAY_MONDAY: u8 = 1;
pub const WEEKDAY_SUNDAY: u8 = 7;

// ── Limits ──
pub const HYSTERESIS_MIN: u8 = 1;
pub const HYSTERESIS_MAX: u8 = 9;
pub const CALIBRATION_MIN: f32 = -9.0;
pub const CALIBRATION_MAX: f32 = 9.0;
/// Absolute bounds for the max/min/external-max registers.
pub const TEMP_LIMIT_MIN: u8 = 5;
pub const TEMP_LIMIT_MAX: u8 = 99;
/// Bounds for schedule period temperatures.
pub const PERIOD_TEMP_MIN: f32 = 5.0;
pub const PERIOD_TEMP_MAX: f32 = 35.0;
/// Setpoints move in half-degree steps.
pub const TEMP_STEP: f32 = 0.5;

/// Returns `true` for a valid on/off flag.
pub fn is_flag(value: u8) -> bool {
    value == OFF || value == ON
}

/// Returns `true` if `value` sits on the half-degree grid.
pub fn on_half_degree(value: f32) -> bool {
    (value / TEMP_STEP).fract() == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_degree_grid() {
        assert!(on_half_degree(21.5));
        assert!(on_half_degree(-3.0));
        assert!(!on_half_degree(21.25));
    }

    #[test]
    fn flags() {
        assert!(is_flag(OFF));
        assert!(is_flag(ON));
        assert!(!is_flag(2));
    }
}
