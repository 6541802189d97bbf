// ── Raw status dump ──
//
// One status read returns every register at once. Values are kept exactly as
// the device reported them; decoding and validation happen in `hysen-core`.

use serde::{Deserialize, Serialize};

use crate::registers;

/// One schedule period as stored on the device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPeriod {
    pub hour: u8,
    pub minute: u8,
    pub temp: f32,
}

impl RawPeriod {
    pub const fn new(hour: u8, minute: u8, temp: f32) -> Self {
        Self { hour, minute, temp }
    }
}

/// Undecoded register values from a single `get_status` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatus {
    pub power_state: u8,
    pub operation_mode: u8,
    pub manual_in_auto: u8,
    pub valve_state: u8,
    pub room_temp: f32,
    pub external_temp: f32,
    pub target_temp: f32,
    pub max_temp: u8,
    pub min_temp: u8,
    pub external_max_temp: u8,
    pub hysteresis: u8,
    pub calibration: f32,
    pub frost_protection: u8,
    pub poweron: u8,
    /// Reserved register that follows the power-on flag.
    #[serde(default)]
    pub unknown1: u8,
    pub key_lock: u8,
    pub sensor: u8,
    pub schedule: u8,
    pub clock_hour: u8,
    pub clock_minute: u8,
    pub clock_second: u8,
    pub clock_weekday: u8,
    pub periods: [RawPeriod; 6],
    pub we_periods: [RawPeriod; 2],
    pub fwversion: u16,
    pub unknown2: u8,
    pub unknown3: u8,
}

impl Default for RawStatus {
    /// Factory state of a freshly reset controller.
    fn default() -> Self {
        Self {
            power_state: registers::ON,
            operation_mode: registers::MODE_MANUAL,
            manual_in_auto: registers::OFF,
            valve_state: registers::OFF,
            room_temp: 20.5,
            external_temp: 0.0,
            target_temp: 20.0,
            max_temp: 35,
            min_temp: 5,
            external_max_temp: 42,
            hysteresis: 2,
            calibration: 0.0,
            frost_protection: registers::ON,
            poweron: registers::OFF,
            unknown1: 0,
            key_lock: registers::OFF,
            sensor: registers::SENSOR_INTERNAL,
            schedule: registers::SCHEDULE_12345_67,
            clock_hour: 0,
            clock_minute: 0,
            clock_second: 0,
            clock_weekday: registers::WEEKDAY_MONDAY,
            periods: [
                RawPeriod::new(6, 0, 20.0),
                RawPeriod::new(8, 0, 15.0),
                RawPeriod::new(11, 30, 15.0),
                RawPeriod::new(12, 30, 15.0),
                RawPeriod::new(17, 30, 22.0),
                RawPeriod::new(22, 0, 15.0),
            ],
            we_periods: [RawPeriod::new(8, 0, 22.0), RawPeriod::new(23, 0, 15.0)],
            fwversion: 49,
            unknown2: 0,
            unknown3: 0,
        }
    }
}
