// ── Register <-> domain conversion ──
//
// Decoding is total: a register holding a code the firmware never documents
// becomes `None` instead of an error, so one bad register never discards the
// rest of the read.

use chrono::{NaiveTime, Weekday};
use hysen_api::registers;
use hysen_api::{RawPeriod, RawStatus};

use crate::model::{
    DeviceClock, KeyLock, OperationMode, PowerState, Schedule, ScheduleSlot, SchedulePattern,
    SensorType, StatusSnapshot, ValveState,
};

/// Plausible probe range. Readings outside it are treated as sensor faults.
const PROBE_MIN: f32 = -40.0;
const PROBE_MAX: f32 = 120.0;

// ── Decoding ────────────────────────────────────────────────────────

impl From<&RawStatus> for StatusSnapshot {
    fn from(raw: &RawStatus) -> Self {
        Self {
            power: decode_flag(raw.power_state).map(PowerState::from),
            operation_mode: decode_mode(raw.operation_mode),
            manual_in_auto: decode_flag(raw.manual_in_auto),
            valve: decode_flag(raw.valve_state).map(|open| {
                if open {
                    ValveState::Open
                } else {
                    ValveState::Closed
                }
            }),
            room_temp: decode_probe(raw.room_temp),
            external_temp: decode_probe(raw.external_temp),
            target_temp: decode_probe(raw.target_temp),
            max_temp: decode_limit(raw.max_temp),
            min_temp: decode_limit(raw.min_temp),
            external_max_temp: decode_limit(raw.external_max_temp),
            hysteresis: Some(raw.hysteresis).filter(|h| {
                (registers::HYSTERESIS_MIN..=registers::HYSTERESIS_MAX).contains(h)
            }),
            calibration: Some(raw.calibration).filter(|c| {
                c.is_finite() && (registers::CALIBRATION_MIN..=registers::CALIBRATION_MAX).contains(c)
            }),
            frost_protection: decode_flag(raw.frost_protection),
            poweron: decode_flag(raw.poweron),
            key_lock: decode_flag(raw.key_lock).map(|locked| {
                if locked {
                    KeyLock::Locked
                } else {
                    KeyLock::Unlocked
                }
            }),
            sensor: decode_sensor(raw.sensor),
            schedule_pattern: decode_pattern(raw.schedule),
            schedule: Schedule {
                weekday: raw.periods.map(decode_period),
                weekend: raw.we_periods.map(decode_period),
            },
            clock: decode_clock(raw),
            fwversion: Some(raw.fwversion),
            reserved: [Some(raw.unknown1), Some(raw.unknown2), Some(raw.unknown3)],
        }
    }
}

fn decode_flag(value: u8) -> Option<bool> {
    match value {
        registers::OFF => Some(false),
        registers::ON => Some(true),
        _ => None,
    }
}

fn decode_mode(value: u8) -> Option<OperationMode> {
    match value {
        registers::MODE_MANUAL => Some(OperationMode::Manual),
        registers::MODE_AUTO => Some(OperationMode::Auto),
        _ => None,
    }
}

fn decode_sensor(value: u8) -> Option<SensorType> {
    match value {
        registers::SENSOR_INTERNAL => Some(SensorType::Internal),
        registers::SENSOR_EXTERNAL => Some(SensorType::External),
        registers::SENSOR_INT_EXT => Some(SensorType::IntControlExtLimit),
        _ => None,
    }
}

fn decode_pattern(value: u8) -> Option<SchedulePattern> {
    match value {
        registers::SCHEDULE_12345_67 => Some(SchedulePattern::Workdays),
        registers::SCHEDULE_123456_7 => Some(SchedulePattern::Sixdays),
        registers::SCHEDULE_1234567 => Some(SchedulePattern::Fullweek),
        _ => None,
    }
}

fn decode_probe(value: f32) -> Option<f32> {
    Some(value).filter(|v| v.is_finite() && (PROBE_MIN..=PROBE_MAX).contains(v))
}

fn decode_limit(value: u8) -> Option<u8> {
    Some(value).filter(|v| (registers::TEMP_LIMIT_MIN..=registers::TEMP_LIMIT_MAX).contains(v))
}

fn decode_period(raw: RawPeriod) -> ScheduleSlot {
    ScheduleSlot {
        time: NaiveTime::from_hms_opt(u32::from(raw.hour), u32::from(raw.minute), 0),
        temperature: Some(raw.temp).filter(|t| {
            t.is_finite() && (registers::PERIOD_TEMP_MIN..=registers::PERIOD_TEMP_MAX).contains(t)
        }),
    }
}

fn decode_clock(raw: &RawStatus) -> Option<DeviceClock> {
    let time = NaiveTime::from_hms_opt(
        u32::from(raw.clock_hour),
        u32::from(raw.clock_minute),
        u32::from(raw.clock_second),
    )?;
    Some(DeviceClock::new(time, decode_weekday(raw.clock_weekday)?))
}

fn decode_weekday(value: u8) -> Option<Weekday> {
    match value {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

// ── Encoding ────────────────────────────────────────────────────────

pub fn encode_flag(on: bool) -> u8 {
    if on { registers::ON } else { registers::OFF }
}

pub fn encode_power(power: PowerState) -> u8 {
    encode_flag(power == PowerState::On)
}

pub fn encode_mode(mode: OperationMode) -> u8 {
    match mode {
        OperationMode::Manual => registers::MODE_MANUAL,
        OperationMode::Auto => registers::MODE_AUTO,
    }
}

pub fn encode_key_lock(lock: KeyLock) -> u8 {
    encode_flag(lock == KeyLock::Locked)
}

pub fn encode_sensor(sensor: SensorType) -> u8 {
    match sensor {
        SensorType::Internal => registers::SENSOR_INTERNAL,
        SensorType::External => registers::SENSOR_EXTERNAL,
        SensorType::IntControlExtLimit => registers::SENSOR_INT_EXT,
    }
}

pub fn encode_pattern(pattern: SchedulePattern) -> u8 {
    match pattern {
        SchedulePattern::Workdays => registers::SCHEDULE_12345_67,
        SchedulePattern::Sixdays => registers::SCHEDULE_123456_7,
        SchedulePattern::Fullweek => registers::SCHEDULE_1234567,
    }
}
