// ── Decoded device status ──
//
// StatusSnapshot is the typed form of one `get_status` read. Every field is
// optional: a register the decoder cannot interpret is `None`, never a value
// carried over from an earlier read.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::schedule::{DeviceClock, Schedule};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PowerState {
    Off,
    On,
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationMode {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValveState {
    Closed,
    Open,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum KeyLock {
    Unlocked,
    Locked,
}

/// Which probe the thermostat regulates on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SensorType {
    Internal,
    External,
    /// Internal probe regulates, external probe caps the floor temperature.
    #[serde(rename = "int_control_ext_limit")]
    #[strum(serialize = "int_control_ext_limit")]
    IntControlExtLimit,
}

/// Weekly program layout stored on the device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SchedulePattern {
    /// Monday–Friday program plus a weekend program.
    Workdays,
    /// Monday–Saturday program plus Sunday.
    Sixdays,
    /// One program for all seven days.
    Fullweek,
}

/// One decoded status read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub power: Option<PowerState>,
    pub operation_mode: Option<OperationMode>,
    pub manual_in_auto: Option<bool>,
    pub valve: Option<ValveState>,
    pub room_temp: Option<f32>,
    pub external_temp: Option<f32>,
    pub target_temp: Option<f32>,
    pub max_temp: Option<u8>,
    pub min_temp: Option<u8>,
    pub external_max_temp: Option<u8>,
    pub hysteresis: Option<u8>,
    pub calibration: Option<f32>,
    pub frost_protection: Option<bool>,
    pub poweron: Option<bool>,
    pub key_lock: Option<KeyLock>,
    pub sensor: Option<SensorType>,
    pub schedule_pattern: Option<SchedulePattern>,
    pub schedule: Schedule,
    pub clock: Option<DeviceClock>,
    pub fwversion: Option<u16>,
    /// Vendor-reserved registers, passed through undecoded.
    pub reserved: [Option<u8>; 3],
}

impl StatusSnapshot {
    pub fn is_on(&self) -> bool {
        self.power == Some(PowerState::On)
    }

    pub fn is_off(&self) -> bool {
        self.power == Some(PowerState::Off)
    }

    pub fn in_manual_override(&self) -> bool {
        self.manual_in_auto == Some(true)
    }
}
