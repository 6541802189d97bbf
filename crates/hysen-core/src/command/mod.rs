// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The controller
// plans each variant into an ordered list of gateway writes, runs them, waits
// for the device to settle, and re-reads the full status.

pub mod plan;

use std::sync::Arc;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::model::{
    DeviceClock, HvacMode, KeyLock, OperationMode, PowerState, Preset, SensorType, SlotId,
    StatusSnapshot,
};

pub use plan::{DeviceWrite, Plan, PresetTransition, plan_command};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against one heating controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    // ── Climate ──────────────────────────────────────────────────────
    SetPower(PowerState),
    SetHvacMode(HvacMode),
    SetOperationMode(OperationMode),
    SetTargetTemperature(f32),
    SetPreset(Preset),

    // ── Device settings ──────────────────────────────────────────────
    SetKeyLock(KeyLock),
    SetSensorType(SensorType),
    SetHysteresis(u8),
    SetCalibration(f32),
    SetMaxTemperature(u8),
    SetMinTemperature(u8),
    SetExternalMaxTemperature(u8),
    SetFrostProtection(bool),
    SetPowerOnDefault(bool),

    // ── Schedule ─────────────────────────────────────────────────────
    SetSlotTime { slot: SlotId, time: NaiveTime },
    SetSlotTemperature { slot: SlotId, temperature: f32 },

    // ── Clock ────────────────────────────────────────────────────────
    SetDeviceClock(DeviceClock),
    /// Write the host's local wall-clock time.
    SyncClock,

    /// Re-read status without writing anything.
    Refresh,
}

/// Outcome of a successfully executed command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    /// Every planned write succeeded. `refreshed` is false when the follow-up
    /// status read failed; the cache then keeps its previous snapshot.
    Applied {
        writes: Vec<DeviceWrite>,
        refreshed: bool,
    },
    Refreshed {
        snapshot: Arc<StatusSnapshot>,
    },
}

// ── Validation codes ─────────────────────────────────────────────────

/// Machine-readable reason attached to every validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationCode {
    OutOfRange,
    InvalidStep,
    BelowTarget,
    BelowMinimum,
    AboveTarget,
    AboveMaximum,
    InvalidPreset,
    PresetUnavailable,
    InvalidHvacMode,
    InvalidValue,
    InvalidEntityId,
    NoValidTargets,
    FeatureUnavailable,
    ParameterUnavailable,
    InvalidSlot,
    InvalidTime,
}

/// Parse a schedule time in `HH:MM` or `HH:MM:SS` form. Seconds are dropped.
pub fn parse_slot_time(raw: &str) -> Result<NaiveTime, CoreError> {
    let trimmed = raw.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| {
            CoreError::validation(
                ValidationCode::InvalidTime,
                format!("invalid time '{raw}' (expected HH:MM or HH:MM:SS)"),
            )
        })?;
    Ok(time.with_second(0).unwrap_or(time))
}
