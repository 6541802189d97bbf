// ── Climate view ──
//
// The thermostat as a whole: effective HVAC mode and action, setpoint,
// presets, and the feature set those imply. The derivation functions are
// shared with command planning so validation and display never disagree.

use serde::Serialize;
use strum::IntoEnumIterator;

use super::ParameterView;
use crate::command::Command;
use crate::error::CoreError;
use crate::model::{
    ClimateFeatures, HvacAction, HvacMode, OperationMode, PowerState, Preset, SensorType,
    StatusSnapshot, ValveState,
};
use crate::store::CacheState;

/// Setpoint bounds used when the device has not reported its own.
pub const DEFAULT_MIN_TEMP: f32 = 5.0;
pub const DEFAULT_MAX_TEMP: f32 = 35.0;
pub const TARGET_TEMP_STEP: f32 = 0.5;

// ── Derivations ─────────────────────────────────────────────────────

/// OFF when powered down, HEAT while a manual override runs inside AUTO,
/// otherwise the device's own operation mode.
pub fn effective_mode(snapshot: &StatusSnapshot) -> Option<HvacMode> {
    if snapshot.is_off() {
        return Some(HvacMode::Off);
    }
    if snapshot.in_manual_override() {
        return Some(HvacMode::Heat);
    }
    snapshot.operation_mode.map(|mode| match mode {
        OperationMode::Manual => HvacMode::Heat,
        OperationMode::Auto => HvacMode::Auto,
    })
}

/// Unknown mode or valve state reads as idle.
pub fn hvac_action(snapshot: &StatusSnapshot) -> HvacAction {
    if snapshot.is_off() {
        return HvacAction::Off;
    }
    match (effective_mode(snapshot), snapshot.valve) {
        (None, _) | (_, None | Some(ValveState::Closed)) => HvacAction::Idle,
        (Some(_), Some(ValveState::Open)) => HvacAction::Heating,
    }
}

pub fn features(snapshot: &StatusSnapshot) -> ClimateFeatures {
    let mode = effective_mode(snapshot);
    if snapshot.is_off() || mode == Some(HvacMode::Off) {
        ClimateFeatures::TURN_ON_OFF
    } else if mode == Some(HvacMode::Heat) && !snapshot.in_manual_override() {
        ClimateFeatures::TURN_ON_OFF | ClimateFeatures::TARGET_TEMPERATURE
    } else {
        ClimateFeatures::TURN_ON_OFF
            | ClimateFeatures::TARGET_TEMPERATURE
            | ClimateFeatures::PRESET_MODE
    }
}

/// `Temporary` while an override is active, otherwise the schedule pattern.
pub fn preset(state: &CacheState) -> Option<Preset> {
    if is_temporary(state) {
        return Some(Preset::Temporary);
    }
    state
        .snapshot()
        .and_then(|s| s.schedule_pattern)
        .map(Preset::from)
}

/// Only `Temporary` is listed while an override is active.
pub fn preset_modes(state: &CacheState) -> Vec<Preset> {
    if is_temporary(state) {
        vec![Preset::Temporary]
    } else {
        Preset::schedule_presets()
    }
}

fn is_temporary(state: &CacheState) -> bool {
    state.preset_override == Some(Preset::Temporary)
        || state.snapshot().is_some_and(StatusSnapshot::in_manual_override)
}

/// Probe the thermostat regulates on.
pub fn current_temperature(snapshot: &StatusSnapshot) -> Option<f32> {
    if snapshot.sensor == Some(SensorType::External) {
        snapshot.external_temp
    } else {
        snapshot.room_temp
    }
}

pub fn setpoint_bounds(snapshot: &StatusSnapshot) -> (f32, f32) {
    (
        snapshot.min_temp.map_or(DEFAULT_MIN_TEMP, f32::from),
        snapshot.max_temp.map_or(DEFAULT_MAX_TEMP, f32::from),
    )
}

// ── View ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClimateView;

/// Rendered thermostat state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateState {
    pub available: bool,
    pub hvac_mode: Option<HvacMode>,
    pub hvac_modes: Vec<HvacMode>,
    pub hvac_action: HvacAction,
    pub features: ClimateFeatures,
    pub current_temperature: Option<f32>,
    /// Hidden while the device is not powered.
    pub target_temperature: Option<f32>,
    pub min_temp: f32,
    pub max_temp: f32,
    pub target_temperature_step: f32,
    pub preset: Option<Preset>,
    pub preset_modes: Vec<Preset>,
    pub power: Option<PowerState>,
    pub operation_mode: Option<OperationMode>,
    pub valve: Option<ValveState>,
    pub sensor: Option<SensorType>,
    pub temporary_manual: Option<bool>,
}

/// Changes a user can make through the climate view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClimateRequest {
    TurnOn,
    TurnOff,
    HvacMode(HvacMode),
    Temperature(f32),
    Preset(Preset),
}

impl ParameterView for ClimateView {
    type State = ClimateState;
    type Value = ClimateRequest;

    fn key(&self) -> String {
        "climate".into()
    }

    fn render(&self, state: &CacheState) -> ClimateState {
        let empty = StatusSnapshot::default();
        let snapshot = state.snapshot().unwrap_or(&empty);
        let (min_temp, max_temp) = setpoint_bounds(snapshot);

        ClimateState {
            available: state.is_fresh(),
            hvac_mode: effective_mode(snapshot),
            hvac_modes: HvacMode::iter().collect(),
            hvac_action: hvac_action(snapshot),
            features: features(snapshot),
            current_temperature: current_temperature(snapshot),
            target_temperature: snapshot.target_temp.filter(|_| snapshot.is_on()),
            min_temp,
            max_temp,
            target_temperature_step: TARGET_TEMP_STEP,
            preset: preset(state),
            preset_modes: preset_modes(state),
            power: snapshot.power,
            operation_mode: snapshot.operation_mode,
            valve: snapshot.valve,
            sensor: snapshot.sensor,
            temporary_manual: snapshot.manual_in_auto,
        }
    }

    fn command(&self, value: ClimateRequest) -> Result<Command, CoreError> {
        Ok(match value {
            ClimateRequest::TurnOn => Command::SetPower(PowerState::On),
            ClimateRequest::TurnOff => Command::SetPower(PowerState::Off),
            ClimateRequest::HvacMode(mode) => Command::SetHvacMode(mode),
            ClimateRequest::Temperature(t) => Command::SetTargetTemperature(t),
            ClimateRequest::Preset(p) => Command::SetPreset(p),
        })
    }
}
