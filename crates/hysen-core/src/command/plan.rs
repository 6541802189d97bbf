// ── Command planning ──
//
// Turns a `Command` plus the current cache into the ordered gateway writes
// that implement it. Everything here is pure: validation reads the cache,
// never the device, so a rejected command makes no device contact.

use chrono::Timelike;
use hysen_api::{HeatingDevice, Operation, registers};
use serde::Serialize;

use super::{Command, ValidationCode};
use crate::convert::{
    encode_flag, encode_key_lock, encode_mode, encode_pattern, encode_power, encode_sensor,
};
use crate::error::CoreError;
use crate::model::{
    ClimateFeatures, DeviceClock, HvacMode, KeyLock, OperationMode, PowerState, Preset,
    SchedulePattern, SensorType, SlotId, StatusSnapshot,
};
use crate::store::CacheState;
use crate::view::climate::{effective_mode, features, preset_modes, setpoint_bounds};

/// One gateway call, with domain-typed arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "write", content = "value", rename_all = "snake_case")]
pub enum DeviceWrite {
    Power(PowerState),
    OperationMode(OperationMode),
    TargetTemp(f32),
    WeeklySchedule(SchedulePattern),
    KeyLock(KeyLock),
    Sensor(SensorType),
    Hysteresis(u8),
    Calibration(f32),
    MaxTemp(u8),
    MinTemp(u8),
    ExternalMaxTemp(u8),
    FrostProtection(bool),
    PowerOn(bool),
    /// Partial slot update; `None` fields are left as they are.
    Period {
        slot: SlotId,
        hour: Option<u8>,
        minute: Option<u8>,
        temp: Option<f32>,
    },
    Time(DeviceClock),
}

impl DeviceWrite {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Power(_) => Operation::SetPower,
            Self::OperationMode(_) => Operation::SetOperationMode,
            Self::TargetTemp(_) => Operation::SetTargetTemp,
            Self::WeeklySchedule(_) => Operation::SetWeeklySchedule,
            Self::KeyLock(_) => Operation::SetKeyLock,
            Self::Sensor(_) => Operation::SetSensor,
            Self::Hysteresis(_) => Operation::SetHysteresis,
            Self::Calibration(_) => Operation::SetCalibration,
            Self::MaxTemp(_) => Operation::SetMaxTemp,
            Self::MinTemp(_) => Operation::SetMinTemp,
            Self::ExternalMaxTemp(_) => Operation::SetExternalMaxTemp,
            Self::FrostProtection(_) => Operation::SetFrostProtection,
            Self::PowerOn(_) => Operation::SetPoweron,
            Self::Period { .. } => Operation::SetPeriod,
            Self::Time(_) => Operation::SetTime,
        }
    }

    /// Issue the call. Blocks for as long as the gateway does.
    pub fn apply(&self, device: &dyn HeatingDevice) -> Result<(), hysen_api::Error> {
        match self {
            Self::Power(p) => device.set_power(encode_power(*p)),
            Self::OperationMode(m) => device.set_operation_mode(encode_mode(*m)),
            Self::TargetTemp(t) => device.set_target_temp(*t),
            Self::WeeklySchedule(p) => device.set_weekly_schedule(encode_pattern(*p)),
            Self::KeyLock(l) => device.set_key_lock(encode_key_lock(*l)),
            Self::Sensor(s) => device.set_sensor(encode_sensor(*s)),
            Self::Hysteresis(h) => device.set_hysteresis(*h),
            Self::Calibration(c) => device.set_calibration(*c),
            Self::MaxTemp(t) => device.set_max_temp(*t),
            Self::MinTemp(t) => device.set_min_temp(*t),
            Self::ExternalMaxTemp(t) => device.set_external_max_temp(*t),
            Self::FrostProtection(on) => device.set_frost_protection(encode_flag(*on)),
            Self::PowerOn(on) => device.set_poweron(encode_flag(*on)),
            Self::Period {
                slot,
                hour,
                minute,
                temp,
            } => device.set_period(slot.period(), *hour, *minute, *temp),
            Self::Time(clock) => device.set_time(
                clock.hour(),
                clock.minute(),
                clock.second(),
                clock.weekday_code(),
            ),
        }
    }
}

/// What a successful command does to the synthetic preset override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresetTransition {
    #[default]
    Keep,
    /// A setpoint was written while following the schedule.
    EnterTemporary,
    /// AUTO or a schedule preset was explicitly chosen.
    Restore,
}

/// Validated writes for one command.
///
/// `writes` run in order and abort on the first error. `follow_up` runs
/// once they have all succeeded; a failed follow-up still lets the cache
/// refresh, since the device already holds the primary change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    pub writes: Vec<DeviceWrite>,
    pub follow_up: Vec<DeviceWrite>,
    pub preset: PresetTransition,
}

impl Plan {
    fn single(write: DeviceWrite) -> Self {
        Self {
            writes: vec![write],
            ..Self::default()
        }
    }

    fn with_preset(mut self, preset: PresetTransition) -> Self {
        self.preset = preset;
        self
    }
}

/// Validate `command` against the cache and lay out its writes.
///
/// `SyncClock` reads the host clock here, so the planned time is the one
/// written.
pub fn plan_command(command: &Command, state: &CacheState) -> Result<Plan, CoreError> {
    if matches!(command, Command::Refresh) {
        return Ok(Plan::default());
    }
    let snapshot = state.snapshot().ok_or(CoreError::NotReady)?;

    let plan = match command {
        Command::Refresh => Plan::default(),

        // ── Climate ──
        Command::SetPower(power) => Plan::single(DeviceWrite::Power(*power)),
        Command::SetHvacMode(mode) => plan_hvac_mode(*mode, snapshot),
        Command::SetOperationMode(mode) => {
            let plan = Plan::single(DeviceWrite::OperationMode(*mode));
            if *mode == OperationMode::Auto {
                plan.with_preset(PresetTransition::Restore)
            } else {
                plan
            }
        }
        Command::SetTargetTemperature(temp) => plan_target_temp(*temp, snapshot)?,
        Command::SetPreset(preset) => plan_preset(*preset, state, snapshot)?,

        // ── Device settings ──
        Command::SetKeyLock(lock) => Plan::single(DeviceWrite::KeyLock(*lock)),
        Command::SetSensorType(sensor) => Plan::single(DeviceWrite::Sensor(*sensor)),
        Command::SetHysteresis(value) => {
            check_range(
                "hysteresis",
                f32::from(*value),
                f32::from(registers::HYSTERESIS_MIN),
                f32::from(registers::HYSTERESIS_MAX),
            )?;
            Plan::single(DeviceWrite::Hysteresis(*value))
        }
        Command::SetCalibration(value) => {
            check_range(
                "calibration",
                *value,
                registers::CALIBRATION_MIN,
                registers::CALIBRATION_MAX,
            )?;
            check_step("calibration", *value)?;
            Plan::single(DeviceWrite::Calibration(*value))
        }
        Command::SetMaxTemperature(value) => plan_max_temp(*value, state, snapshot)?,
        Command::SetMinTemperature(value) => plan_min_temp(*value, state, snapshot)?,
        Command::SetExternalMaxTemperature(value) => {
            check_limit("external max temperature", *value)?;
            Plan::single(DeviceWrite::ExternalMaxTemp(*value))
        }
        Command::SetFrostProtection(on) => Plan::single(DeviceWrite::FrostProtection(*on)),
        Command::SetPowerOnDefault(on) => Plan::single(DeviceWrite::PowerOn(*on)),

        // ── Schedule ──
        Command::SetSlotTime { slot, time } => schedule_write(
            DeviceWrite::Period {
                slot: *slot,
                hour: u8::try_from(time.hour()).ok(),
                minute: u8::try_from(time.minute()).ok(),
                temp: None,
            },
            snapshot,
        ),
        Command::SetSlotTemperature { slot, temperature } => {
            check_range(
                "slot temperature",
                *temperature,
                registers::PERIOD_TEMP_MIN,
                registers::PERIOD_TEMP_MAX,
            )?;
            check_step("slot temperature", *temperature)?;
            schedule_write(
                DeviceWrite::Period {
                    slot: *slot,
                    hour: None,
                    minute: None,
                    temp: Some(*temperature),
                },
                snapshot,
            )
        }

        // ── Clock ──
        Command::SetDeviceClock(clock) => Plan::single(DeviceWrite::Time(*clock)),
        Command::SyncClock => Plan::single(DeviceWrite::Time(local_clock())),
    };
    Ok(plan)
}

fn plan_hvac_mode(mode: HvacMode, snapshot: &StatusSnapshot) -> Plan {
    let operation_mode = match mode {
        HvacMode::Off => return Plan::single(DeviceWrite::Power(PowerState::Off)),
        HvacMode::Heat => OperationMode::Manual,
        HvacMode::Auto => OperationMode::Auto,
    };

    let mut writes = Vec::with_capacity(2);
    if snapshot.is_off() {
        writes.push(DeviceWrite::Power(PowerState::On));
    }
    writes.push(DeviceWrite::OperationMode(operation_mode));
    Plan {
        writes,
        preset: if mode == HvacMode::Auto {
            PresetTransition::Restore
        } else {
            PresetTransition::Keep
        },
        follow_up: Vec::new(),
    }
}

fn plan_target_temp(temp: f32, snapshot: &StatusSnapshot) -> Result<Plan, CoreError> {
    if !features(snapshot).contains(ClimateFeatures::TARGET_TEMPERATURE) {
        return Err(CoreError::validation(
            ValidationCode::FeatureUnavailable,
            "target temperature cannot be set while the thermostat is off",
        ));
    }
    let (min, max) = setpoint_bounds(snapshot);
    check_range("target temperature", temp, min, max)?;
    check_step("target temperature", temp)?;

    let plan = Plan::single(DeviceWrite::TargetTemp(temp));
    Ok(if effective_mode(snapshot) == Some(HvacMode::Auto) {
        plan.with_preset(PresetTransition::EnterTemporary)
    } else {
        plan
    })
}

fn plan_preset(
    preset: Preset,
    state: &CacheState,
    snapshot: &StatusSnapshot,
) -> Result<Plan, CoreError> {
    let Some(pattern) = preset.pattern() else {
        return Err(CoreError::validation(
            ValidationCode::InvalidPreset,
            format!("{preset} is a derived state and cannot be selected"),
        ));
    };
    if !features(snapshot).contains(ClimateFeatures::PRESET_MODE) {
        return Err(CoreError::validation(
            ValidationCode::FeatureUnavailable,
            "presets are only available while following the schedule",
        ));
    }
    if !preset_modes(state).contains(&preset) {
        return Err(CoreError::validation(
            ValidationCode::PresetUnavailable,
            format!("{preset} is not selectable until AUTO is re-selected"),
        ));
    }
    Ok(Plan::single(DeviceWrite::WeeklySchedule(pattern)).with_preset(PresetTransition::Restore))
}

fn plan_max_temp(value: u8, state: &CacheState, snapshot: &StatusSnapshot) -> Result<Plan, CoreError> {
    check_bounds_writable("max temperature", state, snapshot)?;
    check_limit("max temperature", value)?;
    let bound = f32::from(value);
    if let Some(target) = snapshot.target_temp.filter(|t| bound < *t) {
        return Err(CoreError::validation(
            ValidationCode::BelowTarget,
            format!("max temperature {value} is below the current target {target}"),
        ));
    }
    if let Some(min) = snapshot.min_temp.filter(|m| value < *m) {
        return Err(CoreError::validation(
            ValidationCode::BelowMinimum,
            format!("max temperature {value} is below the current minimum {min}"),
        ));
    }
    Ok(Plan::single(DeviceWrite::MaxTemp(value)))
}

fn plan_min_temp(value: u8, state: &CacheState, snapshot: &StatusSnapshot) -> Result<Plan, CoreError> {
    check_bounds_writable("min temperature", state, snapshot)?;
    check_limit("min temperature", value)?;
    let bound = f32::from(value);
    if let Some(target) = snapshot.target_temp.filter(|t| bound > *t) {
        return Err(CoreError::validation(
            ValidationCode::AboveTarget,
            format!("min temperature {value} is above the current target {target}"),
        ));
    }
    if let Some(max) = snapshot.max_temp.filter(|m| value > *m) {
        return Err(CoreError::validation(
            ValidationCode::AboveMaximum,
            format!("min temperature {value} is above the current maximum {max}"),
        ));
    }
    Ok(Plan::single(DeviceWrite::MinTemp(value)))
}

/// Slot writes in pure AUTO only take effect once the mode is re-asserted.
fn schedule_write(write: DeviceWrite, snapshot: &StatusSnapshot) -> Plan {
    let mut plan = Plan::single(write);
    if snapshot.operation_mode == Some(OperationMode::Auto)
        && snapshot.manual_in_auto == Some(false)
    {
        plan.follow_up.push(DeviceWrite::OperationMode(OperationMode::Auto));
    }
    plan
}

fn local_clock() -> DeviceClock {
    use chrono::Datelike;

    let now = chrono::Local::now().naive_local();
    DeviceClock::new(now.time(), now.weekday())
}

// ── Checks ──────────────────────────────────────────────────────────

fn check_bounds_writable(
    name: &str,
    state: &CacheState,
    snapshot: &StatusSnapshot,
) -> Result<(), CoreError> {
    if !state.refresh.last_update_success || snapshot.is_off() {
        return Err(CoreError::validation(
            ValidationCode::ParameterUnavailable,
            format!("{name} cannot be changed while the thermostat is off or unreachable"),
        ));
    }
    Ok(())
}

fn check_limit(name: &str, value: u8) -> Result<(), CoreError> {
    check_range(
        name,
        f32::from(value),
        f32::from(registers::TEMP_LIMIT_MIN),
        f32::from(registers::TEMP_LIMIT_MAX),
    )
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<(), CoreError> {
    if !value.is_finite() || value < min || value > max {
        return Err(CoreError::validation(
            ValidationCode::OutOfRange,
            format!("{name} {value} is outside {min}..={max}"),
        ));
    }
    Ok(())
}

fn check_step(name: &str, value: f32) -> Result<(), CoreError> {
    if !registers::on_half_degree(value) {
        return Err(CoreError::validation(
            ValidationCode::InvalidStep,
            format!("{name} {value} must be a multiple of {}", registers::TEMP_STEP),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn on_auto() -> StatusSnapshot {
        StatusSnapshot {
            power: Some(PowerState::On),
            operation_mode: Some(OperationMode::Auto),
            manual_in_auto: Some(false),
            target_temp: Some(21.0),
            max_temp: Some(35),
            min_temp: Some(5),
            schedule_pattern: Some(SchedulePattern::Workdays),
            ..StatusSnapshot::default()
        }
    }

    fn state_of(snapshot: StatusSnapshot) -> CacheState {
        let mut state = CacheState {
            snapshot: Some(Arc::new(snapshot)),
            ..CacheState::default()
        };
        state.refresh.last_update_success = true;
        state
    }

    fn code(command: Command, state: &CacheState) -> Option<ValidationCode> {
        plan_command(&command, state).unwrap_err().validation_code()
    }

    #[test]
    fn empty_cache_is_not_ready_except_for_refresh() {
        let empty = CacheState::default();
        assert!(matches!(
            plan_command(&Command::SetPower(PowerState::On), &empty),
            Err(CoreError::NotReady)
        ));
        assert_eq!(plan_command(&Command::Refresh, &empty).unwrap(), Plan::default());
    }

    #[test]
    fn hvac_off_writes_power_only() {
        let plan = plan_command(&Command::SetHvacMode(HvacMode::Off), &state_of(on_auto())).unwrap();
        assert_eq!(plan.writes, vec![DeviceWrite::Power(PowerState::Off)]);
    }

    #[test]
    fn hvac_heat_from_off_powers_on_first() {
        let off = StatusSnapshot {
            power: Some(PowerState::Off),
            ..on_auto()
        };
        let plan = plan_command(&Command::SetHvacMode(HvacMode::Heat), &state_of(off)).unwrap();
        assert_eq!(
            plan.writes,
            vec![
                DeviceWrite::Power(PowerState::On),
                DeviceWrite::OperationMode(OperationMode::Manual),
            ]
        );

        let on = plan_command(&Command::SetHvacMode(HvacMode::Auto), &state_of(on_auto())).unwrap();
        assert_eq!(on.writes, vec![DeviceWrite::OperationMode(OperationMode::Auto)]);
        assert_eq!(on.preset, PresetTransition::Restore);
    }

    #[test]
    fn target_temperature_in_auto_enters_temporary() {
        let plan =
            plan_command(&Command::SetTargetTemperature(23.0), &state_of(on_auto())).unwrap();
        assert_eq!(plan.writes, vec![DeviceWrite::TargetTemp(23.0)]);
        assert_eq!(plan.preset, PresetTransition::EnterTemporary);

        let manual = StatusSnapshot {
            operation_mode: Some(OperationMode::Manual),
            ..on_auto()
        };
        let plan = plan_command(&Command::SetTargetTemperature(23.0), &state_of(manual)).unwrap();
        assert_eq!(plan.preset, PresetTransition::Keep);
    }

    #[test]
    fn target_temperature_checks() {
        let state = state_of(on_auto());
        assert_eq!(
            code(Command::SetTargetTemperature(36.0), &state),
            Some(ValidationCode::OutOfRange)
        );
        assert_eq!(
            code(Command::SetTargetTemperature(21.3), &state),
            Some(ValidationCode::InvalidStep)
        );
        let off = state_of(StatusSnapshot {
            power: Some(PowerState::Off),
            ..on_auto()
        });
        assert_eq!(
            code(Command::SetTargetTemperature(21.0), &off),
            Some(ValidationCode::FeatureUnavailable)
        );
    }

    #[test]
    fn temporary_preset_always_rejected() {
        let off = state_of(StatusSnapshot {
            power: Some(PowerState::Off),
            ..on_auto()
        });
        for state in [state_of(on_auto()), off, CacheState {
            preset_override: Some(Preset::Temporary),
            ..state_of(on_auto())
        }] {
            assert_eq!(
                code(Command::SetPreset(Preset::Temporary), &state),
                Some(ValidationCode::InvalidPreset)
            );
        }
    }

    #[test]
    fn schedule_preset_unavailable_during_override() {
        let mut state = state_of(on_auto());
        let plan = plan_command(&Command::SetPreset(Preset::Fullweek), &state).unwrap();
        assert_eq!(
            plan.writes,
            vec![DeviceWrite::WeeklySchedule(SchedulePattern::Fullweek)]
        );

        state.preset_override = Some(Preset::Temporary);
        assert_eq!(
            code(Command::SetPreset(Preset::Fullweek), &state),
            Some(ValidationCode::PresetUnavailable)
        );
    }

    #[test]
    fn max_and_min_respect_target_and_each_other() {
        let state = state_of(StatusSnapshot {
            min_temp: Some(10),
            max_temp: Some(30),
            target_temp: Some(21.0),
            ..on_auto()
        });
        assert_eq!(
            code(Command::SetMaxTemperature(20), &state),
            Some(ValidationCode::BelowTarget)
        );
        assert_eq!(
            code(Command::SetMinTemperature(22), &state),
            Some(ValidationCode::AboveTarget)
        );
        assert_eq!(
            code(Command::SetMaxTemperature(100), &state),
            Some(ValidationCode::OutOfRange)
        );
        assert!(plan_command(&Command::SetMaxTemperature(21), &state).is_ok());

        let no_target = state_of(StatusSnapshot {
            min_temp: Some(10),
            max_temp: Some(30),
            target_temp: None,
            ..on_auto()
        });
        assert_eq!(
            code(Command::SetMaxTemperature(9), &no_target),
            Some(ValidationCode::BelowMinimum)
        );
        assert_eq!(
            code(Command::SetMinTemperature(31), &no_target),
            Some(ValidationCode::AboveMaximum)
        );
    }

    #[test]
    fn bounds_unavailable_when_stale_or_off() {
        let mut stale = state_of(on_auto());
        stale.refresh.last_update_success = false;
        assert_eq!(
            code(Command::SetMinTemperature(6), &stale),
            Some(ValidationCode::ParameterUnavailable)
        );
        let off = state_of(StatusSnapshot {
            power: Some(PowerState::Off),
            ..on_auto()
        });
        assert_eq!(
            code(Command::SetMaxTemperature(30), &off),
            Some(ValidationCode::ParameterUnavailable)
        );
    }

    #[test]
    fn slot_write_reasserts_auto() {
        let slot = SlotId::weekday(2).unwrap();
        let time = NaiveTime::from_hms_opt(7, 45, 0).unwrap();
        let plan =
            plan_command(&Command::SetSlotTime { slot, time }, &state_of(on_auto())).unwrap();
        assert_eq!(
            plan.writes,
            vec![DeviceWrite::Period {
                slot,
                hour: Some(7),
                minute: Some(45),
                temp: None,
            }]
        );
        assert_eq!(
            plan.follow_up,
            vec![DeviceWrite::OperationMode(OperationMode::Auto)]
        );

        let override_active = state_of(StatusSnapshot {
            manual_in_auto: Some(true),
            ..on_auto()
        });
        let plan = plan_command(
            &Command::SetSlotTemperature {
                slot,
                temperature: 18.5,
            },
            &override_active,
        )
        .unwrap();
        assert_eq!(plan.writes.len(), 1);
        assert!(plan.follow_up.is_empty());
    }

    #[test]
    fn slot_temperature_range() {
        let slot = SlotId::weekend(1).unwrap();
        assert_eq!(
            code(
                Command::SetSlotTemperature {
                    slot,
                    temperature: 36.0
                },
                &state_of(on_auto())
            ),
            Some(ValidationCode::OutOfRange)
        );
    }

    #[test]
    fn settings_ranges() {
        let state = state_of(on_auto());
        assert_eq!(
            code(Command::SetHysteresis(0), &state),
            Some(ValidationCode::OutOfRange)
        );
        assert_eq!(
            code(Command::SetCalibration(-9.5), &state),
            Some(ValidationCode::OutOfRange)
        );
        assert_eq!(
            code(Command::SetCalibration(1.2), &state),
            Some(ValidationCode::InvalidStep)
        );
        assert_eq!(
            code(Command::SetExternalMaxTemperature(4), &state),
            Some(ValidationCode::OutOfRange)
        );
    }

    #[test]
    fn writes_name_their_operation() {
        assert_eq!(
            DeviceWrite::PowerOn(true).operation(),
            Operation::SetPoweron
        );
        let json = serde_json::to_value(DeviceWrite::TargetTemp(23.0)).unwrap();
        assert_eq!(json, serde_json::json!({"write": "target_temp", "value": 23.0}));
    }
}
