// ── Numeric parameter views ──

use serde::Serialize;

use super::{ParameterView, whole_number};
use crate::command::Command;
use crate::error::CoreError;
use crate::model::{SlotId, StatusSnapshot};
use crate::store::CacheState;

use hysen_api::registers;

/// One adjustable number on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberView {
    Hysteresis,
    Calibration,
    MaxTemp,
    MinTemp,
    ExternalMaxTemp,
    SlotTemperature(SlotId),
}

/// Rendered number with the range a front end should offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberState {
    pub value: Option<f32>,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub unit: &'static str,
    pub available: bool,
}

impl NumberView {
    /// Every number view, slot temperatures last.
    pub fn all() -> Vec<Self> {
        let mut views = vec![
            Self::Hysteresis,
            Self::Calibration,
            Self::MaxTemp,
            Self::MinTemp,
            Self::ExternalMaxTemp,
        ];
        views.extend(SlotId::all().map(Self::SlotTemperature));
        views
    }

    fn range(self) -> (f32, f32, f32) {
        let limit_min = f32::from(registers::TEMP_LIMIT_MIN);
        let limit_max = f32::from(registers::TEMP_LIMIT_MAX);
        match self {
            Self::Hysteresis => (
                f32::from(registers::HYSTERESIS_MIN),
                f32::from(registers::HYSTERESIS_MAX),
                1.0,
            ),
            Self::Calibration => (
                registers::CALIBRATION_MIN,
                registers::CALIBRATION_MAX,
                registers::TEMP_STEP,
            ),
            Self::MaxTemp | Self::MinTemp | Self::ExternalMaxTemp => (limit_min, limit_max, 1.0),
            Self::SlotTemperature(_) => (
                registers::PERIOD_TEMP_MIN,
                registers::PERIOD_TEMP_MAX,
                registers::TEMP_STEP,
            ),
        }
    }

    fn read(self, snapshot: &StatusSnapshot) -> Option<f32> {
        match self {
            Self::Hysteresis => snapshot.hysteresis.map(f32::from),
            Self::Calibration => snapshot.calibration,
            Self::MaxTemp => snapshot.max_temp.map(f32::from),
            Self::MinTemp => snapshot.min_temp.map(f32::from),
            Self::ExternalMaxTemp => snapshot.external_max_temp.map(f32::from),
            Self::SlotTemperature(slot) => {
                snapshot.schedule.get(slot).and_then(|s| s.temperature)
            }
        }
    }

    /// Temperature bounds are meaningless to edit while the device is off
    /// or its state is stale.
    pub fn is_writable(self, state: &CacheState) -> bool {
        match self {
            Self::MaxTemp | Self::MinTemp => {
                state.is_fresh() && !state.snapshot().is_some_and(StatusSnapshot::is_off)
            }
            _ => true,
        }
    }
}

impl ParameterView for NumberView {
    type State = NumberState;
    type Value = f32;

    fn key(&self) -> String {
        let name = match self {
            Self::Hysteresis => "hysteresis".to_owned(),
            Self::Calibration => "calibration".to_owned(),
            Self::MaxTemp => "max_temp".to_owned(),
            Self::MinTemp => "min_temp".to_owned(),
            Self::ExternalMaxTemp => "external_max_temp".to_owned(),
            Self::SlotTemperature(slot) => format!("{slot}_temp"),
        };
        format!("number.{name}")
    }

    fn render(&self, state: &CacheState) -> NumberState {
        let (min, max, step) = self.range();
        NumberState {
            value: state.snapshot().and_then(|s| self.read(s)),
            min,
            max,
            step,
            unit: "°C",
            available: state.is_fresh() && self.is_writable(state),
        }
    }

    fn command(&self, value: f32) -> Result<Command, CoreError> {
        Ok(match *self {
            Self::Hysteresis => Command::SetHysteresis(whole_number(value)?),
            Self::Calibration => Command::SetCalibration(value),
            Self::MaxTemp => Command::SetMaxTemperature(whole_number(value)?),
            Self::MinTemp => Command::SetMinTemperature(whole_number(value)?),
            Self::ExternalMaxTemp => Command::SetExternalMaxTemperature(whole_number(value)?),
            Self::SlotTemperature(slot) => Command::SetSlotTemperature {
                slot,
                temperature: value,
            },
        })
    }
}
