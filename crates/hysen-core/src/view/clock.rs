// ── Device clock ──

use serde::Serialize;

use super::ParameterView;
use crate::command::Command;
use crate::error::CoreError;
use crate::model::DeviceClock;
use crate::store::CacheState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockView;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockState {
    pub clock: Option<DeviceClock>,
    /// `Weekday HH:MM`, as shown on the thermostat.
    pub display: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRequest {
    /// Copy the host's local time.
    Sync,
    Set(DeviceClock),
}

impl ParameterView for ClockView {
    type State = ClockState;
    type Value = ClockRequest;

    fn key(&self) -> String {
        "sensor.device_time".into()
    }

    fn render(&self, state: &CacheState) -> ClockState {
        let clock = state.snapshot().and_then(|s| s.clock);
        ClockState {
            clock,
            display: clock.map(|c| c.to_string()),
            available: state.is_fresh(),
        }
    }

    fn command(&self, value: ClockRequest) -> Result<Command, CoreError> {
        Ok(match value {
            ClockRequest::Sync => Command::SyncClock,
            ClockRequest::Set(clock) => Command::SetDeviceClock(clock),
        })
    }
}
