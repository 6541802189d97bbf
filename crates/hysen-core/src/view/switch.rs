// ── On/off settings ──

use serde::Serialize;

use super::ParameterView;
use crate::command::Command;
use crate::error::CoreError;
use crate::store::CacheState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchView {
    FrostProtection,
    /// Whether the thermostat comes back powered after a mains outage.
    PowerOnDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchState {
    pub on: Option<bool>,
    pub available: bool,
}

impl SwitchView {
    pub fn all() -> [Self; 2] {
        [Self::FrostProtection, Self::PowerOnDefault]
    }
}

impl ParameterView for SwitchView {
    type State = SwitchState;
    type Value = bool;

    fn key(&self) -> String {
        match self {
            Self::FrostProtection => "switch.frost_protection".into(),
            Self::PowerOnDefault => "switch.poweron".into(),
        }
    }

    fn render(&self, state: &CacheState) -> SwitchState {
        let on = state.snapshot().and_then(|s| match self {
            Self::FrostProtection => s.frost_protection,
            Self::PowerOnDefault => s.poweron,
        });
        SwitchState {
            on,
            available: state.is_fresh(),
        }
    }

    fn command(&self, value: bool) -> Result<Command, CoreError> {
        Ok(match self {
            Self::FrostProtection => Command::SetFrostProtection(value),
            Self::PowerOnDefault => Command::SetPowerOnDefault(value),
        })
    }
}
