// ── Option-list views ──

use serde::Serialize;
use strum::IntoEnumIterator;

use super::ParameterView;
use crate::command::{Command, ValidationCode};
use crate::error::CoreError;
use crate::model::{KeyLock, SensorType};
use crate::store::CacheState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectView {
    KeyLock,
    SensorType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectState {
    pub current: Option<String>,
    pub options: Vec<String>,
    pub available: bool,
}

impl SelectView {
    pub fn all() -> [Self; 2] {
        [Self::KeyLock, Self::SensorType]
    }

    fn options(self) -> Vec<String> {
        match self {
            Self::KeyLock => KeyLock::iter().map(|v| v.to_string()).collect(),
            Self::SensorType => SensorType::iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl ParameterView for SelectView {
    type State = SelectState;
    type Value = String;

    fn key(&self) -> String {
        match self {
            Self::KeyLock => "select.key_lock".into(),
            Self::SensorType => "select.sensor".into(),
        }
    }

    fn render(&self, state: &CacheState) -> SelectState {
        let snapshot = state.snapshot();
        let current = match self {
            Self::KeyLock => snapshot.and_then(|s| s.key_lock).map(|v| v.to_string()),
            Self::SensorType => snapshot.and_then(|s| s.sensor).map(|v| v.to_string()),
        };
        SelectState {
            current,
            options: self.options(),
            available: state.is_fresh(),
        }
    }

    fn command(&self, value: String) -> Result<Command, CoreError> {
        let invalid = || {
            CoreError::validation(
                ValidationCode::InvalidValue,
                format!(
                    "'{value}' is not one of: {}",
                    self.options().join(", ")
                ),
            )
        };
        match self {
            Self::KeyLock => value
                .parse::<KeyLock>()
                .map(Command::SetKeyLock)
                .map_err(|_| invalid()),
            Self::SensorType => value
                .parse::<SensorType>()
                .map(Command::SetSensorType)
                .map_err(|_| invalid()),
        }
    }
}
