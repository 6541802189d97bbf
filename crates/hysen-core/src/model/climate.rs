// ── Climate-facing vocabulary ──
//
// Modes, actions, presets, and feature flags as seen by consumers. These are
// derived from a StatusSnapshot, never stored on the device directly.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::status::SchedulePattern;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HvacMode {
    Off,
    Heat,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HvacAction {
    Off,
    Idle,
    Heating,
}

/// Selectable schedule patterns plus the synthetic `Temporary` state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Preset {
    Workdays,
    Sixdays,
    Fullweek,
    /// A direct setpoint is overriding the schedule. Read-only.
    Temporary,
}

impl Preset {
    /// The schedule pattern behind this preset, if it is settable.
    pub fn pattern(self) -> Option<SchedulePattern> {
        match self {
            Self::Workdays => Some(SchedulePattern::Workdays),
            Self::Sixdays => Some(SchedulePattern::Sixdays),
            Self::Fullweek => Some(SchedulePattern::Fullweek),
            Self::Temporary => None,
        }
    }

    /// The three schedule presets, in device order.
    pub fn schedule_presets() -> Vec<Self> {
        Self::iter().filter(|p| p.pattern().is_some()).collect()
    }
}

impl From<SchedulePattern> for Preset {
    fn from(pattern: SchedulePattern) -> Self {
        match pattern {
            SchedulePattern::Workdays => Self::Workdays,
            SchedulePattern::Sixdays => Self::Sixdays,
            SchedulePattern::Fullweek => Self::Fullweek,
        }
    }
}

// ── ClimateFeatures ─────────────────────────────────────────────────

/// Bit set of controls the climate view currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClimateFeatures(u8);

impl ClimateFeatures {
    pub const TURN_ON_OFF: Self = Self(1);
    pub const TARGET_TEMPERATURE: Self = Self(1 << 1);
    pub const PRESET_MODE: Self = Self(1 << 2);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn names(self) -> Vec<&'static str> {
        [
            (Self::TURN_ON_OFF, "turn_on_off"),
            (Self::TARGET_TEMPERATURE, "target_temperature"),
            (Self::PRESET_MODE, "preset_mode"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect()
    }
}

impl BitOr for ClimateFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Serialize for ClimateFeatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

impl fmt::Display for ClimateFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn temporary_has_no_pattern() {
        assert_eq!(Preset::Temporary.pattern(), None);
        assert_eq!(
            Preset::schedule_presets(),
            vec![Preset::Workdays, Preset::Sixdays, Preset::Fullweek]
        );
    }

    #[test]
    fn preset_parse_is_case_insensitive() {
        assert_eq!("fullweek".parse::<Preset>().unwrap(), Preset::Fullweek);
        assert_eq!("Temporary".parse::<Preset>().unwrap(), Preset::Temporary);
        assert!("weekend".parse::<Preset>().is_err());
    }

    #[test]
    fn feature_flags_compose() {
        let f = ClimateFeatures::TURN_ON_OFF | ClimateFeatures::TARGET_TEMPERATURE;
        assert!(f.contains(ClimateFeatures::TARGET_TEMPERATURE));
        assert!(!f.contains(ClimateFeatures::PRESET_MODE));
        assert_eq!(f.to_string(), "turn_on_off, target_temperature");
    }
}
