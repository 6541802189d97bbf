// ── Gateway operation labels ──
//
// Every call on `HeatingDevice` has a stable snake_case label. Errors raised
// by the coordinator carry one of these so a failure always names the call
// that produced it.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Identifies a single gateway call.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    GetStatus,
    SetPower,
    SetOperationMode,
    SetTargetTemp,
    SetWeeklySchedule,
    SetKeyLock,
    SetSensor,
    SetHysteresis,
    SetCalibration,
    SetMaxTemp,
    SetMinTemp,
    SetExternalMaxTemp,
    SetFrostProtection,
    SetPoweron,
    SetPeriod,
    SetTime,
}

impl Operation {
    /// Whether the call mutates device state.
    pub fn is_write(self) -> bool {
        !matches!(self, Self::GetStatus)
    }
}

// ── Period ──────────────────────────────────────────────────────────

/// Number of weekday schedule periods.
pub const WEEKDAY_PERIODS: u8 = 6;
/// Number of weekend schedule periods.
pub const WEEKEND_PERIODS: u8 = 2;

/// Address of one schedule period on the device.
///
/// Indices are 1-based the way the device numbers them. Construction goes
/// through [`Period::weekday`] / [`Period::weekend`], which reject indices the
/// device does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    weekend: bool,
    index: u8,
}

impl Period {
    pub fn weekday(index: u8) -> Option<Self> {
        (1..=WEEKDAY_PERIODS).contains(&index).then_some(Self {
            weekend: false,
            index,
        })
    }

    pub fn weekend(index: u8) -> Option<Self> {
        (1..=WEEKEND_PERIODS).contains(&index).then_some(Self {
            weekend: true,
            index,
        })
    }

    pub fn is_weekend(self) -> bool {
        self.weekend
    }

    /// 1-based index within its group.
    pub fn index(self) -> u8 {
        self.index
    }

    /// 0-based position inside the group's register array.
    pub fn position(self) -> usize {
        usize::from(self.index - 1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weekend {
            write!(f, "we_period{}", self.index)
        } else {
            write!(f, "period{}", self.index)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn operation_labels_are_snake_case() {
        assert_eq!(Operation::SetPower.to_string(), "set_power");
        assert_eq!(Operation::SetExternalMaxTemp.to_string(), "set_external_max_temp");
        assert_eq!("set_period".parse::<Operation>().unwrap(), Operation::SetPeriod);
    }

    #[test]
    fn get_status_is_not_a_write() {
        assert!(!Operation::GetStatus.is_write());
        assert!(Operation::SetTime.is_write());
    }

    #[test]
    fn period_bounds() {
        assert!(Period::weekday(0).is_none());
        assert!(Period::weekday(7).is_none());
        assert!(Period::weekend(3).is_none());

        let p = Period::weekday(6).unwrap();
        assert_eq!(p.position(), 5);
        assert_eq!(p.to_string(), "period6");

        let we = Period::weekend(1).unwrap();
        assert!(we.is_weekend());
        assert_eq!(we.to_string(), "we_period1");
    }
}
