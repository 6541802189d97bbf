// ── Weekly schedule and clock ──

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};
use hysen_api::Period;
use hysen_api::operation::{WEEKDAY_PERIODS, WEEKEND_PERIODS};
use serde::{Deserialize, Serialize};

use crate::command::ValidationCode;
use crate::error::CoreError;

// ── SlotId ──────────────────────────────────────────────────────────

/// Address of one of the eight schedule slots.
///
/// Text form is `weekday1`..`weekday6` and `weekend1`..`weekend2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotId(Period);

impl SlotId {
    pub fn weekday(index: u8) -> Option<Self> {
        Period::weekday(index).map(Self)
    }

    pub fn weekend(index: u8) -> Option<Self> {
        Period::weekend(index).map(Self)
    }

    /// Build from a 1-based index and a weekend flag.
    pub fn new(index: u8, weekend: bool) -> Option<Self> {
        if weekend {
            Self::weekend(index)
        } else {
            Self::weekday(index)
        }
    }

    /// All eight slots, weekday first.
    pub fn all() -> impl Iterator<Item = Self> {
        let weekday = (1..=WEEKDAY_PERIODS).filter_map(Self::weekday);
        let weekend = (1..=WEEKEND_PERIODS).filter_map(Self::weekend);
        weekday.chain(weekend)
    }

    pub fn is_weekend(self) -> bool {
        self.0.is_weekend()
    }

    pub fn index(self) -> u8 {
        self.0.index()
    }

    pub fn period(self) -> Period {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = if self.is_weekend() { "weekend" } else { "weekday" };
        write!(f, "{group}{}", self.index())
    }
}

impl FromStr for SlotId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let parsed = if let Some(n) = lower.strip_prefix("weekday") {
            n.parse().ok().and_then(Self::weekday)
        } else if let Some(n) = lower.strip_prefix("weekend") {
            n.parse().ok().and_then(Self::weekend)
        } else {
            None
        };
        parsed.ok_or_else(|| {
            CoreError::validation(
                ValidationCode::InvalidSlot,
                format!("unknown schedule slot '{s}' (expected weekday1-6 or weekend1-2)"),
            )
        })
    }
}

impl TryFrom<String> for SlotId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SlotId> for String {
    fn from(slot: SlotId) -> Self {
        slot.to_string()
    }
}

// ── ScheduleSlot ────────────────────────────────────────────────────

/// Start time and setpoint of one schedule slot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub time: Option<NaiveTime>,
    pub temperature: Option<f32>,
}

/// The full weekly program.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub weekday: [ScheduleSlot; 6],
    pub weekend: [ScheduleSlot; 2],
}

impl Schedule {
    pub fn get(&self, slot: SlotId) -> Option<&ScheduleSlot> {
        let position = slot.period().position();
        if slot.is_weekend() {
            self.weekend.get(position)
        } else {
            self.weekday.get(position)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &ScheduleSlot)> {
        SlotId::all().filter_map(|id| self.get(id).map(|slot| (id, slot)))
    }
}

// ── DeviceClock ─────────────────────────────────────────────────────

/// The controller's own wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceClock {
    pub time: NaiveTime,
    pub weekday: Weekday,
}

impl DeviceClock {
    pub fn new(time: NaiveTime, weekday: Weekday) -> Self {
        Self { time, weekday }
    }

    /// Register encoding: 1 = Monday .. 7 = Sunday.
    pub fn weekday_code(&self) -> u8 {
        u8::try_from(self.weekday.number_from_monday()).unwrap_or(1)
    }

    pub fn hour(&self) -> u8 {
        u8::try_from(self.time.hour()).unwrap_or(0)
    }

    pub fn minute(&self) -> u8 {
        u8::try_from(self.time.minute()).unwrap_or(0)
    }

    pub fn second(&self) -> u8 {
        u8::try_from(self.time.second()).unwrap_or(0)
    }
}

impl fmt::Display for DeviceClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        };
        write!(f, "{name} {}", self.time.format("%H:%M"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn slot_id_text_form() {
        let slot: SlotId = "weekday3".parse().unwrap();
        assert_eq!(slot, SlotId::weekday(3).unwrap());
        assert_eq!(SlotId::weekend(2).unwrap().to_string(), "weekend2");
        assert!("weekday7".parse::<SlotId>().is_err());
        assert!("weekend0".parse::<SlotId>().is_err());
        assert!("slot1".parse::<SlotId>().is_err());
    }

    #[test]
    fn all_slots_weekday_first() {
        let ids: Vec<String> = SlotId::all().map(|s| s.to_string()).collect();
        assert_eq!(ids.len(), 8);
        assert_eq!(ids.first().unwrap(), "weekday1");
        assert_eq!(ids.last().unwrap(), "weekend2");
    }

    #[test]
    fn clock_display_and_codes() {
        let clock = DeviceClock::new(NaiveTime::from_hms_opt(7, 5, 9).unwrap(), Weekday::Sun);
        assert_eq!(clock.to_string(), "Sunday 07:05");
        assert_eq!(clock.weekday_code(), 7);
        assert_eq!((clock.hour(), clock.minute(), clock.second()), (7, 5, 9));
    }
}
