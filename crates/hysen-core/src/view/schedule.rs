// ── Schedule slot start times ──
//
// Slot temperatures are plain numbers and live in `NumberView`; this view
// only covers the start time of each slot.

use chrono::NaiveTime;
use serde::Serialize;

use super::ParameterView;
use crate::command::Command;
use crate::error::CoreError;
use crate::model::SlotId;
use crate::store::CacheState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotTimeView(pub SlotId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotTimeState {
    pub slot: SlotId,
    pub time: Option<NaiveTime>,
    pub available: bool,
}

impl SlotTimeView {
    pub fn all() -> Vec<Self> {
        SlotId::all().map(Self).collect()
    }
}

impl ParameterView for SlotTimeView {
    type State = SlotTimeState;
    type Value = NaiveTime;

    fn key(&self) -> String {
        format!("time.{}_time", self.0)
    }

    fn render(&self, state: &CacheState) -> SlotTimeState {
        SlotTimeState {
            slot: self.0,
            time: state
                .snapshot()
                .and_then(|s| s.schedule.get(self.0))
                .and_then(|slot| slot.time),
            available: state.is_fresh(),
        }
    }

    fn command(&self, time: NaiveTime) -> Result<Command, CoreError> {
        Ok(Command::SetSlotTime {
            slot: self.0,
            time,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::StatusSnapshot;
    use std::sync::Arc;

    #[test]
    fn renders_slot_time() {
        let mut snapshot = StatusSnapshot::default();
        snapshot.schedule.weekday[0].time = NaiveTime::from_hms_opt(6, 0, 0);
        let state = CacheState {
            snapshot: Some(Arc::new(snapshot)),
            ..CacheState::default()
        };

        let view = SlotTimeView(SlotId::weekday(1).unwrap());
        assert_eq!(view.key(), "time.weekday1_time");
        assert_eq!(view.render(&state).time, NaiveTime::from_hms_opt(6, 0, 0));
        assert_eq!(
            SlotTimeView(SlotId::weekday(2).unwrap()).render(&state).time,
            None
        );
        assert_eq!(SlotTimeView::all().len(), 8);
    }
}
