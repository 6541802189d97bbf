// ── Domain model ──
//
// Canonical types consumed by views, commands, and front ends. Nothing here
// knows about register encodings; `crate::convert` bridges the two.

pub mod climate;
pub mod entity_id;
pub mod schedule;
pub mod status;

pub use climate::{ClimateFeatures, HvacAction, HvacMode, Preset};
pub use entity_id::{Domain, EntityId, MacAddress};
pub use schedule::{DeviceClock, Schedule, ScheduleSlot, SlotId};
pub use status::{
    KeyLock, OperationMode, PowerState, SchedulePattern, SensorType, StatusSnapshot, ValveState,
};
