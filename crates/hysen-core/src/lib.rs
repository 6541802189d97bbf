//! Reactive control layer between `hysen-api` and consumers (CLI, automations).
//!
//! A [`Controller`] owns one heating controller: it polls the device into a
//! [`StatusStore`], runs every write through a serialized
//! validate / write / settle / refresh sequence, and exposes the result through
//! [`ParameterView`]s that re-render on every cache change. A [`ClimateHub`]
//! keeps many controllers and fans batch operations out across them.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod hub;
pub mod model;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult, DeviceWrite, ValidationCode, parse_slot_time};
pub use config::{ClockSyncConfig, ControllerConfig};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use hub::{BatchFailure, BatchReport, ClimateHub};
pub use store::{CacheState, RefreshStatus, StatusStore};
pub use stream::{CacheStream, ViewStream};
pub use view::{
    BoundView, ClimateRequest, ClimateState, ClimateView, ClockRequest, ClockState, ClockView,
    NumberState, NumberView, ParameterView, SelectState, SelectView, SlotTimeState, SlotTimeView,
    SwitchState, SwitchView,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ClimateFeatures, DeviceClock, Domain, EntityId, HvacAction, HvacMode, KeyLock, MacAddress,
    OperationMode, PowerState, Preset, Schedule, SchedulePattern, ScheduleSlot, SensorType,
    SlotId, StatusSnapshot, ValveState,
};
