//! Gateway contract for Hysen/Broadlink heating controllers.
//!
//! The wire protocol lives outside this workspace. This crate pins down the
//! shape every backend must expose so the reactive layer in `hysen-core` can
//! stay transport-agnostic:
//!
//! - **[`HeatingDevice`]**: blocking request/response calls, one parameter
//!   per write. Callers are expected to offload them to a blocking pool.
//! - **[`RawStatus`]**: the undecoded register dump returned by a status read.
//! - **[`registers`]**: the numeric codes the device speaks.
//! - **[`Operation`]**: stable labels for every gateway call, used for error
//!   attribution ("Error in set_power").
//! - **[`SimulatedDevice`]**: an in-memory backend that records every call
//!   and supports fault injection.

pub mod device;
pub mod error;
pub mod operation;
pub mod registers;
pub mod sim;
pub mod status;

pub use device::HeatingDevice;
pub use error::Error;
pub use operation::{Operation, Period};
pub use sim::{DeviceCall, SimulatedDevice};
pub use status::{RawPeriod, RawStatus};
