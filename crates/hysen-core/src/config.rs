// ── Runtime controller configuration ──
//
// Describes how to drive one heating controller: naming, poll cadence, and
// clock maintenance. Never touches disk; the CLI builds a `ControllerConfig`
// from its profile and hands it in.

use std::time::Duration;

use crate::model::MacAddress;

/// Default poll period for the status cache.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Wait between the last write of a command and the follow-up read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Daily clock sync settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSyncConfig {
    /// Local hour (0-23) at which the device clock is corrected.
    pub hour: u32,
}

impl Default for ClockSyncConfig {
    fn default() -> Self {
        Self { hour: 4 }
    }
}

/// Configuration for one heating controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Display name, also used as the climate entity object id.
    pub name: String,
    pub mac: Option<MacAddress>,
    /// Periodic status poll. `Duration::ZERO` disables the poller.
    pub refresh_interval: Duration,
    pub settle_delay: Duration,
    /// `None` leaves the device clock alone.
    pub clock_sync: Option<ClockSyncConfig>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            name: "hysen".into(),
            mac: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            clock_sync: None,
        }
    }
}
