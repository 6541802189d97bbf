use crate::error::Error;
use crate::operation::Period;
use crate::status::RawStatus;

/// A heating controller reachable through some transport.
///
/// All calls block until the device answers or the backend gives up, so
/// async callers should run them on a blocking pool. Each setter writes
/// exactly one register group and either fully succeeds or fails.
pub trait HeatingDevice: Send + Sync + 'static {
    /// Host or label used in logs and error messages.
    fn host(&self) -> &str;

    /// Read every register in one round trip.
    fn get_status(&self) -> Result<RawStatus, Error>;

    fn set_power(&self, state: u8) -> Result<(), Error>;

    fn set_operation_mode(&self, mode: u8) -> Result<(), Error>;

    fn set_target_temp(&self, temp: f32) -> Result<(), Error>;

    /// Select the weekly schedule pattern (`registers::SCHEDULE_*`).
    fn set_weekly_schedule(&self, schedule: u8) -> Result<(), Error>;

    fn set_key_lock(&self, lock: u8) -> Result<(), Error>;

    fn set_sensor(&self, sensor: u8) -> Result<(), Error>;

    fn set_hysteresis(&self, hysteresis: u8) -> Result<(), Error>;

    fn set_calibration(&self, calibration: f32) -> Result<(), Error>;

    fn set_max_temp(&self, temp: u8) -> Result<(), Error>;

    fn set_min_temp(&self, temp: u8) -> Result<(), Error>;

    fn set_external_max_temp(&self, temp: u8) -> Result<(), Error>;

    fn set_frost_protection(&self, state: u8) -> Result<(), Error>;

    /// Whether the device restores its last power state after an outage.
    fn set_poweron(&self, state: u8) -> Result<(), Error>;

    /// Update any subset of a schedule period's start time and temperature.
    /// `None` fields keep their current device value.
    fn set_period(
        &self,
        period: Period,
        hour: Option<u8>,
        minute: Option<u8>,
        temp: Option<f32>,
    ) -> Result<(), Error>;

    /// Set the device clock. `weekday` is 1 (Monday) through 7 (Sunday).
    fn set_time(&self, hour: u8, minute: u8, second: u8, weekday: u8) -> Result<(), Error>;
}
