//! Offline backend: a simulated thermostat whose registers persist in a JSON
//! state file between invocations.

use std::path::{Path, PathBuf};

use hysen_api::{Error, HeatingDevice, Period, RawStatus, SimulatedDevice};
use tracing::debug;

use crate::error::CliError;

pub struct StateFileDevice {
    path: PathBuf,
    sim: SimulatedDevice,
}

impl StateFileDevice {
    /// Load registers from `path`, or start from factory state when the file
    /// does not exist yet.
    pub fn open(host: &str, path: &Path) -> Result<Self, CliError> {
        let status = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<RawStatus>(&raw).map_err(|e| CliError::ConfigInvalid {
                field: "state_file".into(),
                reason: format!("{}: {e}", path.display()),
            })?
        } else {
            debug!(path = %path.display(), "no state file, using factory registers");
            RawStatus::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            sim: SimulatedDevice::with_status(host, status),
        })
    }

    fn persist(&self) -> Result<(), Error> {
        let backend = |e: &dyn std::fmt::Display| Error::Backend {
            message: format!("{}: {e}", self.path.display()),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| backend(&e))?;
        }
        let json = serde_json::to_string_pretty(&self.sim.status()).map_err(|e| backend(&e))?;
        std::fs::write(&self.path, json).map_err(|e| backend(&e))
    }

    /// Persist after a successful write.
    fn saved(&self, result: Result<(), Error>) -> Result<(), Error> {
        result?;
        self.persist()
    }
}

impl HeatingDevice for StateFileDevice {
    fn host(&self) -> &str {
        self.sim.host()
    }

    fn get_status(&self) -> Result<RawStatus, Error> {
        self.sim.get_status()
    }

    fn set_power(&self, state: u8) -> Result<(), Error> {
        self.saved(self.sim.set_power(state))
    }

    fn set_operation_mode(&self, mode: u8) -> Result<(), Error> {
        self.saved(self.sim.set_operation_mode(mode))
    }

    fn set_target_temp(&self, temp: f32) -> Result<(), Error> {
        self.saved(self.sim.set_target_temp(temp))
    }

    fn set_weekly_schedule(&self, schedule: u8) -> Result<(), Error> {
        self.saved(self.sim.set_weekly_schedule(schedule))
    }

    fn set_key_lock(&self, lock: u8) -> Result<(), Error> {
        self.saved(self.sim.set_key_lock(lock))
    }

    fn set_sensor(&self, sensor: u8) -> Result<(), Error> {
        self.saved(self.sim.set_sensor(sensor))
    }

    fn set_hysteresis(&self, hysteresis: u8) -> Result<(), Error> {
        self.saved(self.sim.set_hysteresis(hysteresis))
    }

    fn set_calibration(&self, calibration: f32) -> Result<(), Error> {
        self.saved(self.sim.set_calibration(calibration))
    }

    fn set_max_temp(&self, temp: u8) -> Result<(), Error> {
        self.saved(self.sim.set_max_temp(temp))
    }

    fn set_min_temp(&self, temp: u8) -> Result<(), Error> {
        self.saved(self.sim.set_min_temp(temp))
    }

    fn set_external_max_temp(&self, temp: u8) -> Result<(), Error> {
        self.saved(self.sim.set_external_max_temp(temp))
    }

    fn set_frost_protection(&self, state: u8) -> Result<(), Error> {
        self.saved(self.sim.set_frost_protection(state))
    }

    fn set_poweron(&self, state: u8) -> Result<(), Error> {
        self.saved(self.sim.set_poweron(state))
    }

    fn set_period(
        &self,
        period: Period,
        hour: Option<u8>,
        minute: Option<u8>,
        temp: Option<f32>,
    ) -> Result<(), Error> {
        self.saved(self.sim.set_period(period, hour, minute, temp))
    }

    fn set_time(&self, hour: u8, minute: u8, second: u8, weekday: u8) -> Result<(), Error> {
        self.saved(self.sim.set_time(hour, minute, second, weekday))
    }
}
