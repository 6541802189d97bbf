// ── Simulated controller ──
//
// In-memory `HeatingDevice` that behaves like the real firmware for the
// registers the adapter touches. Every call is recorded in order, and faults
// can be injected per operation, which makes it the gateway double for the
// coordinator tests as well as the offline backend for the CLI.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::device::HeatingDevice;
use crate::error::Error;
use crate::operation::{Operation, Period};
use crate::registers;
use crate::status::RawStatus;

// ── DeviceCall ──────────────────────────────────────────────────────

/// A recorded gateway invocation with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceCall {
    GetStatus,
    SetPower(u8),
    SetOperationMode(u8),
    SetTargetTemp(f32),
    SetWeeklySchedule(u8),
    SetKeyLock(u8),
    SetSensor(u8),
    SetHysteresis(u8),
    SetCalibration(f32),
    SetMaxTemp(u8),
    SetMinTemp(u8),
    SetExternalMaxTemp(u8),
    SetFrostProtection(u8),
    SetPoweron(u8),
    SetPeriod {
        period: Period,
        hour: Option<u8>,
        minute: Option<u8>,
        temp: Option<f32>,
    },
    SetTime {
        hour: u8,
        minute: u8,
        second: u8,
        weekday: u8,
    },
}

impl DeviceCall {
    pub fn operation(&self) -> Operation {
        match self {
            Self::GetStatus => Operation::GetStatus,
            Self::SetPower(_) => Operation::SetPower,
            Self::SetOperationMode(_) => Operation::SetOperationMode,
            Self::SetTargetTemp(_) => Operation::SetTargetTemp,
            Self::SetWeeklySchedule(_) => Operation::SetWeeklySchedule,
            Self::SetKeyLock(_) => Operation::SetKeyLock,
            Self::SetSensor(_) => Operation::SetSensor,
            Self::SetHysteresis(_) => Operation::SetHysteresis,
            Self::SetCalibration(_) => Operation::SetCalibration,
            Self::SetMaxTemp(_) => Operation::SetMaxTemp,
            Self::SetMinTemp(_) => Operation::SetMinTemp,
            Self::SetExternalMaxTemp(_) => Operation::SetExternalMaxTemp,
            Self::SetFrostProtection(_) => Operation::SetFrostProtection,
            Self::SetPoweron(_) => Operation::SetPoweron,
            Self::SetPeriod { .. } => Operation::SetPeriod,
            Self::SetTime { .. } => Operation::SetTime,
        }
    }
}

// ── Fault injection ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Fault {
    Once(Error),
    Always(Error),
}

#[derive(Debug)]
struct SimState {
    status: RawStatus,
    calls: Vec<DeviceCall>,
    faults: HashMap<Operation, Fault>,
    latency: Duration,
}

impl SimState {
    fn take_fault(&mut self, operation: Operation) -> Option<Error> {
        let fault = self.faults.get(&operation)?.clone();
        if matches!(fault, Fault::Once(_)) {
            self.faults.remove(&operation);
        }
        match fault {
            Fault::Once(err) | Fault::Always(err) => Some(err),
        }
    }
}

// ── SimulatedDevice ─────────────────────────────────────────────────

/// In-memory heating controller.
#[derive(Debug)]
pub struct SimulatedDevice {
    host: String,
    state: Mutex<SimState>,
}

impl SimulatedDevice {
    /// A device in factory state.
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_status(host, RawStatus::default())
    }

    pub fn with_status(host: impl Into<String>, status: RawStatus) -> Self {
        Self {
            host: host.into(),
            state: Mutex::new(SimState {
                status,
                calls: Vec::new(),
                faults: HashMap::new(),
                latency: Duration::ZERO,
            }),
        }
    }

    /// Delay every call by `latency` before it takes effect.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Current register values, without recording a call.
    pub fn status(&self) -> RawStatus {
        self.lock().status.clone()
    }

    /// Mutate registers directly, as if changed on the device's front panel.
    pub fn update(&self, f: impl FnOnce(&mut RawStatus)) {
        let mut state = self.lock();
        f(&mut state.status);
        settle_valve(&mut state.status);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    /// Recorded calls excluding status reads.
    pub fn writes(&self) -> Vec<DeviceCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation().is_write())
            .cloned()
            .collect()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Fail the next call of `operation` with `error`.
    pub fn fail_next(&self, operation: Operation, error: Error) {
        self.lock().faults.insert(operation, Fault::Once(error));
    }

    /// Fail every call of `operation` until [`clear_faults`](Self::clear_faults).
    pub fn fail_always(&self, operation: Operation, error: Error) {
        self.lock().faults.insert(operation, Fault::Always(error));
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn invoke<T>(
        &self,
        call: DeviceCall,
        apply: impl FnOnce(&mut RawStatus) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let operation = call.operation();
        let latency = {
            let mut state = self.lock();
            debug!(host = %self.host, ?call, "simulated device call");
            state.calls.push(call);
            state.latency
        };
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }

        let mut state = self.lock();
        if let Some(err) = state.take_fault(operation) {
            debug!(host = %self.host, %operation, error = %err, "injected fault");
            return Err(err);
        }
        let out = apply(&mut state.status)?;
        settle_valve(&mut state.status);
        Ok(out)
    }

    fn write_flag(
        &self,
        call: DeviceCall,
        value: u8,
        field: impl FnOnce(&mut RawStatus) -> &mut u8,
    ) -> Result<(), Error> {
        let operation = call.operation();
        self.invoke(call, |s| {
            if !registers::is_flag(value) {
                return Err(Error::unsupported(operation, value));
            }
            *field(s) = value;
            Ok(())
        })
    }
}

/// The valve opens while powered and below target.
fn settle_valve(status: &mut RawStatus) {
    status.valve_state = if status.power_state == registers::ON
        && status.room_temp < status.target_temp
    {
        registers::ON
    } else {
        registers::OFF
    };
}

fn check_range<T: PartialOrd + ToString>(
    operation: Operation,
    value: T,
    min: T,
    max: T,
) -> Result<(), Error> {
    if value < min || value > max {
        return Err(Error::unsupported(operation, value));
    }
    Ok(())
}

impl HeatingDevice for SimulatedDevice {
    fn host(&self) -> &str {
        &self.host
    }

    fn get_status(&self) -> Result<RawStatus, Error> {
        self.invoke(DeviceCall::GetStatus, |s| Ok(s.clone()))
    }

    fn set_power(&self, state: u8) -> Result<(), Error> {
        self.write_flag(DeviceCall::SetPower(state), state, |s| &mut s.power_state)
    }

    fn set_operation_mode(&self, mode: u8) -> Result<(), Error> {
        self.invoke(DeviceCall::SetOperationMode(mode), |s| {
            if mode != registers::MODE_MANUAL && mode != registers::MODE_AUTO {
                return Err(Error::unsupported(Operation::SetOperationMode, mode));
            }
            s.operation_mode = mode;
            s.manual_in_auto = registers::OFF;
            Ok(())
        })
    }

    fn set_target_temp(&self, temp: f32) -> Result<(), Error> {
        self.invoke(DeviceCall::SetTargetTemp(temp), |s| {
            let op = Operation::SetTargetTemp;
            check_range(op, temp, f32::from(s.min_temp), f32::from(s.max_temp))?;
            if !registers::on_half_degree(temp) {
                return Err(Error::unsupported(op, temp));
            }
            s.target_temp = temp;
            if s.operation_mode == registers::MODE_AUTO {
                s.manual_in_auto = registers::ON;
            }
            Ok(())
        })
    }

    fn set_weekly_schedule(&self, schedule: u8) -> Result<(), Error> {
        self.invoke(DeviceCall::SetWeeklySchedule(schedule), |s| {
            check_range(
                Operation::SetWeeklySchedule,
                schedule,
                registers::SCHEDULE_12345_67,
                registers::SCHEDULE_1234567,
            )?;
            s.schedule = schedule;
            s.manual_in_auto = registers::OFF;
            Ok(())
        })
    }

    fn set_key_lock(&self, lock: u8) -> Result<(), Error> {
        self.write_flag(DeviceCall::SetKeyLock(lock), lock, |s| &mut s.key_lock)
    }

    fn set_sensor(&self, sensor: u8) -> Result<(), Error> {
        self.invoke(DeviceCall::SetSensor(sensor), |s| {
            check_range(
                Operation::SetSensor,
                sensor,
                registers::SENSOR_INTERNAL,
                registers::SENSOR_INT_EXT,
            )?;
            s.sensor = sensor;
            Ok(())
        })
    }

    fn set_hysteresis(&self, hysteresis: u8) -> Result<(), Error> {
        self.invoke(DeviceCall::SetHysteresis(hysteresis), |s| {
            check_range(
                Operation::SetHysteresis,
                hysteresis,
                registers::HYSTERESIS_MIN,
                registers::HYSTERESIS_MAX,
            )?;
            s.hysteresis = hysteresis;
            Ok(())
        })
    }

    fn set_calibration(&self, calibration: f32) -> Result<(), Error> {
        self.invoke(DeviceCall::SetCalibration(calibration), |s| {
            let op = Operation::SetCalibration;
            check_range(
                op,
                calibration,
                registers::CALIBRATION_MIN,
                registers::CALIBRATION_MAX,
            )?;
            if !registers::on_half_degree(calibration) {
                return Err(Error::unsupported(op, calibration));
            }
            s.calibration = calibration;
            Ok(())
        })
    }

    fn set_max_temp(&self, temp: u8) -> Result<(), Error> {
        self.invoke(DeviceCall::SetMaxTemp(temp), |s| {
            check_range(
                Operation::SetMaxTemp,
                temp,
                registers::TEMP_LIMIT_MIN,
                registers::TEMP_LIMIT_MAX,
            )?;
            s.max_temp = temp;
            Ok(())
        })
    }

    fn set_min_temp(&self, temp: u8) -> Result<(), Error> {
        self.invoke(DeviceCall::SetMinTemp(temp), |s| {
            check_range(
                Operation::SetMinTemp,
                temp,
                registers::TEMP_LIMIT_MIN,
                registers::TEMP_LIMIT_MAX,
            )?;
            s.min_temp = temp;
            Ok(())
        })
    }

    fn set_external_max_temp(&self, temp: u8) -> Result<(), Error> {
        self.invoke(DeviceCall::SetExternalMaxTemp(temp), |s| {
            check_range(
                Operation::SetExternalMaxTemp,
                temp,
                registers::TEMP_LIMIT_MIN,
                registers::TEMP_LIMIT_MAX,
            )?;
            s.external_max_temp = temp;
            Ok(())
        })
    }

    fn set_frost_protection(&self, state: u8) -> Result<(), Error> {
        self.write_flag(DeviceCall::SetFrostProtection(state), state, |s| {
            &mut s.frost_protection
        })
    }

    fn set_poweron(&self, state: u8) -> Result<(), Error> {
        self.write_flag(DeviceCall::SetPoweron(state), state, |s| &mut s.poweron)
    }

    fn set_period(
        &self,
        period: Period,
        hour: Option<u8>,
        minute: Option<u8>,
        temp: Option<f32>,
    ) -> Result<(), Error> {
        let call = DeviceCall::SetPeriod {
            period,
            hour,
            minute,
            temp,
        };
        self.invoke(call, |s| {
            let op = Operation::SetPeriod;
            if let Some(h) = hour {
                check_range(op, h, 0, 23)?;
            }
            if let Some(m) = minute {
                check_range(op, m, 0, 59)?;
            }
            if let Some(t) = temp {
                check_range(op, t, registers::PERIOD_TEMP_MIN, registers::PERIOD_TEMP_MAX)?;
            }

            let slots: &mut [_] = if period.is_weekend() {
                &mut s.we_periods
            } else {
                &mut s.periods
            };
            let Some(slot) = slots.get_mut(period.position()) else {
                return Err(Error::unsupported(op, period));
            };
            if let Some(h) = hour {
                slot.hour = h;
            }
            if let Some(m) = minute {
                slot.minute = m;
            }
            if let Some(t) = temp {
                slot.temp = t;
            }
            Ok(())
        })
    }

    fn set_time(&self, hour: u8, minute: u8, second: u8, weekday: u8) -> Result<(), Error> {
        let call = DeviceCall::SetTime {
            hour,
            minute,
            second,
            weekday,
        };
        self.invoke(call, |s| {
            let op = Operation::SetTime;
            check_range(op, hour, 0, 23)?;
            check_range(op, minute, 0, 59)?;
            check_range(op, second, 0, 59)?;
            check_range(
                op,
                weekday,
                registers::WEEKDAY_MONDAY,
                registers::WEEKDAY_SUNDAY,
            )?;
            s.clock_hour = hour;
            s.clock_minute = minute;
            s.clock_second = second;
            s.clock_weekday = weekday;
            Ok(())
        })
    }
}
