#![allow(clippy::unwrap_used)]
// Behavioural tests for `SimulatedDevice`: firmware quirks, call recording,
// and fault injection.

use pretty_assertions::assert_eq;

use hysen_api::registers::{self, MODE_AUTO, MODE_MANUAL, OFF, ON};
use hysen_api::{DeviceCall, Error, HeatingDevice, Operation, Period, RawStatus, SimulatedDevice};

// ── Helpers ─────────────────────────────────────────────────────────

fn auto_device() -> SimulatedDevice {
    SimulatedDevice::with_status(
        "192.168.1.40",
        RawStatus {
            operation_mode: MODE_AUTO,
            ..RawStatus::default()
        },
    )
}

fn timeout() -> Error {
    Error::Timeout { timeout_secs: 10 }
}

// ── Firmware quirks ─────────────────────────────────────────────────

#[test]
fn target_temp_in_auto_enters_manual_in_auto() {
    let device = auto_device();
    device.set_target_temp(23.0).unwrap();

    let status = device.get_status().unwrap();
    assert_eq!(status.target_temp, 23.0);
    assert_eq!(status.manual_in_auto, ON);
}

#[test]
fn target_temp_in_manual_leaves_flag_clear() {
    let device = SimulatedDevice::new("dev");
    device.set_target_temp(21.5).unwrap();
    assert_eq!(device.status().manual_in_auto, OFF);
}

#[test]
fn mode_write_clears_manual_in_auto() {
    let device = auto_device();
    device.set_target_temp(23.0).unwrap();
    device.set_operation_mode(MODE_AUTO).unwrap();
    assert_eq!(device.status().manual_in_auto, OFF);
}

#[test]
fn target_temp_outside_device_bounds_is_rejected() {
    let device = SimulatedDevice::new("dev");
    let err = device.set_target_temp(36.0).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedValue {
            operation: Operation::SetTargetTemp,
            ..
        }
    ));
    assert_eq!(device.status().target_temp, RawStatus::default().target_temp);
}

#[test]
fn valve_follows_power_and_setpoint() {
    let device = SimulatedDevice::new("dev");
    device.update(|s| s.room_temp = 18.0);
    device.set_target_temp(22.0).unwrap();
    assert_eq!(device.status().valve_state, ON);

    device.set_power(OFF).unwrap();
    assert_eq!(device.status().valve_state, OFF);
}

#[test]
fn set_period_updates_only_given_fields() {
    let device = SimulatedDevice::new("dev");
    let before = device.status().periods[2];

    device
        .set_period(Period::weekday(3).unwrap(), None, None, Some(19.5))
        .unwrap();
    let after = device.status().periods[2];
    assert_eq!(after.hour, before.hour);
    assert_eq!(after.minute, before.minute);
    assert_eq!(after.temp, 19.5);

    device
        .set_period(Period::weekend(2).unwrap(), Some(21), Some(45), None)
        .unwrap();
    let we = device.status().we_periods[1];
    assert_eq!((we.hour, we.minute), (21, 45));
}

#[test]
fn set_time_rejects_bad_weekday() {
    let device = SimulatedDevice::new("dev");
    assert!(device.set_time(12, 0, 0, 8).is_err());
    device.set_time(12, 30, 5, registers::WEEKDAY_SUNDAY).unwrap();
    let s = device.status();
    assert_eq!((s.clock_hour, s.clock_minute, s.clock_weekday), (12, 30, 7));
}

// ── Recording ───────────────────────────────────────────────────────

#[test]
fn calls_are_recorded_in_order() {
    let device = SimulatedDevice::new("dev");
    device.get_status().unwrap();
    device.set_power(ON).unwrap();
    device.set_operation_mode(MODE_MANUAL).unwrap();

    assert_eq!(
        device.calls(),
        vec![
            DeviceCall::GetStatus,
            DeviceCall::SetPower(ON),
            DeviceCall::SetOperationMode(MODE_MANUAL),
        ]
    );
    assert_eq!(
        device.writes(),
        vec![
            DeviceCall::SetPower(ON),
            DeviceCall::SetOperationMode(MODE_MANUAL)
        ]
    );
    assert_eq!(device.count(Operation::GetStatus), 1);

    device.clear_calls();
    assert!(device.calls().is_empty());
}

// ── Fault injection ─────────────────────────────────────────────────

#[test]
fn fail_next_fires_once() {
    let device = SimulatedDevice::new("dev");
    device.fail_next(Operation::SetPower, timeout());

    assert_eq!(device.set_power(OFF), Err(timeout()));
    assert_eq!(device.status().power_state, ON, "failed write must not apply");
    device.set_power(OFF).unwrap();
    assert_eq!(device.status().power_state, OFF);
}

#[test]
fn fail_always_persists_until_cleared() {
    let device = SimulatedDevice::new("dev");
    device.fail_always(Operation::GetStatus, timeout());

    assert!(device.get_status().is_err());
    assert!(device.get_status().is_err());
    device.clear_faults();
    assert!(device.get_status().is_ok());
}

#[test]
fn failed_calls_are_still_recorded() {
    let device = SimulatedDevice::new("dev");
    device.fail_next(Operation::SetKeyLock, timeout());
    let _ = device.set_key_lock(ON);
    assert_eq!(device.writes(), vec![DeviceCall::SetKeyLock(ON)]);
}

#[test]
fn raw_status_serializes_for_state_files() {
    let status = RawStatus::default();
    let json = serde_json::to_string(&status).unwrap();
    let back: RawStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(back, status);
}

#[test]
fn status_without_unknown1_still_loads() {
    let mut json = serde_json::to_value(RawStatus::default()).unwrap();
    json.as_object_mut().unwrap().remove("unknown1");
    let status: RawStatus = serde_json::from_value(json).unwrap();
    assert_eq!(status, RawStatus::default());
}
