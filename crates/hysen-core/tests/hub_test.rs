#![allow(clippy::unwrap_used)]
// Multi-target operations across independent controllers.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use hysen_api::registers::{MODE_AUTO, ON};
use hysen_api::{Error, HeatingDevice, Operation, RawStatus, SimulatedDevice};
use hysen_core::{ClimateHub, Controller, ControllerConfig, EntityId, ValidationCode};

async fn hub_with(names: &[&str]) -> (ClimateHub, Vec<Arc<SimulatedDevice>>) {
    let hub = ClimateHub::new();
    let mut devices = Vec::new();
    for name in names {
        let device = Arc::new(SimulatedDevice::with_status(
            format!("{name}.local"),
            RawStatus {
                power_state: ON,
                operation_mode: MODE_AUTO,
                ..RawStatus::default()
            },
        ));
        let controller = Controller::new(
            ControllerConfig {
                name: (*name).to_owned(),
                ..ControllerConfig::default()
            },
            Arc::clone(&device) as Arc<dyn HeatingDevice>,
        );
        hub.register(controller).await.unwrap();
        device.clear_calls();
        devices.push(device);
    }
    (hub, devices)
}

#[tokio::test(start_paused = true)]
async fn one_failure_does_not_block_others() {
    let (hub, devices) = hub_with(&["bathroom", "kitchen"]).await;
    devices[1].fail_next(Operation::SetTargetTemp, Error::Timeout { timeout_secs: 10 });

    let report = hub
        .set_temperature(
            vec![
                EntityId::from("climate.bathroom"),
                EntityId::from("climate.kitchen"),
                EntityId::from("switch.kitchen_poweron"),
            ],
            22.0,
        )
        .await
        .unwrap();

    assert_eq!(report.succeeded, vec![EntityId::climate("bathroom")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].entity_id, EntityId::climate("kitchen"));
    assert_eq!(report.failed[0].operation, Some(Operation::SetTargetTemp));
    assert_eq!(report.skipped, vec![EntityId::from("switch.kitchen_poweron")]);

    let bathroom = hub.get(&EntityId::climate("bathroom")).unwrap();
    assert_eq!(bathroom.snapshot().unwrap().target_temp, Some(22.0));
    assert_eq!(devices[1].count(Operation::GetStatus), 0);
}

#[tokio::test(start_paused = true)]
async fn per_device_validation_is_reported_not_fatal() {
    let (hub, _devices) = hub_with(&["bathroom"]).await;
    let report = hub
        .set_temperature(vec![EntityId::climate("bathroom")], 38.0)
        .await
        .unwrap();
    assert_eq!(report.failed[0].code, Some(ValidationCode::OutOfRange));
}

#[tokio::test(start_paused = true)]
async fn non_climate_only_batch_is_rejected() {
    let (hub, devices) = hub_with(&["bathroom"]).await;
    let err = hub
        .set_hvac_mode(vec![EntityId::from("number.bathroom_hysteresis")], "off")
        .await
        .unwrap_err();
    assert_eq!(err.validation_code(), Some(ValidationCode::NoValidTargets));
    assert!(devices[0].calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn registry_lifecycle() {
    let (hub, _devices) = hub_with(&["Guest Room", "office"]).await;
    assert_eq!(
        hub.ids(),
        vec![EntityId::climate("guest_room"), EntityId::climate("office")]
    );

    let duplicate = Controller::new(
        ControllerConfig {
            name: "office".into(),
            ..ControllerConfig::default()
        },
        Arc::new(SimulatedDevice::new("dup")) as Arc<dyn HeatingDevice>,
    );
    assert!(hub.register(duplicate).await.is_err());

    hub.deregister(&EntityId::climate("office")).await.unwrap();
    assert_eq!(hub.len(), 1);
    assert!(hub.get(&EntityId::climate("office")).is_none());
    assert!(hub.deregister(&EntityId::climate("office")).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn preset_batch_applies_schedule_pattern() {
    let (hub, devices) = hub_with(&["bathroom"]).await;
    let report = hub
        .set_preset_mode(vec![EntityId::climate("bathroom")], "fullweek")
        .await
        .unwrap();
    assert!(report.is_complete_success());
    assert_eq!(devices[0].status().schedule, hysen_api::registers::SCHEDULE_1234567);
}

#[tokio::test(start_paused = true)]
async fn concurrent_registration_keeps_one_controller() {
    let hub = ClimateHub::new();
    let devices: Vec<Arc<SimulatedDevice>> = (0..2)
        .map(|i| Arc::new(SimulatedDevice::new(format!("office-{i}.local"))))
        .collect();
    let office = |device: &Arc<SimulatedDevice>| {
        Controller::new(
            ControllerConfig {
                name: "office".into(),
                ..ControllerConfig::default()
            },
            Arc::clone(device) as Arc<dyn HeatingDevice>,
        )
    };

    let (a, b) = tokio::join!(
        hub.register(office(&devices[0])),
        hub.register(office(&devices[1]))
    );
    assert_eq!(u8::from(a.is_ok()) + u8::from(b.is_ok()), 1);
    assert_eq!(hub.len(), 1);

    hub.deregister(&EntityId::climate("office")).await.unwrap();
    for device in &devices {
        device.clear_calls();
    }
    tokio::time::sleep(std::time::Duration::from_secs(95)).await;
    for device in &devices {
        assert_eq!(device.count(Operation::GetStatus), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn free_form_climate_ids_are_routed_not_skipped() {
    let (hub, _devices) = hub_with(&["bathroom"]).await;
    let report = hub
        .set_hvac_mode(
            vec![
                EntityId::from("climate.bathroom"),
                EntityId::from("climate.Living-Room"),
            ],
            "heat",
        )
        .await
        .unwrap();
    assert_eq!(report.succeeded, vec![EntityId::climate("bathroom")]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.failed[0].entity_id.to_string(), "climate.Living-Room");
}
