#![allow(clippy::unwrap_used)]
// Loading, device selection, and profile translation.

use std::time::Duration;

use figment::Jail;
use pretty_assertions::assert_eq;

use hysen_config::{
    Config, ConfigError, Defaults, DeviceProfile, load_config_from, profile_to_controller_config,
    save_config_to,
};
use hysen_core::{ClockSyncConfig, MacAddress};

const SAMPLE: &str = r#"
default_device = "bathroom"

[defaults]
poll_interval = 60

[devices.bathroom]
host = "192.168.1.40"
mac = "34EA34B43B5A"
name = "Bathroom Floor"
sync_clock = true
sync_hour = 3

[devices.kitchen]
host = "192.168.1.41"
poll_interval = 0
"#;

#[test]
fn loads_devices_and_defaults_from_file() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", SAMPLE)?;
        let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();

        assert_eq!(cfg.default_device.as_deref(), Some("bathroom"));
        assert_eq!(cfg.defaults.poll_interval, 60);
        assert_eq!(cfg.defaults.settle_delay_ms, 200);
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.devices.len(), 2);
        assert_eq!(cfg.devices["kitchen"].sync_hour, 4);
        assert!(!cfg.devices["kitchen"].sync_clock);
        Ok(())
    });
}

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", SAMPLE)?;
        jail.set_env("HYSEN_DEFAULTS__POLL_INTERVAL", "10");
        jail.set_env("HYSEN_DEFAULT_DEVICE", "kitchen");

        let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
        assert_eq!(cfg.defaults.poll_interval, 10);
        assert_eq!(cfg.default_device.as_deref(), Some("kitchen"));
        Ok(())
    });
}

#[test]
fn missing_file_yields_defaults() {
    Jail::expect_with(|jail| {
        let cfg = load_config_from(&jail.directory().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        Ok(())
    });
}

#[test]
fn device_selection_order() {
    let mut cfg = Config::default();
    assert!(matches!(cfg.device(None), Err(ConfigError::NoDevices)));

    cfg.devices.insert("office".into(), DeviceProfile::new("10.0.0.2"));
    let (name, _) = cfg.device(None).unwrap();
    assert_eq!(name, "office");

    cfg.devices.insert("hall".into(), DeviceProfile::new("10.0.0.3"));
    assert!(matches!(cfg.device(None), Err(ConfigError::Validation { .. })));

    cfg.default_device = Some("hall".into());
    assert_eq!(cfg.device(None).unwrap().0, "hall");
    assert_eq!(cfg.device(Some("office")).unwrap().0, "office");
    assert!(matches!(
        cfg.device(Some("attic")),
        Err(ConfigError::UnknownDevice { name }) if name == "attic"
    ));
}

#[test]
fn profile_translates_to_controller_config() {
    let profile = DeviceProfile {
        mac: Some("34-EA-34-B4-3B-5A".into()),
        name: Some("Bathroom Floor".into()),
        sync_clock: true,
        sync_hour: 3,
        ..DeviceProfile::new("192.168.1.40")
    };
    let defaults = Defaults {
        poll_interval: 45,
        settle_delay_ms: 500,
        ..Defaults::default()
    };

    let cfg = profile_to_controller_config(&profile, "bathroom", &defaults).unwrap();
    assert_eq!(cfg.name, "Bathroom Floor");
    assert_eq!(cfg.mac, Some(MacAddress::new("34:ea:34:b4:3b:5a")));
    assert_eq!(cfg.refresh_interval, Duration::from_secs(45));
    assert_eq!(cfg.settle_delay, Duration::from_millis(500));
    assert_eq!(cfg.clock_sync, Some(ClockSyncConfig { hour: 3 }));
}

#[test]
fn profile_poll_interval_overrides_default() {
    let profile = DeviceProfile {
        poll_interval: Some(0),
        ..DeviceProfile::new("192.168.1.41")
    };
    let cfg = profile_to_controller_config(&profile, "kitchen", &Defaults::default()).unwrap();
    assert_eq!(cfg.name, "kitchen");
    assert_eq!(cfg.refresh_interval, Duration::ZERO);
    assert_eq!(cfg.clock_sync, None);
}

#[test]
fn invalid_profiles_are_rejected() {
    let defaults = Defaults::default();

    let bad_hour = DeviceProfile {
        sync_clock: true,
        sync_hour: 24,
        ..DeviceProfile::new("10.0.0.2")
    };
    let err = profile_to_controller_config(&bad_hour, "office", &defaults).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { field, .. } if field == "sync_hour"));

    let bad_mac = DeviceProfile {
        mac: Some("34:ea:34".into()),
        ..DeviceProfile::new("10.0.0.2")
    };
    let err = profile_to_controller_config(&bad_mac, "office", &defaults).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { field, .. } if field == "mac"));

    let no_host = DeviceProfile::new("  ");
    assert!(profile_to_controller_config(&no_host, "office", &defaults).is_err());
}

#[test]
fn save_then_load_preserves_profiles() {
    Jail::expect_with(|jail| {
        let path = jail.directory().join("nested").join("config.toml");

        let mut cfg = Config {
            default_device: Some("office".into()),
            ..Config::default()
        };
        cfg.devices.insert(
            "office".into(),
            DeviceProfile {
                state_file: Some(jail.directory().join("office.json")),
                ..DeviceProfile::new("10.0.0.2")
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[devices.office]"));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        Ok(())
    });
}
