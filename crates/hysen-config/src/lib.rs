//! Shared configuration for Hysen tools.
//!
//! TOML device profiles, layered loading (defaults, file, `HYSEN_*`
//! environment), and translation to `hysen_core::ControllerConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hysen_core::{ClockSyncConfig, ControllerConfig, MacAddress};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no device named '{name}' in config")]
    UnknownDevice { name: String },

    #[error("no devices configured (run `hysen config init`)")]
    NoDevices,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Device used when `--device` is not given.
    pub default_device: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named heating controllers.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_device: None,
            defaults: Defaults::default(),
            devices: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Status poll period in seconds. 0 disables polling.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            poll_interval: default_poll_interval(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_poll_interval() -> u64 {
    30
}
fn default_settle_delay_ms() -> u64 {
    200
}
fn default_sync_hour() -> u32 {
    4
}

/// One heating controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Address of the controller on the local network.
    pub host: String,

    pub mac: Option<String>,

    /// Display name; defaults to the profile key.
    pub name: Option<String>,

    /// Correct the device clock once a day.
    #[serde(default)]
    pub sync_clock: bool,

    /// Local hour for the daily clock sync.
    #[serde(default = "default_sync_hour")]
    pub sync_hour: u32,

    /// Where the simulated backend keeps its registers.
    pub state_file: Option<PathBuf>,

    /// Override the global poll interval.
    pub poll_interval: Option<u64>,
}

impl DeviceProfile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            mac: None,
            name: None,
            sync_clock: false,
            sync_hour: default_sync_hour(),
            state_file: None,
            poll_interval: None,
        }
    }
}

impl Config {
    /// Pick a device: explicit name, then `default_device`, then the only
    /// configured device.
    pub fn device(&self, name: Option<&str>) -> Result<(&str, &DeviceProfile), ConfigError> {
        let wanted = name.or(self.default_device.as_deref());
        match wanted {
            Some(wanted) => self
                .devices
                .get_key_value(wanted)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ConfigError::UnknownDevice {
                    name: wanted.to_owned(),
                }),
            None => {
                let mut iter = self.devices.iter();
                match (iter.next(), iter.next()) {
                    (Some((k, v)), None) => Ok((k.as_str(), v)),
                    (None, _) => Err(ConfigError::NoDevices),
                    (Some(_), Some(_)) => Err(ConfigError::Validation {
                        field: "default_device".into(),
                        reason: "several devices configured; pass --device or set default_device"
                            .into(),
                    }),
                }
            }
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "hysen", "hysen").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default directory for simulated device state files.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("com", "hysen", "hysen")
        .map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf())
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hysen");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, layered over defaults and under `HYSEN_*` env vars
/// (`HYSEN_DEFAULTS__POLL_INTERVAL=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HYSEN_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig` from a device profile and global defaults.
pub fn profile_to_controller_config(
    profile: &DeviceProfile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("device '{profile_name}' has no host"),
        });
    }

    let mac = profile
        .mac
        .as_deref()
        .map(|raw| {
            let mac = MacAddress::new(raw);
            if mac.is_valid() {
                Ok(mac)
            } else {
                Err(ConfigError::Validation {
                    field: "mac".into(),
                    reason: format!("invalid MAC address: {raw}"),
                })
            }
        })
        .transpose()?;

    let clock_sync = if profile.sync_clock {
        if profile.sync_hour > 23 {
            return Err(ConfigError::Validation {
                field: "sync_hour".into(),
                reason: format!("expected 0-23, got {}", profile.sync_hour),
            });
        }
        Some(ClockSyncConfig {
            hour: profile.sync_hour,
        })
    } else {
        None
    };

    Ok(ControllerConfig {
        name: profile
            .name
            .clone()
            .unwrap_or_else(|| profile_name.to_owned()),
        mac,
        refresh_interval: Duration::from_secs(
            profile.poll_interval.unwrap_or(defaults.poll_interval),
        ),
        settle_delay: Duration::from_millis(defaults.settle_delay_ms),
        clock_sync,
    })
}
