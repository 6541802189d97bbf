//! Shared helpers for command handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use hysen_api::HeatingDevice;
use hysen_config::{Config, ConfigError, DeviceProfile, profile_to_controller_config};
use hysen_core::{
    BoundView, ClimateState, ClockState, CommandResult, ControllerConfig, NumberState,
    ParameterView, SelectState, SlotTimeState, SwitchState,
};

use crate::backend::StateFileDevice;
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::Ctx;

// ── Device resolution ───────────────────────────────────────────────

/// A resolved device profile, ready to wrap in a `Controller`.
pub struct Target {
    pub name: String,
    pub config: ControllerConfig,
    pub device: Arc<dyn HeatingDevice>,
}

/// Pick the device profile named by `--device` (or the default) and open
/// its backend.
pub fn resolve_target(
    cfg: &Config,
    device: Option<&str>,
    config_path: &std::path::Path,
) -> Result<Target, CliError> {
    let (name, profile) = cfg.device(device).map_err(|e| match e {
        ConfigError::UnknownDevice { name } => CliError::DeviceNotFound {
            name,
            available: available_devices(cfg),
        },
        ConfigError::NoDevices => CliError::NoConfig {
            path: config_path.display().to_string(),
        },
        other => other.into(),
    })?;
    open_target(name, profile, cfg)
}

pub fn open_target(
    name: &str,
    profile: &DeviceProfile,
    cfg: &Config,
) -> Result<Target, CliError> {
    let config = profile_to_controller_config(profile, name, &cfg.defaults)?;
    let device = StateFileDevice::open(&profile.host, &state_file(name, profile))?;
    Ok(Target {
        name: name.to_owned(),
        config,
        device: Arc::new(device),
    })
}

/// The profile's state file, or `<data dir>/<profile>.json`.
pub fn state_file(name: &str, profile: &DeviceProfile) -> PathBuf {
    profile
        .state_file
        .clone()
        .unwrap_or_else(|| hysen_config::data_dir().join(format!("{name}.json")))
}

fn available_devices(cfg: &Config) -> String {
    if cfg.devices.is_empty() {
        "(none)".into()
    } else {
        cfg.devices.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Single-request controllers skip the poller and the daily clock sync.
pub fn oneshot_config(mut config: ControllerConfig) -> ControllerConfig {
    config.refresh_interval = Duration::ZERO;
    config.clock_sync = None;
    config
}

/// `--output` wins, then the config file's default, then table.
pub fn output_format(flag: Option<OutputFormat>, cfg: &Config) -> OutputFormat {
    flag.unwrap_or(match cfg.defaults.output.to_ascii_lowercase().as_str() {
        "json" => OutputFormat::Json,
        "yaml" => OutputFormat::Yaml,
        _ => OutputFormat::Table,
    })
}

// ── Value parsing ───────────────────────────────────────────────────

pub fn parse_flag(field: &str, raw: &str) -> Result<bool, CliError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CliError::invalid(field, format!("expected on or off, got '{raw}'"))),
    }
}

pub fn parse_number(field: &str, raw: &str) -> Result<f32, CliError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CliError::invalid(field, format!("expected a number, got '{raw}'")))
}

// ── State descriptions ──────────────────────────────────────────────

/// One-line rendering of a view state for table output.
pub trait Describe {
    fn describe(&self) -> String;

    fn available(&self) -> bool;
}

impl Describe for ClimateState {
    fn describe(&self) -> String {
        format!(
            "{} ({}), {} -> {}, preset {}",
            output::or_dash(self.hvac_mode),
            self.hvac_action,
            output::temp(self.current_temperature),
            output::temp(self.target_temperature),
            output::or_dash(self.preset),
        )
    }

    fn available(&self) -> bool {
        self.available
    }
}

impl Describe for NumberState {
    fn describe(&self) -> String {
        self.value
            .map_or_else(|| "-".into(), |v| format!("{v}{}", self.unit))
    }

    fn available(&self) -> bool {
        self.available
    }
}

impl Describe for SelectState {
    fn describe(&self) -> String {
        self.current.clone().unwrap_or_else(|| "-".into())
    }

    fn available(&self) -> bool {
        self.available
    }
}

impl Describe for SwitchState {
    fn describe(&self) -> String {
        output::on_off(self.on)
    }

    fn available(&self) -> bool {
        self.available
    }
}

impl Describe for SlotTimeState {
    fn describe(&self) -> String {
        self.time
            .map_or_else(|| "-".into(), |t| t.format("%H:%M").to_string())
    }

    fn available(&self) -> bool {
        self.available
    }
}

impl Describe for ClockState {
    fn describe(&self) -> String {
        self.display.clone().unwrap_or_else(|| "-".into())
    }

    fn available(&self) -> bool {
        self.available
    }
}

// ── Write outcome ───────────────────────────────────────────────────

#[derive(Serialize)]
struct Outcome<S: Serialize> {
    entity: String,
    result: CommandResult,
    state: S,
}

/// Apply `value` through `view` and print what happened.
pub async fn apply<V>(view: &BoundView<V>, value: V::Value, ctx: &Ctx) -> Result<(), CliError>
where
    V: ParameterView + Clone,
    V::State: Describe,
{
    let result = view.set(value).await?;
    let outcome = Outcome {
        entity: view.key(),
        result,
        state: view.state(),
    };
    let out = output::render_single(ctx.output, &outcome, describe_outcome)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn describe_outcome<S: Serialize + Describe>(outcome: &Outcome<S>) -> String {
    match &outcome.result {
        CommandResult::Applied { writes, refreshed } => {
            let ops: Vec<String> = writes.iter().map(|w| w.operation().to_string()).collect();
            let mut line = format!(
                "✓ {} = {} ({})",
                outcome.entity,
                outcome.state.describe(),
                ops.join(", ")
            );
            if !refreshed {
                line.push_str("\n  warning: status re-read failed; value shown may be stale");
            }
            line
        }
        CommandResult::Refreshed { .. } => {
            format!("{} = {}", outcome.entity, outcome.state.describe())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("power", "ON").unwrap());
        assert!(!parse_flag("power", "false").unwrap());
        assert!(parse_flag("power", "maybe").is_err());
    }

    #[test]
    fn numbers_reject_non_finite() {
        assert_eq!(parse_number("temperature", " 21.5 ").unwrap(), 21.5);
        assert!(parse_number("temperature", "NaN").is_err());
        assert!(parse_number("temperature", "warm").is_err());
    }

    #[test]
    fn config_output_default_applies_without_flag() {
        let mut cfg = Config::default();
        cfg.defaults.output = "json".into();
        assert_eq!(output_format(None, &cfg), OutputFormat::Json);
        assert_eq!(output_format(Some(OutputFormat::Yaml), &cfg), OutputFormat::Yaml);
    }
}
