//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use hysen_api::Operation;
use hysen_config::ConfigError;
use hysen_core::{CoreError, ValidationCode};

/// Process exit codes. Usage errors (2) are reported by clap itself.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const VALIDATION: i32 = 3;
    pub const DEVICE: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
    pub const CONFIG: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hysen::invalid_input))]
    Validation { field: String, reason: String },

    #[error("{message} ({code})")]
    #[diagnostic(
        code(hysen::validation),
        help("Nothing was sent to the device.")
    )]
    Rejected {
        code: ValidationCode,
        message: String,
    },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Error in {operation}: {source}")]
    #[diagnostic(
        code(hysen::device),
        help("Check that the thermostat is powered and reachable, then retry.")
    )]
    Device {
        operation: Operation,
        #[source]
        source: hysen_api::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(hysen::unavailable))]
    Unavailable(String),

    #[error("{failed} of {total} batch targets failed")]
    #[diagnostic(
        code(hysen::batch_incomplete),
        help("The report above lists each failure. Successful targets were not rolled back.")
    )]
    BatchIncomplete { failed: usize, total: usize },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Device '{name}' not found in configuration")]
    #[diagnostic(
        code(hysen::device_not_found),
        help(
            "Configured devices: {available}\n\
             Add one with: hysen config init --name {name} --host <address>"
        )
    )]
    DeviceNotFound { name: String, available: String },

    #[error("Entity '{identifier}' not found")]
    #[diagnostic(code(hysen::entity_not_found))]
    EntityNotFound { identifier: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No devices configured")]
    #[diagnostic(
        code(hysen::no_config),
        help(
            "Create one with: hysen config init --host <address>\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Invalid configuration for {field}: {reason}")]
    #[diagnostic(code(hysen::config_invalid))]
    ConfigInvalid { field: String, reason: String },

    #[error("Profile '{name}' already exists")]
    #[diagnostic(code(hysen::profile_exists), help("Pass --force to replace it."))]
    ProfileExists { name: String },

    #[error(transparent)]
    #[diagnostic(code(hysen::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::Rejected { .. } => exit_code::VALIDATION,
            Self::Device { .. } | Self::Unavailable(_) | Self::BatchIncomplete { .. } => {
                exit_code::DEVICE
            }
            Self::DeviceNotFound { .. } | Self::EntityNotFound { .. } => exit_code::NOT_FOUND,
            Self::NoConfig { .. }
            | Self::ConfigInvalid { .. }
            | Self::ProfileExists { .. }
            | Self::Config(_) => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { code, message } => CliError::Rejected { code, message },
            CoreError::Device { operation, source } => CliError::Device { operation, source },
            CoreError::NotReady | CoreError::ControllerDisconnected => {
                CliError::Unavailable(err.to_string())
            }
            CoreError::DeviceNotFound { identifier } => CliError::EntityNotFound { identifier },
            CoreError::Config { message } => CliError::ConfigInvalid {
                field: "device".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::ConfigInvalid { field, reason },
            ConfigError::UnknownDevice { name } => CliError::DeviceNotFound {
                name,
                available: String::new(),
            },
            ConfigError::NoDevices => CliError::NoConfig {
                path: String::new(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        let rejected: CliError =
            CoreError::validation(ValidationCode::BelowTarget, "max below target").into();
        assert_eq!(rejected.exit_code(), exit_code::VALIDATION);

        let device: CliError = CoreError::device(
            Operation::SetPower,
            hysen_api::Error::Timeout { timeout_secs: 5 },
        )
        .into();
        assert_eq!(device.exit_code(), exit_code::DEVICE);
        assert_eq!(device.to_string(), "Error in set_power: Request timed out after 5s");

        let missing: CliError = ConfigError::UnknownDevice {
            name: "attic".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let empty: CliError = ConfigError::NoDevices.into();
        assert_eq!(empty.exit_code(), exit_code::CONFIG);
    }
}
