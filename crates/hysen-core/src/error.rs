// ── Core error types ──
//
// User-facing errors from hysen-core. Gateway failures are wrapped with the
// operation that produced them so callers always see "Error in <operation>".

use hysen_api::Operation;
use thiserror::Error;

use crate::command::ValidationCode;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Rejected before device contact ───────────────────────────────
    #[error("Validation failed ({code}): {message}")]
    Validation {
        code: ValidationCode,
        message: String,
    },

    // ── Device errors ────────────────────────────────────────────────
    #[error("Error in {operation}: {source}")]
    Device {
        operation: Operation,
        #[source]
        source: hysen_api::Error,
    },

    /// No successful status read yet, so nothing to validate against.
    #[error("No status has been read from the device yet")]
    NotReady,

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Controller disconnected")]
    ControllerDisconnected,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(code: ValidationCode, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn device(operation: Operation, source: hysen_api::Error) -> Self {
        Self::Device { operation, source }
    }

    /// Machine-readable reason for validation failures.
    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            Self::Validation { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The gateway operation that failed, for device errors.
    pub fn failed_operation(&self) -> Option<Operation> {
        match self {
            Self::Device { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

// ── Conversion from gateway errors ───────────────────────────────────

impl From<hysen_api::Error> for CoreError {
    /// Attribute an error to the operation it names, falling back to the
    /// status read for transport failures that carry no operation.
    fn from(err: hysen_api::Error) -> Self {
        let operation = match &err {
            hysen_api::Error::Rejected { operation, .. }
            | hysen_api::Error::UnsupportedValue { operation, .. } => *operation,
            _ => Operation::GetStatus,
        };
        Self::Device {
            operation,
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_names_operation() {
        let err = CoreError::device(
            Operation::SetPower,
            hysen_api::Error::Timeout { timeout_secs: 10 },
        );
        assert_eq!(
            err.to_string(),
            "Error in set_power: Request timed out after 10s"
        );
        assert_eq!(err.failed_operation(), Some(Operation::SetPower));
    }

    #[test]
    fn validation_error_carries_code() {
        let err = CoreError::validation(ValidationCode::BelowTarget, "max 18 below target 21");
        assert_eq!(err.validation_code(), Some(ValidationCode::BelowTarget));
        assert_eq!(
            err.to_string(),
            "Validation failed (below_target): max 18 below target 21"
        );
    }

    #[test]
    fn rejected_gateway_error_keeps_its_operation() {
        let err: CoreError = hysen_api::Error::UnsupportedValue {
            operation: Operation::SetHysteresis,
            value: "12".into(),
        }
        .into();
        assert_eq!(err.failed_operation(), Some(Operation::SetHysteresis));
    }
}
