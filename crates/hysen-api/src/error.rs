use thiserror::Error;

use crate::operation::Operation;

/// Top-level error type for the `hysen-api` crate.
///
/// Every gateway call either succeeds completely or fails with one of these.
/// There are no partial writes. `hysen-core` attaches the failing
/// [`Operation`] and maps these into user-facing diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The device did not answer (network down, wrong host, powered off).
    #[error("Device at {host} unreachable: {reason}")]
    Unreachable { host: String, reason: String },

    /// No response within the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Malformed or checksum-failing response frame.
    #[error("Protocol error: {0}")]
    Protocol(String),

    // ── Device-side rejection ───────────────────────────────────────
    /// The device answered but refused the request.
    #[error("Device rejected {operation}: {reason}")]
    Rejected { operation: Operation, reason: String },

    /// A register value the device does not accept.
    #[error("Unsupported value {value} for {operation}")]
    UnsupportedValue { operation: Operation, value: String },

    // ── Backend ─────────────────────────────────────────────────────
    /// Failure inside a non-network backend (state file, simulator).
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Timeout { .. } | Self::Protocol(_)
        )
    }

    pub(crate) fn unsupported(operation: Operation, value: impl ToString) -> Self {
        Self::UnsupportedValue {
            operation,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_transient() {
        assert!(
            Error::Timeout { timeout_secs: 10 }.is_transient(),
            "timeouts should be retryable"
        );
        assert!(
            Error::Unreachable {
                host: "10.0.0.5".into(),
                reason: "no route".into(),
            }
            .is_transient()
        );
        assert!(Error::Protocol("bad checksum".into()).is_transient());
    }

    #[test]
    fn rejections_are_not_transient() {
        let err = Error::unsupported(Operation::SetHysteresis, 12);
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Unsupported value 12 for set_hysteresis");
    }
}
