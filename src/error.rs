//! Error types.
//!
//! - `ConfigError`: a configuration value that cannot be translated
//! - `StepError`: anything the step's operations can fail with
//! - `AppError`: what the `fwfit` binary reports, with its exit code

use thiserror::Error;

use crate::config::fixed_nodes::FixedNodeError;
use crate::config::literal::LiteralError;
use crate::config::persist::PersistError;
use crate::domain::ConfigKey;
use crate::fit::FitFailure;
use crate::step::Port;

/// A configuration value that blocks translation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid value for `{key}`: {reason}")]
pub struct ConfigError {
    pub key: ConfigKey,
    pub reason: ConfigErrorReason,
}

impl ConfigError {
    pub fn new(key: ConfigKey, reason: impl Into<ConfigErrorReason>) -> Self {
        Self {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigErrorReason {
    #[error(transparent)]
    Syntax(#[from] LiteralError),

    #[error("expected {expected}, found {found}")]
    Type { expected: &'static str, found: String },

    #[error(transparent)]
    FixedNodes(#[from] FixedNodeError),
}

/// Failures of the step's operations.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The operator cancelled a running fit.
    #[error("mesh fitting aborted")]
    UserAbort,

    /// The fitting routine failed; its error is passed through unchanged.
    #[error(transparent)]
    Fit(FitFailure),

    #[error("no port with index {0}")]
    UnknownPort(usize),

    #[error("port `{port}` cannot be written")]
    ReadOnlyPort { port: Port },

    #[error("port `{port}` expects {expected}, got {found}")]
    PortPayload {
        port: Port,
        expected: &'static str,
        found: &'static str,
    },

    #[error("input port `{0}` has no data")]
    MissingInput(Port),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Error reported by the binary.
///
/// Exit codes: 2 input/IO, 3 configuration, 4 terminal/runtime.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl From<StepError> for AppError {
    fn from(err: StepError) -> Self {
        let code = match err {
            StepError::Config(_) | StepError::Persist(_) => 3,
            StepError::UnknownPort(_)
            | StepError::ReadOnlyPort { .. }
            | StepError::PortPayload { .. }
            | StepError::MissingInput(_) => 2,
            StepError::UserAbort | StepError::Fit(_) => 4,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_key() {
        let err = ConfigError::new(
            ConfigKey::Verbose,
            ConfigErrorReason::Type {
                expected: "boolean",
                found: "integer".to_string(),
            },
        );
        assert_eq!(err.to_string(), "invalid value for `verbose`: expected boolean, found integer");
    }

    #[test]
    fn abort_maps_to_runtime_exit_code() {
        let app: AppError = StepError::UserAbort.into();
        assert_eq!(app.exit_code(), 4);
        assert_eq!(app.to_string(), "mesh fitting aborted");
    }
}
