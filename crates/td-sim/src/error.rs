//! Error types for engine operations.

use td_core::TdError;
use thiserror::Error;

/// Errors raised by the gas-chamber engine.
///
/// Every variant is local to one operation call; the committed state is left
/// untouched when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Domain error: {what}")]
    Domain { what: &'static str },

    #[error("Convergence failed after {iterations} iterations: {what}")]
    ConvergenceFailed {
        what: &'static str,
        iterations: usize,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<TdError> for SimError {
    fn from(e: TdError) -> Self {
        match e {
            TdError::NonFinite { what, .. } | TdError::InvalidArg { what, .. } => {
                SimError::InvalidArg { what }
            }
            TdError::Invariant { what } => SimError::Domain { what },
        }
    }
}

impl From<serde_yaml::Error> for SimError {
    fn from(e: serde_yaml::Error) -> Self {
        SimError::Config {
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Config {
            message: e.to_string(),
        }
    }
}
