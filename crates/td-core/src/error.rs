use thiserror::Error;

pub type TdResult<T> = Result<T, TdError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TdError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what} (value={value})")]
    InvalidArg { what: &'static str, value: f64 },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
