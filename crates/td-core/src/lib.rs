//! td-core: shared foundation for the thermodyn gas-chamber engine.
//!
//! Contains:
//! - units (uom SI types + constructors, physical constants)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TdError, TdResult};
pub use numeric::*;
pub use units::*;
