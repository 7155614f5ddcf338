//! State-transition engine for a closed, fixed-mass ideal-gas chamber.
//!
//! Provides:
//! - `GasState`: volume, pressure, temperature, fixed moles and piston geometry
//! - Isometric pressure updates (Gay-Lussac)
//! - Isothermal relaxation toward ambient pressure (Boyle) with work accounting
//! - Fixed-step piston relaxation simulator for settling time
//! - YAML-loadable engine configuration

pub mod config;
pub mod engine;
pub mod error;
pub mod relaxation;
pub mod state;

// Re-exports for public API
pub use config::{EngineConfig, RelaxationOptions, WorkConvention};
pub use engine::{ThermodynamicEngine, isothermal_work};
pub use error::{SimError, SimResult};
pub use relaxation::{Piston, PistonRelaxation, PistonState, Relaxation, RelaxationInput};
pub use state::{GasState, StateSnapshot, displacement};
