//! Engine configuration: piston geometry, ambient target and relaxation limits.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use td_core::constants::P_ATM_PA;
use td_core::ensure_positive;

/// How isothermal work is accumulated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkConvention {
    /// Always add `|nRT ln(V2/V1)|`, whatever the direction of travel.
    #[default]
    Magnitude,
    /// Add `nRT ln(V_new/V_old)`: positive on expansion, negative on compression.
    Signed,
}

/// Fixed-step settings for the piston relaxation simulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationOptions {
    /// Integrator step (seconds)
    pub time_step_s: f64,
    /// Initial scaling of the driving pressure difference
    pub ramp_start: f64,
    /// Ramp increment per step
    pub ramp_step: f64,
    /// Upper bound for the ramp
    pub ramp_ceiling: f64,
    /// Maximum number of steps (safety limit)
    pub max_iterations: usize,
}

impl Default for RelaxationOptions {
    fn default() -> Self {
        Self {
            time_step_s: 1e-4,
            ramp_start: 0.01,
            ramp_step: 0.01,
            ramp_ceiling: 0.99,
            max_iterations: 200_000,
        }
    }
}

impl RelaxationOptions {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.time_step_s, "time_step_s must be positive")?;
        ensure_positive(self.ramp_start, "ramp_start must be positive")?;
        ensure_positive(self.ramp_ceiling, "ramp_ceiling must be positive")?;
        if !self.ramp_step.is_finite() || self.ramp_step < 0.0 {
            return Err(SimError::InvalidArg {
                what: "ramp_step must be non-negative",
            });
        }
        if self.ramp_ceiling > 1.0 {
            return Err(SimError::InvalidArg {
                what: "ramp_ceiling must not exceed 1",
            });
        }
        if self.ramp_start > self.ramp_ceiling {
            return Err(SimError::InvalidArg {
                what: "ramp_start must not exceed ramp_ceiling",
            });
        }
        if self.max_iterations == 0 {
            return Err(SimError::InvalidArg {
                what: "max_iterations must be positive",
            });
        }
        Ok(())
    }
}

/// Everything the engine treats as a fixed constant.
///
/// All fields are optional in YAML; missing ones take the defaults below.
///
/// ```yaml
/// equilibrium_pressure_pa: 101325.0
/// surface_area_m2: 0.04
/// piston_mass_kg: 1.0
/// work_convention: signed
/// relaxation:
///   time_step_s: 0.0001
///   max_iterations: 500000
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ambient pressure that isothermal relaxation targets (Pa)
    pub equilibrium_pressure_pa: f64,
    /// Piston face area (m²)
    pub surface_area_m2: f64,
    /// Piston mass (kg)
    pub piston_mass_kg: f64,
    pub relaxation: RelaxationOptions,
    pub work_convention: WorkConvention,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            equilibrium_pressure_pa: P_ATM_PA,
            surface_area_m2: 0.04,
            piston_mass_kg: 1.0,
            relaxation: RelaxationOptions::default(),
            work_convention: WorkConvention::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(
            self.equilibrium_pressure_pa,
            "equilibrium_pressure_pa must be positive",
        )?;
        ensure_positive(self.surface_area_m2, "surface_area_m2 must be positive")?;
        ensure_positive(self.piston_mass_kg, "piston_mass_kg must be positive")?;
        self.relaxation.validate()
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> SimResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load_yaml(path: &Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
