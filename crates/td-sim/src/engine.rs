//! Thermodynamic engine: owns one gas chamber and applies process steps to it.

use crate::config::{EngineConfig, WorkConvention};
use crate::error::{SimError, SimResult};
use crate::relaxation::{PistonRelaxation, Relaxation, RelaxationInput};
use crate::state::{GasState, StateSnapshot};
use td_core::units::{Pressure, Temperature, Volume};
use tracing::debug;

/// Sole owner of a [`GasState`].
///
/// Operations stage their results in locals and commit only on success, so a
/// failed call leaves the previous state intact.
///
/// ## Processes
///
/// - Isometric (Gay-Lussac): `T₂ = T₁ · P₂/P₁`, volume and time unchanged.
/// - Isothermal relaxation (Boyle): the gas relaxes toward the configured
///   equilibrium pressure; the piston simulator supplies elapsed time and the
///   settled `(P, V, x)`.
#[derive(Debug)]
pub struct ThermodynamicEngine {
    state: GasState,
    config: EngineConfig,
    relaxation: PistonRelaxation,
}

impl ThermodynamicEngine {
    /// Create an engine with the default chamber configuration.
    pub fn create(volume_m3: f64, pressure_pa: f64, temperature_k: f64) -> SimResult<Self> {
        Self::with_config(volume_m3, pressure_pa, temperature_k, EngineConfig::default())
    }

    pub fn with_config(
        volume_m3: f64,
        pressure_pa: f64,
        temperature_k: f64,
        config: EngineConfig,
    ) -> SimResult<Self> {
        let state = GasState::new(volume_m3, pressure_pa, temperature_k, &config)?;
        let relaxation = PistonRelaxation::new(config.relaxation.clone())?;
        debug!(
            volume_m3,
            pressure_pa,
            temperature_k,
            moles = state.moles(),
            "gas chamber created"
        );
        Ok(Self {
            state,
            config,
            relaxation,
        })
    }

    /// Create from typed quantities with the default configuration.
    pub fn from_quantities(
        volume: Volume,
        pressure: Pressure,
        temperature: Temperature,
    ) -> SimResult<Self> {
        use uom::si::{pressure::pascal, thermodynamic_temperature::kelvin, volume::cubic_meter};
        Self::create(
            volume.get::<cubic_meter>(),
            pressure.get::<pascal>(),
            temperature.get::<kelvin>(),
        )
    }

    /// Constant-volume pressure change; temperature follows proportionally.
    pub fn update_pressure_isometric(&mut self, new_pressure_pa: f64) -> SimResult<()> {
        if !new_pressure_pa.is_finite() || new_pressure_pa <= 0.0 {
            return Err(SimError::Domain {
                what: "new pressure must be positive and finite",
            });
        }
        let old_pressure = self.state.pressure_pa;
        if old_pressure <= 0.0 {
            return Err(SimError::Domain {
                what: "current pressure must be positive",
            });
        }

        let new_temperature = self.state.temperature_k * (new_pressure_pa / old_pressure);
        if !new_temperature.is_finite() || new_temperature <= 0.0 {
            return Err(SimError::Domain {
                what: "isometric update produced a non-physical temperature",
            });
        }

        debug!(
            old_pressure_pa = old_pressure,
            new_pressure_pa,
            old_temperature_k = self.state.temperature_k,
            new_temperature_k = new_temperature,
            "isometric update"
        );
        self.state.pressure_pa = new_pressure_pa;
        self.state.temperature_k = new_temperature;
        Ok(())
    }

    /// Constant-temperature relaxation toward the equilibrium pressure.
    ///
    /// Work is charged from the analytic Boyle's-law volume, not from the
    /// simulator's settled volume.
    pub fn relax_to_equilibrium(&mut self) -> SimResult<Relaxation> {
        let state = &self.state;
        if state.pressure_pa <= 0.0 || state.volume_m3 <= 0.0 {
            return Err(SimError::Domain {
                what: "pressure and volume must be positive before relaxation",
            });
        }

        let target_pressure = self.config.equilibrium_pressure_pa;
        let analytic_volume = state.pressure_pa * state.volume_m3 / target_pressure;
        let work = isothermal_work(
            state.nrt(),
            state.volume_m3,
            analytic_volume,
            self.config.work_convention,
        );

        let outcome = self.relaxation.run(&RelaxationInput {
            pressure_pa: state.pressure_pa,
            volume_m3: state.volume_m3,
            target_pressure_pa: target_pressure,
            surface_area_m2: state.surface_area_m2(),
            piston_mass_kg: state.piston_mass_kg(),
        })?;

        debug!(
            old_volume_m3 = state.volume_m3,
            new_volume_m3 = outcome.volume_m3,
            analytic_volume_m3 = analytic_volume,
            new_pressure_pa = outcome.pressure_pa,
            elapsed_s = outcome.elapsed_s,
            work_j = work,
            "isothermal relaxation"
        );

        let state = &mut self.state;
        state.elapsed_s += outcome.elapsed_s;
        state.work_done_j += work;
        state.volume_m3 = outcome.volume_m3;
        state.pressure_pa = outcome.pressure_pa;
        state.chamber_length_m = outcome.chamber_length_m;
        Ok(outcome)
    }

    pub fn pressure(&self) -> f64 {
        self.state.pressure_pa
    }

    pub fn elapsed_time(&self) -> f64 {
        self.state.elapsed_s
    }

    /// Current chamber length (m).
    pub fn displacement(&self) -> f64 {
        self.state.chamber_length_m
    }

    pub fn state(&self) -> &GasState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Release the chamber, returning its final snapshot.
    pub fn dispose(self) -> StateSnapshot {
        let snapshot = self.state.snapshot();
        debug!(
            elapsed_s = snapshot.time_s,
            work_done_j = snapshot.work_done_j,
            "gas chamber disposed"
        );
        snapshot
    }
}

/// Work for an isothermal volume change `v_old -> v_new` at fixed `nRT`.
pub fn isothermal_work(nrt: f64, v_old: f64, v_new: f64, convention: WorkConvention) -> f64 {
    match convention {
        WorkConvention::Magnitude => nrt * (v_old.max(v_new) / v_old.min(v_new)).ln(),
        WorkConvention::Signed => nrt * (v_new / v_old).ln(),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn isometric_keeps_ideal_gas_law(
            v in 1e-4_f64..1.0,
            p in 1e3_f64..1e7,
            t in 50.0_f64..2000.0,
            factor in 0.2_f64..5.0,
        ) {
            let mut engine = ThermodynamicEngine::create(v, p, t).unwrap();
            let before = engine.snapshot();
            engine.update_pressure_isometric(p * factor).unwrap();
            let after = engine.snapshot();

            prop_assert!(engine.state().ideal_gas_residual() < 1e-9);
            prop_assert_eq!(after.volume_m3, before.volume_m3);
            prop_assert_eq!(after.time_s, before.time_s);
            prop_assert_eq!(after.work_done_j, before.work_done_j);
            let ratio_before = before.temperature_k / before.pressure_pa;
            let ratio_after = after.temperature_k / after.pressure_pa;
            prop_assert!((ratio_after - ratio_before).abs() <= 1e-12 * ratio_before);
        }
    }
}
