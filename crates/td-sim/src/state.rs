//! Gas chamber state and the reporting snapshot.

use crate::config::EngineConfig;
use crate::error::SimResult;
use serde::Serialize;
use td_core::constants::R_J_PER_MOL_K;
use td_core::units::{Energy, Length, Pressure, Temperature, Time, Volume};
use td_core::{ensure_positive, j, k, m, m3, pa, s};

/// One closed, fixed-mass ideal-gas chamber at an instant.
///
/// Fields are crate-private and only the engine's update operations mutate
/// them; those keep `P·V = n·R·T` and `chamber_length · surface_area = volume`.
#[derive(Clone, Debug, PartialEq)]
pub struct GasState {
    pub(crate) volume_m3: f64,
    pub(crate) pressure_pa: f64,
    pub(crate) temperature_k: f64,
    moles: f64,
    pub(crate) elapsed_s: f64,
    pub(crate) work_done_j: f64,
    surface_area_m2: f64,
    piston_mass_kg: f64,
    pub(crate) chamber_length_m: f64,
}

impl GasState {
    /// Create a state from volume (m³), pressure (Pa) and temperature (K).
    ///
    /// Moles are fixed here from the ideal gas law; piston geometry comes from
    /// `config`.
    pub fn new(
        volume_m3: f64,
        pressure_pa: f64,
        temperature_k: f64,
        config: &EngineConfig,
    ) -> SimResult<Self> {
        let volume_m3 = ensure_positive(volume_m3, "volume must be positive and finite")?;
        let pressure_pa = ensure_positive(pressure_pa, "pressure must be positive and finite")?;
        let temperature_k =
            ensure_positive(temperature_k, "temperature must be positive and finite")?;
        config.validate()?;

        let moles = pressure_pa * volume_m3 / (R_J_PER_MOL_K * temperature_k);

        Ok(Self {
            volume_m3,
            pressure_pa,
            temperature_k,
            moles,
            elapsed_s: 0.0,
            work_done_j: 0.0,
            surface_area_m2: config.surface_area_m2,
            piston_mass_kg: config.piston_mass_kg,
            chamber_length_m: volume_m3 / config.surface_area_m2,
        })
    }

    pub fn volume_m3(&self) -> f64 {
        self.volume_m3
    }

    pub fn pressure_pa(&self) -> f64 {
        self.pressure_pa
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    pub fn moles(&self) -> f64 {
        self.moles
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn work_done_j(&self) -> f64 {
        self.work_done_j
    }

    pub fn surface_area_m2(&self) -> f64 {
        self.surface_area_m2
    }

    pub fn piston_mass_kg(&self) -> f64 {
        self.piston_mass_kg
    }

    pub fn chamber_length_m(&self) -> f64 {
        self.chamber_length_m
    }

    /// `n·R·T` for the current temperature (J).
    pub fn nrt(&self) -> f64 {
        self.moles * R_J_PER_MOL_K * self.temperature_k
    }

    /// Relative departure from the ideal gas law: `|PV − nRT| / nRT`.
    pub fn ideal_gas_residual(&self) -> f64 {
        let nrt = self.nrt();
        (self.pressure_pa * self.volume_m3 - nrt).abs() / nrt
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            time_s: self.elapsed_s,
            volume_m3: self.volume_m3,
            pressure_pa: self.pressure_pa,
            temperature_k: self.temperature_k,
            work_done_j: self.work_done_j,
        }
    }
}

/// Lossless copy of the reportable state, for table printers and exporters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub time_s: f64,
    pub volume_m3: f64,
    pub pressure_pa: f64,
    pub temperature_k: f64,
    pub work_done_j: f64,
}

impl StateSnapshot {
    pub fn time(&self) -> Time {
        s(self.time_s)
    }

    pub fn volume(&self) -> Volume {
        m3(self.volume_m3)
    }

    pub fn pressure(&self) -> Pressure {
        pa(self.pressure_pa)
    }

    pub fn temperature(&self) -> Temperature {
        k(self.temperature_k)
    }

    pub fn work_done(&self) -> Energy {
        j(self.work_done_j)
    }
}

/// Piston travel as a typed length.
pub fn displacement(state: &GasState) -> Length {
    m(state.chamber_length_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn new_derives_moles_and_geometry() {
        let state = GasState::new(0.01, 101_325.0, 300.0, &EngineConfig::default()).unwrap();
        let expected_moles = 101_325.0 * 0.01 / (R_J_PER_MOL_K * 300.0);
        assert!((state.moles() - expected_moles).abs() < 1e-12);
        assert!((state.chamber_length_m() - 0.25).abs() < 1e-12);
        assert_eq!(state.surface_area_m2(), 0.04);
        assert_eq!(state.piston_mass_kg(), 1.0);
        assert_eq!(state.elapsed_s(), 0.0);
        assert_eq!(state.work_done_j(), 0.0);
        assert!(state.ideal_gas_residual() < 1e-12);
    }

    #[test]
    fn new_rejects_bad_inputs() {
        let cfg = EngineConfig::default();
        for (v, p, t) in [
            (0.0, 101_325.0, 300.0),
            (0.01, -1.0, 300.0),
            (0.01, 101_325.0, 0.0),
            (f64::NAN, 101_325.0, 300.0),
            (0.01, f64::INFINITY, 300.0),
        ] {
            let err = GasState::new(v, p, t, &cfg).unwrap_err();
            assert!(matches!(err, SimError::InvalidArg { .. }), "{v} {p} {t}");
        }
    }

    #[test]
    fn snapshot_is_lossless() {
        use uom::si::volume::liter;

        let state = GasState::new(0.0123456789, 98_765.4321, 287.15, &EngineConfig::default())
            .unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.volume_m3, 0.0123456789);
        assert_eq!(snap.pressure_pa, 98_765.4321);
        assert_eq!(snap.temperature_k, 287.15);
        assert!((snap.volume().get::<liter>() - 12.3456789).abs() < 1e-9);
    }

    #[test]
    fn displacement_matches_chamber_length() {
        use uom::si::length::meter;

        let state = GasState::new(0.02, 101_325.0, 300.0, &EngineConfig::default()).unwrap();
        assert!((displacement(&state).get::<meter>() - 0.5).abs() < 1e-12);
    }
}
