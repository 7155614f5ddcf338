//! Piston relaxation: fixed-step mechanical settling of the chamber piston.
//!
//! The piston starts at rest and is pushed by the difference between the gas
//! pressure and the target pressure, scaled by a ramp that grows each step:
//!
//! ```text
//! a = (P - P_target) * ramp * A / m
//! x += v*dt + 0.5*a*dt²
//! v += a*dt
//! V = x * A,  P = P0*V0 / V
//! ```
//!
//! The run stops on the first reversal of the piston velocity, i.e. at the end
//! of the first swing past equilibrium.

use crate::config::RelaxationOptions;
use crate::error::{SimError, SimResult};
use td_core::Sign;
use tracing::{debug, warn};

/// Kinematic state of the piston.
#[derive(Clone, Debug, PartialEq)]
pub struct PistonState {
    /// Chamber length (m)
    pub chamber_length_m: f64,
    /// Piston velocity (m/s), positive when the chamber grows
    pub velocity_m_s: f64,
}

/// Rigid piston of fixed face area and mass.
#[derive(Clone, Debug)]
pub struct Piston {
    /// Face area (m²)
    pub surface_area_m2: f64,
    /// Mass (kg)
    pub mass_kg: f64,
}

impl Piston {
    /// Acceleration from the gas/target pressure difference, scaled by `ramp`.
    pub fn acceleration(&self, pressure_pa: f64, target_pa: f64, ramp: f64) -> f64 {
        (pressure_pa - target_pa) * ramp * self.surface_area_m2 / self.mass_kg
    }

    /// Advance by `dt` under constant acceleration.
    pub fn step(&self, state: &PistonState, dt: f64, accel: f64) -> PistonState {
        PistonState {
            chamber_length_m: state.chamber_length_m
                + state.velocity_m_s * dt
                + 0.5 * accel * dt * dt,
            velocity_m_s: state.velocity_m_s + accel * dt,
        }
    }
}

/// Starting conditions for one relaxation run.
#[derive(Clone, Debug)]
pub struct RelaxationInput {
    pub pressure_pa: f64,
    pub volume_m3: f64,
    pub target_pressure_pa: f64,
    pub surface_area_m2: f64,
    pub piston_mass_kg: f64,
}

/// Outcome of a relaxation run.
#[derive(Clone, Debug, PartialEq)]
pub struct Relaxation {
    /// Simulated settling time (s)
    pub elapsed_s: f64,
    pub pressure_pa: f64,
    pub volume_m3: f64,
    pub chamber_length_m: f64,
    /// Steps taken
    pub iterations: usize,
}

/// Fixed-step piston relaxation simulator.
#[derive(Clone, Debug, Default)]
pub struct PistonRelaxation {
    options: RelaxationOptions,
}

impl PistonRelaxation {
    pub fn new(options: RelaxationOptions) -> SimResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Run until the piston velocity first reverses.
    ///
    /// # Errors
    /// - `Domain` if the inputs or any intermediate length, volume or pressure
    ///   leave the positive finite range.
    /// - `ConvergenceFailed` if `max_iterations` steps pass without a reversal
    ///   (e.g. the gas already sits at the target pressure).
    pub fn run(&self, input: &RelaxationInput) -> SimResult<Relaxation> {
        for (v, what) in [
            (input.pressure_pa, "relaxation start pressure must be positive"),
            (input.volume_m3, "relaxation start volume must be positive"),
            (input.target_pressure_pa, "relaxation target pressure must be positive"),
            (input.surface_area_m2, "piston surface area must be positive"),
            (input.piston_mass_kg, "piston mass must be positive"),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SimError::Domain { what });
            }
        }

        let opts = &self.options;
        let dt = opts.time_step_s;
        let piston = Piston {
            surface_area_m2: input.surface_area_m2,
            mass_kg: input.piston_mass_kg,
        };
        // Isothermal: P·V stays at its starting value throughout.
        let pv = input.pressure_pa * input.volume_m3;

        let mut state = PistonState {
            chamber_length_m: input.volume_m3 / input.surface_area_m2,
            velocity_m_s: 0.0,
        };
        let mut pressure_pa = input.pressure_pa;
        let mut volume_m3 = input.volume_m3;
        let mut time_s = 0.0;
        let mut ramp = opts.ramp_start;

        for iteration in 1..=opts.max_iterations {
            let sign_before = Sign::of(state.velocity_m_s);

            let accel = piston.acceleration(pressure_pa, input.target_pressure_pa, ramp);
            state = piston.step(&state, dt, accel);

            if !state.chamber_length_m.is_finite() || state.chamber_length_m <= 0.0 {
                return Err(SimError::Domain {
                    what: "piston travel collapsed the chamber",
                });
            }
            volume_m3 = state.chamber_length_m * input.surface_area_m2;
            pressure_pa = pv / volume_m3;
            time_s += dt;
            ramp = (ramp + opts.ramp_step).min(opts.ramp_ceiling);

            let sign_after = Sign::of(state.velocity_m_s);
            if !sign_before.is_zero() && sign_after != sign_before {
                debug!(
                    iterations = iteration,
                    elapsed_s = time_s,
                    pressure_pa,
                    volume_m3,
                    "piston velocity reversed"
                );
                return Ok(Relaxation {
                    elapsed_s: time_s,
                    pressure_pa,
                    volume_m3,
                    chamber_length_m: state.chamber_length_m,
                    iterations: iteration,
                });
            }
        }

        warn!(
            max_iterations = opts.max_iterations,
            pressure_pa,
            volume_m3,
            target_pa = input.target_pressure_pa,
            "relaxation cap reached without velocity reversal"
        );
        Err(SimError::ConvergenceFailed {
            what: "piston velocity never reversed",
            iterations: opts.max_iterations,
        })
    }
}
