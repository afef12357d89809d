//! Time integration and angular stabilization.
//!
//! The integrator is first-order explicit Euler with per-dimension periodic
//! wrapping. The Gear predictor-corrector selector is reserved; its
//! prediction pass is a no-op and its correction pass is an explicit
//! unsupported branch.

use super::{IntegratorKind, Simulation};
use crate::error::{Result, SimError};
use crate::scalar::uwrap;
use std::f64::consts::TAU;

impl Simulation {
    /// Prediction half of the integrator. A no-op for Euler.
    pub(crate) fn predict(&mut self) {
        match self.opts.integrator {
            IntegratorKind::Euler => {}
            IntegratorKind::Gear => {}
        }
    }

    /// Correction half of the integrator; advances the state by one step.
    pub(crate) fn correct(&mut self) -> Result<()> {
        match self.opts.integrator {
            IntegratorKind::Euler => {
                self.integrate_euler();
                Ok(())
            }
            IntegratorKind::Gear => Err(SimError::UnsupportedLaw("gear predictor-corrector")),
        }
    }

    /// Explicit Euler update of every particle.
    ///
    /// Accelerations come from the force accumulators, velocities from the
    /// accelerations, positions from the velocities, in that order; periodic
    /// dimensions wrap the position back into the box. The angular update
    /// uses the moment of inertia cached at the last neighbor-cache build.
    fn integrate_euler(&mut self) {
        let dt = self.opts.script[self.script.istage].dt;
        let part = &mut self.part;

        for ipart in 0..part.len() {
            for idim in 0..2 {
                part.a[ipart][idim] = part.f[ipart][idim] / part.m[ipart];
                part.v[ipart][idim] += part.a[ipart][idim] * dt;
                part.x[ipart][idim] += part.v[ipart][idim] * dt;

                if self.opts.bounds.periodic[idim] {
                    part.x[ipart][idim] =
                        uwrap(part.x[ipart][idim], self.opts.bounds.extents[idim]);
                }
            }

            part.alpha[ipart] = part.tau[ipart] / self.cache.moi[ipart];
            part.phi[ipart] += part.omega[ipart] * dt;
            part.omega[ipart] += part.alpha[ipart] * dt;
        }
    }

    /// Wraps every angle into `[0, 2π)`.
    ///
    /// Runs every `istab` steps to keep the angular coordinate from growing
    /// without bound over long runs.
    pub(crate) fn stabilize(&mut self) {
        for ipart in 0..self.part.len() {
            self.part.phi[ipart] = uwrap(self.part.phi[ipart], TAU);
        }
    }
}
