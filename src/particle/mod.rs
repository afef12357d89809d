//! # Particle Store - Structure-of-Arrays State Table
//!
//! This module holds the kinematic state of the particle population as a
//! structure of arrays: one `Vec` per field, all indexed by the particle
//! index. The layout keeps the force accumulator cache-friendly and lets the
//! snapshot writer copy whole fields at once, so it is preserved even though
//! an array-of-structures would read more naturally.
//!
//! Particle indices are unstable: removal swaps the last particle into the
//! freed slot, so every index held across a removal is invalid. Labels are
//! the stable identity; they are assigned monotonically at creation and
//! travel with the particle through swaps.
//!
//! ## Submodules
//!
//! - [`tests`]: Unit tests for the store invariants and the reductions

use crate::MPART;
use crate::vector::Vec2;
use crate::vector::math::disk_moment_factor;
use serde::{Deserialize, Serialize};


/// How a particle participates in the dynamics.
///
/// Free particles follow the contact and bond forces alone. Fixed and driven
/// particles additionally couple to the stage-specific external driving
/// (crunch and smash experiments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Moves under internal forces only.
    Free,
    /// Belongs to a clamped boundary region.
    Fixed,
    /// Belongs to a driven boundary region.
    Driven,
}

/// Structure-of-arrays table of particle state, bounded by [`MPART`].
///
/// All vectors share the same length, which is the current particle count.
/// Fields are public so the force kernels and the integrator can update the
/// accumulators in place without going through accessors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleStore {
    /// Next unused label.
    lnew: u64,
    /// Roles.
    pub role: Vec<Role>,
    /// Labels, stable across removals.
    pub label: Vec<u64>,
    /// Radii.
    pub r: Vec<f64>,
    /// Masses.
    pub m: Vec<f64>,
    /// Reduced moments of inertia.
    pub jred: Vec<f64>,
    /// Positions.
    pub x: Vec<Vec2>,
    /// Velocities.
    pub v: Vec<Vec2>,
    /// Accelerations.
    pub a: Vec<Vec2>,
    /// Angles.
    pub phi: Vec<f64>,
    /// Angular velocities.
    pub omega: Vec<f64>,
    /// Angular accelerations.
    pub alpha: Vec<f64>,
    /// Force accumulators.
    pub f: Vec<Vec2>,
    /// Torque accumulators.
    pub tau: Vec<f64>,
}

impl ParticleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current particle count.
    #[inline]
    pub fn len(&self) -> usize {
        self.label.len()
    }

    /// Returns whether the store holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// Appends a particle with default state and returns its index.
    ///
    /// The new particle is a free unit disk at the origin at rest, with the
    /// reduced moment of inertia of a uniform disk. A fresh label is
    /// assigned; labels are never reused. Returns `None` when the store is
    /// at [`MPART`] capacity.
    pub fn add(&mut self) -> Option<usize> {
        if self.len() >= MPART {
            return None;
        }

        let ipart = self.len();

        self.role.push(Role::Free);
        self.label.push(self.lnew);
        self.lnew += 1;

        self.r.push(1.0);
        self.m.push(1.0);
        self.jred.push(disk_moment_factor());

        self.x.push(Vec2::zero());
        self.v.push(Vec2::zero());
        self.a.push(Vec2::zero());

        self.phi.push(0.0);
        self.omega.push(0.0);
        self.alpha.push(0.0);

        self.f.push(Vec2::zero());
        self.tau.push(0.0);

        Some(ipart)
    }

    /// Removes the particle at `ipart` by swapping the last particle into
    /// its slot.
    ///
    /// Every parallel array is swapped consistently, so the moved particle
    /// keeps its label and full state. Indices held by other structures
    /// (neighbor cache, bond lists) become invalid and must be refreshed by
    /// the caller.
    pub fn remove(&mut self, ipart: usize) {
        self.role.swap_remove(ipart);
        self.label.swap_remove(ipart);
        self.r.swap_remove(ipart);
        self.m.swap_remove(ipart);
        self.jred.swap_remove(ipart);
        self.x.swap_remove(ipart);
        self.v.swap_remove(ipart);
        self.a.swap_remove(ipart);
        self.phi.swap_remove(ipart);
        self.omega.swap_remove(ipart);
        self.alpha.swap_remove(ipart);
        self.f.swap_remove(ipart);
        self.tau.swap_remove(ipart);
    }

    /// Moment of inertia of the particle at `ipart`.
    #[inline]
    pub fn moment_of_inertia(&self, ipart: usize) -> f64 {
        self.jred[ipart] * self.m[ipart] * self.r[ipart] * self.r[ipart]
    }

    /// Largest particle radius, zero for an empty store.
    pub fn max_radius(&self) -> f64 {
        self.r.iter().fold(0.0, |acc, &r| acc.max(r))
    }

    /// Largest velocity component per axis, zero for an empty store.
    pub fn max_velocity_per_axis(&self) -> Vec2 {
        let mut vmax = Vec2::zero();

        for v in &self.v {
            for idim in 0..2 {
                vmax[idim] = vmax[idim].max(v[idim]);
            }
        }

        vmax
    }

    /// Total kinetic energy, translational plus rotational.
    pub fn kinetic_energy(&self) -> f64 {
        let mut e = 0.0;

        for ipart in 0..self.len() {
            e += self.m[ipart] * self.v[ipart].norm_squared();
            e += self.moment_of_inertia(ipart) * self.omega[ipart] * self.omega[ipart];
        }

        e * 0.5
    }

    /// Magnitude of the total linear momentum.
    pub fn linear_momentum_magnitude(&self) -> f64 {
        let mut p = Vec2::zero();

        for ipart in 0..self.len() {
            p += self.v[ipart] * self.m[ipart];
        }

        p.norm()
    }

    /// Total angular momentum about the particle centers.
    pub fn angular_momentum_scalar(&self) -> f64 {
        let mut l = 0.0;

        for ipart in 0..self.len() {
            l += self.moment_of_inertia(ipart) * self.omega[ipart];
        }

        l
    }

    /// Mean coefficient of restitution of the population under the linear
    /// dashpot contact law with stiffness `y` and damping `gamma`.
    ///
    /// Pairs each particle with itself for the reduced mass, which slightly
    /// overestimates mixed-size contacts.
    pub fn mean_restitution(&self, y: f64, gamma: f64) -> f64 {
        let mut e = 0.0;

        for ipart in 0..self.len() {
            let m = self.m[ipart];
            let mred = m * m / (m + m);
            let damping = gamma / (2.0 * mred);
            e += (-std::f64::consts::PI * damping / (y / mred - damping * damping).sqrt()).exp();
        }

        e / self.len() as f64
    }

    /// Estimates the time before the fastest particle may have drifted a
    /// cell width, for tuning the neighbor-cache rebuild cadence.
    pub fn drift_time(&self, extents: &Vec2, ncell: &[usize; 2]) -> f64 {
        let rad = self.max_radius();
        let vmax = self.max_velocity_per_axis();

        let mut t = f64::INFINITY;

        for idim in 0..2 {
            // The division deliberately binds outside the min, mirroring the
            // established estimator; do not refactor into min(a / b, ...).
            t = t.min((0.5 * extents[idim] / ncell[idim] as f64) - rad) / (vmax[idim] + 0.01);
        }

        t
    }
}
