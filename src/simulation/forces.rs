//! Force accumulation passes of the engine.
//!
//! Each step clears the per-particle force and torque accumulators and then
//! runs four passes in a strict sequence: ambient, pair contacts, cohesive
//! bonds, external driving. Pair contacts go either through the neighbor
//! cache or over all pairs exhaustively, depending on the configured caching
//! mode; both orderings visit every unordered pair exactly once, so force
//! assembly is deterministic for a given configuration.

use super::{AmbientLaw, CachingMode, NormalLaw, Simulation, StageMode, TangentialLaw};
use crate::particle::Role;
use crate::scalar::swrap;
use crate::vector::Vec2;
use crate::vector::math::redir;
use std::f64::consts::TAU;

impl Simulation {
    /// Runs the complete force assembly for the current step.
    pub(crate) fn force(&mut self) {
        self.clear_forces();
        self.force_ambient();
        self.force_pairs();
        self.force_links();
        self.force_external();
    }

    /// Zeroes every force and torque accumulator.
    fn clear_forces(&mut self) {
        for ipart in 0..self.part.len() {
            self.part.f[ipart] = Vec2::zero();
            self.part.tau[ipart] = 0.0;
        }
    }

    /// Applies the ambient law to every particle.
    fn force_ambient(&mut self) {
        match self.opts.ambient {
            AmbientLaw::Creeping => {
                for ipart in 0..self.part.len() {
                    self.part.f[ipart] = self.part.f[ipart] * (1.0 - 1.0e-2);
                }
            }
            // Reserved drag laws, currently the identity
            AmbientLaw::Quad | AmbientLaw::Corr => {}
        }
    }

    /// Iterates the pair contacts through the configured strategy.
    fn force_pairs(&mut self) {
        match self.opts.caching {
            CachingMode::None => {
                for ipart in 0..self.part.len() {
                    for jpart in (ipart + 1)..self.part.len() {
                        self.force_pair(ipart, jpart);
                    }
                }
            }
            CachingMode::Neighbor => {
                for ipart in 0..self.part.len() {
                    for ineigh in 0..self.cache.neigh[ipart].len() {
                        let jpart = self.cache.neigh[ipart][ineigh];
                        self.force_pair(ipart, jpart);
                    }
                }
            }
        }
    }

    /// Accumulates the contact force between one pair of particles.
    pub(crate) fn force_pair(&mut self, ipart: usize, jpart: usize) {
        let opts = &self.opts;
        let part = &mut self.part;

        let xdiff = part.x[ipart].pbc_diff(
            &part.x[jpart],
            &opts.bounds.extents,
            &opts.bounds.periodic,
        );

        let d2 = xdiff.norm_squared();
        let r = part.r[ipart] + part.r[jpart];

        // No contact without overlap; coincident centers have no normal
        if d2 > r * r || d2 == 0.0 {
            return;
        }

        let d = d2.sqrt();
        let xnorm = xdiff / d;
        let xtang = xnorm.rperp();

        let vdiff = part.v[ipart] - part.v[jpart];

        let xi = r - d;
        let dotxi = vdiff.dot(&xnorm);
        let vtang = vdiff.dot(&xtang)
            + part.r[ipart] * part.omega[ipart]
            + part.r[jpart] * part.omega[jpart];

        let fnorm = match opts.normal {
            NormalLaw::Dashpot => {
                (opts.material.young_modulus * xi + opts.contact.dashpot_gamma * dotxi).max(0.0)
            }
            NormalLaw::None => 0.0,
        };

        part.f[ipart] -= xnorm * fnorm;
        part.f[jpart] += xnorm * fnorm;

        let ftang = match opts.tangential {
            TangentialLaw::HaffWerner => -(opts.contact.hw_gamma * vtang.abs())
                .min(opts.contact.hw_mu * fnorm)
                .copysign(vtang),
            TangentialLaw::None => 0.0,
        };

        part.f[ipart] += xtang * ftang;
        part.f[jpart] -= xtang * ftang;

        // Both torques take the same sign. Action-reaction would flip one of
        // them, but this is the established convention of the contact model
        // and the bond torques are calibrated against it.
        part.tau[ipart] += ftang * part.r[ipart];
        part.tau[jpart] += ftang * part.r[jpart];
    }

    /// Applies every stored cohesive bond and breaks the overstrained ones.
    fn force_links(&mut self) {
        for ipart in 0..self.part.len() {
            let mut k = 0;

            while k < self.link.bonds[ipart].len() {
                let bond = self.link.bonds[ipart][k];

                if self.force_link(ipart, bond.j, k) {
                    k += 1;
                } else {
                    self.link.break_bond(ipart, k);
                }
            }
        }
    }

    /// Accumulates one beam bond between `ipart` and `jpart`.
    ///
    /// Returns whether the bond survived; an overstrained bond contributes
    /// no force and is removed by the caller.
    fn force_link(&mut self, ipart: usize, jpart: usize, k: usize) -> bool {
        let opts = &self.opts;
        let part = &mut self.part;
        let bond = &self.link.bonds[ipart][k];

        let xdiff = part.x[ipart].pbc_diff(
            &part.x[jpart],
            &opts.bounds.extents,
            &opts.bounds.periodic,
        );

        let d = xdiff.norm();
        if d == 0.0 {
            return true;
        }

        let stretch = d - bond.rrest;
        if stretch.abs() > bond.rlim {
            return false;
        }

        let theta = xdiff.dir();
        let dphi_i = swrap(part.phi[ipart] - theta - bond.phirest[0], TAU);
        let dphi_j = swrap(part.phi[jpart] - redir(theta) - bond.phirest[1], TAU);

        if dphi_i.abs() > bond.philim || dphi_j.abs() > bond.philim {
            return false;
        }

        let xnorm = xdiff / d;

        part.f[ipart] += xnorm * (opts.links.ktens * stretch);
        part.f[jpart] -= xnorm * (opts.links.ktens * stretch);

        part.tau[ipart] -= opts.links.kshear * dphi_i;
        part.tau[jpart] -= opts.links.kshear * dphi_j;

        true
    }

    /// Applies the external driving of the current stage.
    fn force_external(&mut self) {
        let Some(stage) = self.opts.script.get(self.script.istage) else {
            return;
        };
        let mode = stage.mode;

        match mode {
            StageMode::Sediment { kcohes } => {
                let midline = self.opts.bounds.extents[1] / 2.0;

                for ipart in 0..self.part.len() {
                    self.part.f[ipart][1] += kcohes * (midline - self.part.x[ipart][1]);
                }
            }
            StageMode::Crunch { v, fadjust } => {
                // Walk the driving force toward the velocity target, then
                // push the driven particles with it and clamp the fixed ones
                let mut vmean = Vec2::zero();
                let mut ndriven = 0;

                for ipart in 0..self.part.len() {
                    if self.part.role[ipart] == Role::Driven {
                        vmean += self.part.v[ipart];
                        ndriven += 1;
                    }
                }

                if ndriven > 0 {
                    vmean = vmean / ndriven as f64;

                    for idim in 0..2 {
                        if vmean[idim] < v[idim] {
                            self.script.fdrive[idim] += fadjust;
                        } else {
                            self.script.fdrive[idim] -= fadjust;
                        }
                    }
                }

                for ipart in 0..self.part.len() {
                    match self.part.role[ipart] {
                        Role::Driven => self.part.f[ipart] += self.script.fdrive,
                        Role::Fixed => {
                            self.part.f[ipart] = Vec2::zero();
                            self.part.tau[ipart] = 0.0;
                        }
                        Role::Free => {}
                    }
                }
            }
            StageMode::Smash { xgap } => {
                // Pull the clamped halves of the packing apart along the gap
                // vector; free particles follow through contacts and bonds
                let midline = self.opts.bounds.extents[1] / 2.0;
                let gap = Vec2::new(xgap[0], xgap[1]);

                for ipart in 0..self.part.len() {
                    if self.part.role[ipart] != Role::Free {
                        let side = if self.part.x[ipart][1] >= midline {
                            1.0
                        } else {
                            -1.0
                        };

                        self.part.f[ipart] += gap * side;
                    }
                }
            }
            StageMode::Idle
            | StageMode::Begin
            | StageMode::Create { .. }
            | StageMode::Link
            | StageMode::Measure => {}
        }
    }
}
