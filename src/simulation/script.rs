//! Stage scripting, the main loop, and snapshot emission.
//!
//! A run walks an ordered list of stages. Entering a stage fires its
//! one-shot action (populating the box, bonding the packing); while a stage
//! governs, every iteration of the main loop emits due snapshots, checks for
//! a stage transition, and advances the state by one integration step with
//! the stage's time step.
//!
//! The achieved end of a stage overshoots the intended one by at most one
//! time step; the overshoot is accumulated per stage as a diagnostic and
//! reported at the end of the run.

use super::{CachingMode, LinkLaw, Simulation, StageMode};
use crate::NLINK;
use crate::error::{Result, SimError};
use crate::link::Bond;
use crate::msg::{MsgBody, MsgEndian, MsgKind, MsgPrio, MsgSpec, write_kind};
use crate::vector::Vec2;
use crate::vector::math::{disk_volume, redir};
use log::{info, warn};
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::io::Write;
use std::sync::atomic::Ordering;

/// Summary of a completed (or interrupted) run for the report file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Completed integration steps.
    pub steps: u64,
    /// Final simulated time.
    pub time: f64,
    /// Final particle count.
    pub particles: usize,
    /// Final bond count.
    pub bonds: usize,
    /// Final kinetic energy.
    pub kinetic_energy: f64,
    /// Snapshot bundles emitted.
    pub snapshot_bundles: u64,
    /// Per-stage overshoot of the intended transition time.
    pub stage_time_error: Vec<f64>,
}

impl Simulation {
    /// Returns whether the script still has stages to run.
    pub fn ongoing(&self) -> bool {
        self.script.istage < self.opts.script.len()
    }

    /// Transitions to the next stage when the current one has elapsed.
    ///
    /// Records the overshoot of the intended transition time, advances the
    /// stage index, resets the stage clock, and fires the entry action of
    /// the new stage. Returns whether the simulation continues.
    pub fn trans(&mut self) -> Result<bool> {
        let stage = self.opts.script[self.script.istage];
        let toff = self.time.t - self.script.tprev - stage.tspan;

        if toff >= 0.0 {
            self.script.toff[self.script.istage] = toff;
            self.script.istage += 1;
            self.script.tprev = self.time.t;

            if !self.ongoing() {
                return Ok(false);
            }

            self.stage_enter()?;
        }

        Ok(true)
    }

    /// Fires the one-shot entry action of the current stage.
    fn stage_enter(&mut self) -> Result<()> {
        let mode = self.opts.script[self.script.istage].mode;

        match mode {
            StageMode::Create { eta } => self.create_packing(eta)?,
            StageMode::Link => self.link_all()?,
            StageMode::Crunch { .. } => {
                // The driving force builds up from rest in every crunch
                self.script.fdrive = Vec2::zero();
            }
            StageMode::Measure => {
                info!(
                    "measure: e_kin {:.6e}, p {:.6e}, l {:.6e}",
                    self.part.kinetic_energy(),
                    self.part.linear_momentum_magnitude(),
                    self.part.angular_momentum_scalar(),
                );
                info!(
                    "measure: restitution {:.4}, drift time {:.3e}",
                    self.part.mean_restitution(
                        self.opts.material.young_modulus,
                        self.opts.contact.dashpot_gamma,
                    ),
                    self.part
                        .drift_time(&self.opts.bounds.extents, &self.opts.cache.ncell),
                );
            }
            StageMode::Idle
            | StageMode::Begin
            | StageMode::Sediment { .. }
            | StageMode::Smash { .. } => {}
        }

        Ok(())
    }

    /// Runs exactly one integration step with the current stage's time step.
    ///
    /// Rebuilds the neighbor cache first when it is stale or some particle
    /// has drifted beyond the safe radius; a failed rebuild aborts the step.
    pub fn step(&mut self) -> Result<()> {
        if self.cache.stale || self.cache.expired(&self.part, &self.opts) {
            self.cache.rebuild(&self.part, &self.opts)?;
        }

        self.predict();
        self.force();
        self.correct()?;

        if self.time.istep % self.opts.istab == 0 {
            self.stabilize();
        }

        self.time.t += self.opts.script[self.script.istage].dt;
        self.time.istep += 1;

        Ok(())
    }

    /// Emits a snapshot bundle when a communication interval has elapsed.
    pub fn comm(&mut self) -> Result<()> {
        if self.time.t - self.comm.tprev - self.opts.dt_comm >= 0.0 {
            self.comm.tprev = self.time.t;
            self.put_snapshot()?;
            self.comm.bundles += 1;
        }

        Ok(())
    }

    /// Writes the three records of one snapshot bundle to the sink.
    fn put_snapshot(&mut self) -> Result<()> {
        if self.sink.is_none() {
            return Ok(());
        }

        let istep_payload = bincode::serialize(&(self.time.istep, self.time.t))?;
        let neigh_payload = bincode::serialize(&(&self.cache, &self.link))?;
        let parts_payload = bincode::serialize(&(self.part.len() as u64, &self.part))?;

        self.put_record(MsgKind::Istep, &istep_payload)?;
        self.put_record(MsgKind::Neigh, &neigh_payload)?;
        self.put_record(MsgKind::Parts, &parts_payload)?;

        Ok(())
    }

    /// Frames one record: header, kind octet, payload.
    fn put_record(&mut self, kind: MsgKind, payload: &[u8]) -> Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };

        let spec = MsgSpec {
            prio: MsgPrio::Low,
            endian: MsgEndian::Little,
            // The kind octet counts toward the framed size
            body: MsgBody::SizePrefixed(payload.len() as u64 + 1),
        };

        spec.write(sink.as_mut())?;
        write_kind(kind, sink.as_mut())?;
        sink.write_all(payload)?;

        Ok(())
    }

    /// Runs the script to completion, interruption, or failure.
    ///
    /// The loop polls the termination latch at every step boundary, emits
    /// due snapshots, transitions between stages, and steps the integrator.
    /// The time-error report is logged regardless of the outcome.
    pub fn run(&mut self) -> Result<()> {
        let result = self.run_loop().and_then(|()| match self.sink.as_mut() {
            Some(sink) => sink.flush().map_err(Into::into),
            None => Ok(()),
        });

        self.report();

        result
    }

    fn run_loop(&mut self) -> Result<()> {
        if self.ongoing() {
            self.stage_enter()?;
        }

        loop {
            if self.stop.load(Ordering::Relaxed) {
                return Err(SimError::Interrupted);
            }

            if !self.ongoing() {
                return Ok(());
            }

            self.comm()?;

            if !self.trans()? {
                return Ok(());
            }

            self.step()?;
        }
    }

    /// Logs the accumulated absolute time-quantization error.
    fn report(&self) {
        let toff: f64 = self.script.toff.iter().map(|t| t.abs()).sum();
        info!("time error: {toff:e}");
    }

    /// Summarizes the run for the report file.
    pub fn report_data(&self) -> RunReport {
        RunReport {
            steps: self.time.istep,
            time: self.time.t,
            particles: self.part.len(),
            bonds: self.link.total_bonds(),
            kinetic_energy: self.part.kinetic_energy(),
            snapshot_bundles: self.comm.bundles,
            stage_time_error: self.script.toff.clone(),
        }
    }

    /// Populates the box with a row-major packing of particles with
    /// uniformly sampled radii, up to the packing fraction `eta`.
    fn create_packing(&mut self, eta: f64) -> Result<()> {
        if !(eta > 0.0 && eta < 1.0) {
            return Err(SimError::BadParameter(format!(
                "packing fraction {eta} outside (0, 1)"
            )));
        }

        let extents = self.opts.bounds.extents;
        let vbox = extents.x * extents.y;
        let vlim = vbox * eta;
        // Unit material density
        let rho = 1.0;

        let [rmin, rmax] = self.opts.material.radius_range;
        let rdist = Uniform::new_inclusive(rmin, rmax)
            .map_err(|err| SimError::BadParameter(format!("radius range: {err}")))?;

        let mut cursor = Vec2::zero();
        let mut rowmax = 0.0f64;
        let mut vnow = 0.0;

        loop {
            let r = rdist.sample(&mut self.rng);
            let v = disk_volume(r);

            if vnow + v >= vlim {
                break;
            }

            if cursor.x + 2.0 * r >= extents.x {
                cursor.x = 0.0;
                cursor.y += 2.0 * rowmax;
                rowmax = 0.0;
            }

            if cursor.y + 2.0 * r > extents.y {
                warn!("box filled before reaching packing fraction {eta}");
                break;
            }

            let Some(ipart) = self.add_particle() else {
                warn!("particle capacity reached while creating packing");
                break;
            };

            self.part.r[ipart] = r;
            self.part.m[ipart] = rho * v;
            self.part.x[ipart] = cursor + Vec2::new(r, r);

            cursor.x += 2.0 * r;
            rowmax = rowmax.max(r);
            vnow += v;
        }

        info!(
            "created {} particles (packing fraction {:.3})",
            self.part.len(),
            vnow / vbox,
        );

        Ok(())
    }

    /// Bonds every eligible pair of particles once, through the configured
    /// pair iteration strategy.
    pub(crate) fn link_all(&mut self) -> Result<()> {
        let crdist = Uniform::new_inclusive(self.opts.links.crlim[0], self.opts.links.crlim[1])
            .map_err(|err| SimError::BadParameter(format!("tensile limit range: {err}")))?;
        let cphidist =
            Uniform::new_inclusive(self.opts.links.cphilim[0], self.opts.links.cphilim[1])
                .map_err(|err| SimError::BadParameter(format!("angular limit range: {err}")))?;

        match self.opts.caching {
            CachingMode::None => {
                for ipart in 0..self.part.len() {
                    for jpart in (ipart + 1)..self.part.len() {
                        self.link_pair(ipart, jpart, &crdist, &cphidist);
                    }
                }
            }
            CachingMode::Neighbor => {
                if self.cache.stale || self.cache.expired(&self.part, &self.opts) {
                    self.cache.rebuild(&self.part, &self.opts)?;
                }

                for ipart in 0..self.part.len() {
                    for ineigh in 0..self.cache.neigh[ipart].len() {
                        let jpart = self.cache.neigh[ipart][ineigh];
                        self.link_pair(ipart, jpart, &crdist, &cphidist);
                    }
                }
            }
        }

        info!("linked packing: {} bonds", self.link.total_bonds());

        Ok(())
    }

    /// Tries to bond `ipart` to `jpart`, freezing the rest geometry and
    /// sampling the breakage limits.
    ///
    /// Returns whether the bond was created. Pairs beyond the creation
    /// radius and bond lists at capacity are quiet refusals.
    fn link_pair(
        &mut self,
        ipart: usize,
        jpart: usize,
        crdist: &Uniform<f64>,
        cphidist: &Uniform<f64>,
    ) -> bool {
        let opts = &self.opts;

        let xdiff = self.part.x[ipart].pbc_diff(
            &self.part.x[jpart],
            &opts.bounds.extents,
            &opts.bounds.periodic,
        );

        let d2 = xdiff.norm_squared();
        let r = self.part.r[ipart] + self.part.r[jpart];

        if d2 > r * r * opts.links.ccrlink {
            return false;
        }

        if self.link.bond_count(ipart) >= NLINK {
            return false;
        }

        let d = d2.sqrt();
        let rrest = d * opts.links.cshlink;

        let phirest = match opts.link_law {
            LinkLaw::Beam => {
                let theta = xdiff.dir();

                [
                    self.part.phi[ipart] - theta,
                    self.part.phi[jpart] - redir(theta),
                ]
            }
        };

        let rlim = crdist.sample(&mut self.rng) * rrest;
        let philim = cphidist.sample(&mut self.rng) * TAU;

        self.link.push_bond(
            ipart,
            Bond {
                j: jpart,
                rrest,
                phirest,
                rlim,
                philim,
            },
        )
    }
}
