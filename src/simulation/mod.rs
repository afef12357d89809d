//! # Simulation Module - Discrete-Element Engine
//!
//! This module provides the simulation engine for two-dimensional granular
//! packings and brittle cohesive materials. A population of circular
//! particles advances through time under pairwise contact forces, optional
//! cohesive beam bonds, ambient damping, and stage-specific external
//! driving, while snapshots stream to a downstream sink.
//!
//! ## Architecture Overview
//!
//! The engine is single-threaded and non-suspending. One `Simulation`
//! aggregate owns the particle store, the bond store, the neighbor cache,
//! the scoped random source, and the script state. The only interleaving
//! points are between integration steps, where an atomic stop latch set by
//! an external signal handler is polled; in-flight force and integration
//! work always completes.
//!
//! The run loop drives an ordered script of stages. Each stage fixes the
//! time step, its duration, and the governing mode; transitions between
//! stages fire one-shot actions such as populating the box or bonding the
//! packing into a linked network.
//!
//! ## Submodules
//!
//! - [`forces`]: Force accumulation passes (ambient, pair contacts, bonds,
//!   external driving)
//! - [`integrate`]: Time integration and periodic stabilization
//! - [`script`]: Stage scripting, the step/transition loop, and snapshot
//!   emission
//! - [`tests`]: Unit and scenario tests for the engine

pub mod forces;
pub mod integrate;
pub mod script;

use crate::error::{Result, SimError};
use crate::link::LinkStore;
use crate::neighbor::NeighborCache;
use crate::particle::ParticleStore;
use crate::vector::Vec2;
use crate::{NDIM, NSTAGE};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Initialization scheme selector, reserved for alternative packing
/// generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitScheme {
    None,
    Trial,
    Cubic,
    PoissonDisk,
}

/// Time integration scheme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegratorKind {
    /// First-order explicit Euler.
    Euler,
    /// Gear predictor-corrector; reserved, currently unsupported.
    Gear,
}

/// Pair iteration strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachingMode {
    /// Exhaustive pair iteration.
    None,
    /// Iterate through the neighbor cache.
    Neighbor,
}

/// Ambient force law selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbientLaw {
    /// Numerical viscous sink.
    Creeping,
    /// Reserved quadratic drag.
    Quad,
    /// Reserved corrected drag.
    Corr,
}

/// Normal contact force law selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalLaw {
    None,
    /// Linear spring plus dashpot, clamped to repulsion.
    Dashpot,
}

/// Tangential contact force law selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TangentialLaw {
    None,
    /// Haff-Werner viscous friction with a Coulomb cap.
    HaffWerner,
}

/// Cohesive bond force law selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkLaw {
    /// Tensile spring with angular restoring torques at both endpoints.
    Beam,
}

/// Bounding box extents and per-dimension periodicity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsOptions {
    /// Box extents per dimension.
    pub extents: Vec2,
    /// Whether each dimension wraps periodically.
    pub periodic: [bool; NDIM],
}

impl Default for BoundsOptions {
    fn default() -> Self {
        BoundsOptions {
            extents: Vec2::new(1.0, 1.0),
            periodic: [true, false],
        }
    }
}

/// Particle material parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialOptions {
    /// Young's modulus of the particle material.
    pub young_modulus: f64,
    /// Support of the uniform radius distribution for created particles.
    pub radius_range: [f64; 2],
}

impl Default for MaterialOptions {
    fn default() -> Self {
        MaterialOptions {
            young_modulus: 1.0e3,
            radius_range: [0.04, 0.06],
        }
    }
}

/// Contact force parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactOptions {
    /// Dashpot damping of the normal force.
    pub dashpot_gamma: f64,
    /// Viscosity of the Haff-Werner tangential force.
    pub hw_gamma: f64,
    /// Coulomb friction coefficient capping the tangential force.
    pub hw_mu: f64,
}

impl Default for ContactOptions {
    fn default() -> Self {
        ContactOptions {
            dashpot_gamma: 1.0,
            hw_gamma: 1.0,
            hw_mu: 1.0,
        }
    }
}

/// Cohesive bond parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    /// Bond creation radius factor on the squared contact distance.
    pub ccrlink: f64,
    /// Rest length factor on the creation distance.
    pub cshlink: f64,
    /// Tensile spring constant.
    pub ktens: f64,
    /// Shear spring constant.
    pub kshear: f64,
    /// Support of the uniform tensile breakage limit, as a fraction of the
    /// rest length.
    pub crlim: [f64; 2],
    /// Support of the uniform angular breakage limit, as a fraction of a
    /// full turn.
    pub cphilim: [f64; 2],
}

impl Default for LinkOptions {
    fn default() -> Self {
        LinkOptions {
            ccrlink: 1.2,
            cshlink: 0.8,
            ktens: 1.0,
            kshear: 1.0,
            crlim: [1.0, 1.0],
            cphilim: [1.0, 1.0],
        }
    }
}

/// Neighbor cache tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Number of neighbor cells per dimension; at least 3.
    pub ncell: [usize; NDIM],
    /// Maximum distance for qualifying as a neighbor.
    pub rcutoff: f64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        CacheOptions {
            ncell: [5, 5],
            rcutoff: 0.5,
        }
    }
}

/// One stage of the simulation script.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stage {
    /// Duration of the stage in simulated time.
    pub tspan: f64,
    /// Time step used while the stage governs.
    pub dt: f64,
    /// Governing mode and its parameters.
    pub mode: StageMode,
}

/// The governing law of a script stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StageMode {
    /// No stage-specific behavior.
    Idle,
    /// Marks the start of an experiment.
    Begin,
    /// Populates the box with particles up to the packing fraction `eta`.
    Create { eta: f64 },
    /// Restores particles toward the box midline along axis 1 with
    /// strength `kcohes`.
    Sediment { kcohes: f64 },
    /// Bonds every eligible pair of particles once.
    Link,
    /// Pulls the clamped halves of the packing apart along `xgap`.
    Smash { xgap: [f64; NDIM] },
    /// Drives the boundary particles toward the velocity target `v`,
    /// adjusting the driving force by `fadjust` per step.
    Crunch { v: [f64; NDIM], fadjust: f64 },
    /// Records diagnostics without disturbing the system.
    Measure,
}

/// Complete, immutable configuration of a simulation run.
///
/// Constructed with defaults and overridden field by field or deserialized
/// from a TOML file. The engine validates the options once at construction
/// and never mutates them afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// Stabilization cadence in steps.
    pub istab: u64,
    /// Snapshot emission cadence in simulated time.
    pub dt_comm: f64,
    /// Seed of the engine-scoped random source; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Initialization scheme selector.
    pub init: InitScheme,
    /// Integration scheme selector.
    pub integrator: IntegratorKind,
    /// Pair iteration strategy.
    pub caching: CachingMode,
    /// Ambient force law.
    pub ambient: AmbientLaw,
    /// Normal contact force law.
    pub normal: NormalLaw,
    /// Tangential contact force law.
    pub tangential: TangentialLaw,
    /// Cohesive bond force law.
    pub link_law: LinkLaw,
    /// Bounding box.
    pub bounds: BoundsOptions,
    /// Particle material.
    pub material: MaterialOptions,
    /// Contact force parameters.
    pub contact: ContactOptions,
    /// Cohesive bond parameters.
    pub links: LinkOptions,
    /// Neighbor cache tuning.
    pub cache: CacheOptions,
    /// Ordered stages to run.
    pub script: Vec<Stage>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            istab: 1000,
            dt_comm: 1.0e-3,
            seed: None,
            init: InitScheme::Trial,
            integrator: IntegratorKind::Euler,
            caching: CachingMode::Neighbor,
            ambient: AmbientLaw::Creeping,
            normal: NormalLaw::Dashpot,
            tangential: TangentialLaw::HaffWerner,
            link_law: LinkLaw::Beam,
            bounds: BoundsOptions::default(),
            material: MaterialOptions::default(),
            contact: ContactOptions::default(),
            links: LinkOptions::default(),
            cache: CacheOptions::default(),
            script: Vec::new(),
        }
    }
}

impl SimulationOptions {
    /// Checks the numeric domains the engine relies on.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(SimError::BadParameter(msg));

        for idim in 0..NDIM {
            if !(self.bounds.extents[idim] > 0.0) {
                return bad(format!("box extent {idim} must be positive"));
            }
            if self.cache.ncell[idim] < 3 {
                return bad(format!("cell count {idim} must be at least 3"));
            }
        }

        if !(self.cache.rcutoff > 0.0) {
            return bad("neighbor cutoff must be positive".into());
        }
        if self.istab == 0 {
            return bad("stabilization cadence must be positive".into());
        }
        if !(self.dt_comm > 0.0) {
            return bad("communication interval must be positive".into());
        }
        if !(self.material.radius_range[0] > 0.0)
            || self.material.radius_range[0] > self.material.radius_range[1]
        {
            return bad("radius range must be positive and ordered".into());
        }
        if self.links.crlim[0] > self.links.crlim[1]
            || self.links.cphilim[0] > self.links.cphilim[1]
        {
            return bad("breakage limit ranges must be ordered".into());
        }

        if self.script.len() > NSTAGE {
            return bad(format!("script has more than {NSTAGE} stages"));
        }
        for (istage, stage) in self.script.iter().enumerate() {
            if !(stage.dt > 0.0) {
                return bad(format!("stage {istage} time step must be positive"));
            }
            if !(stage.tspan >= 0.0) {
                return bad(format!("stage {istage} duration must be nonnegative"));
            }
        }

        Ok(())
    }
}

/// Timekeeping state of a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Timekeeping {
    /// Completed integration steps.
    pub istep: u64,
    /// Current simulated time.
    pub t: f64,
}

/// Script progression state.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptState {
    /// Current stage index.
    pub istage: usize,
    /// Time of the previous stage transition.
    pub tprev: f64,
    /// Per-stage difference between intended and achieved transition time.
    pub toff: Vec<f64>,
    /// Accumulated crunch driving force.
    pub fdrive: Vec2,
}

/// Snapshot emission state.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CommState {
    /// Time of the previous emission.
    pub tprev: f64,
    /// Number of snapshot bundles emitted so far.
    pub bundles: u64,
}

/// The discrete-element simulation engine.
///
/// Owns all mutable state of a run. The snapshot sink, when present,
/// receives the framed message stream produced by the script driver; the
/// stop latch lets an external signal handler request cooperative
/// termination at the next step boundary.
pub struct Simulation {
    /// Immutable configuration.
    pub(crate) opts: SimulationOptions,
    /// Engine-scoped random source, consumed by the create and link stages.
    pub(crate) rng: StdRng,
    /// Timekeeping.
    pub(crate) time: Timekeeping,
    /// Particle state table.
    pub(crate) part: ParticleStore,
    /// Cohesive bond lists.
    pub(crate) link: LinkStore,
    /// Neighbor cache.
    pub(crate) cache: NeighborCache,
    /// Script progression.
    pub(crate) script: ScriptState,
    /// Snapshot emission bookkeeping.
    pub(crate) comm: CommState,
    /// Downstream snapshot sink.
    pub(crate) sink: Option<Box<dyn Write>>,
    /// Cooperative termination latch.
    pub(crate) stop: Arc<AtomicBool>,
}

impl Simulation {
    /// Creates an engine in the zeroed state from validated options.
    ///
    /// The snapshot stream goes to `sink` when one is given; a run without
    /// a sink still counts the bundles it would have emitted.
    pub fn new(opts: SimulationOptions, sink: Option<Box<dyn Write>>) -> Result<Self> {
        opts.validate()?;

        let rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let toff = vec![0.0; opts.script.len()];

        Ok(Simulation {
            opts,
            rng,
            time: Timekeeping::default(),
            part: ParticleStore::new(),
            link: LinkStore::new(),
            cache: NeighborCache::new(),
            script: ScriptState {
                istage: 0,
                tprev: 0.0,
                toff,
                fdrive: Vec2::zero(),
            },
            comm: CommState::default(),
            sink,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns an immutable reference to the configuration.
    pub fn options(&self) -> &SimulationOptions {
        &self.opts
    }

    /// Returns the completed step count.
    pub fn step_count(&self) -> u64 {
        self.time.istep
    }

    /// Returns the current simulated time.
    pub fn current_time(&self) -> f64 {
        self.time.t
    }

    /// Returns the current stage index.
    pub fn stage_index(&self) -> usize {
        self.script.istage
    }

    /// Returns an immutable reference to the particle table.
    pub fn particles(&self) -> &ParticleStore {
        &self.part
    }

    /// Returns an immutable reference to the bond lists.
    pub fn links(&self) -> &LinkStore {
        &self.link
    }

    /// Returns the number of snapshot bundles emitted so far.
    pub fn snapshot_bundles(&self) -> u64 {
        self.comm.bundles
    }

    /// Returns a cloned handle to the termination latch.
    ///
    /// An external signal handler sets the latch; the run loop observes it
    /// at the next step boundary and returns an interrupted error.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Requests cooperative termination at the next step boundary.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Adds a particle with default state, keeping the bond lists parallel
    /// and marking the neighbor cache stale.
    ///
    /// Returns `None` when the particle table is full.
    pub fn add_particle(&mut self) -> Option<usize> {
        let ipart = self.part.add()?;
        self.link.push_particle();
        self.cache.mark_stale();
        Some(ipart)
    }

    /// Removes a particle by swapping the last one into its slot.
    ///
    /// Bond lists are compacted and retargeted consistently and the
    /// neighbor cache is marked stale; any externally held particle index
    /// is invalid afterwards.
    pub fn remove_particle(&mut self, ipart: usize) {
        self.part.remove(ipart);
        self.link.remove_particle(ipart);
        self.cache.mark_stale();
    }
}
