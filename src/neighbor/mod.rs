//! # Neighbor Cache - Uniform Cell Grid with Lazy Rebuild
//!
//! Pair-force evaluation over all particle pairs is quadratic in the
//! particle count. This module bounds it by binning particles into a uniform
//! grid of cells and keeping, for every particle, the list of candidates
//! within the cutoff radius. The cache is rebuilt lazily: a staleness flag is
//! raised on topology changes (particle added or removed), and a drift test
//! detects when some particle has moved far enough since the last build that
//! its cell assignment may be off by more than one cell.
//!
//! To visit each unordered pair exactly once, the build walks only half of
//! the Moore neighborhood of every cell (the cell itself plus the cells
//! whose offset vector is lexicographically positive) and breaks same-cell
//! ties by index order.
//!
//! ## Submodules
//!
//! - [`tests`]: Unit tests for binning, eligibility, drift expiry, and
//!   capacity failures

use crate::error::{Result, SimError};
use crate::particle::ParticleStore;
use crate::scalar::{self, swrap, unhc};
use crate::simulation::SimulationOptions;
use crate::vector::Vec2;
use crate::{NGROUP, NNEIGH};
use serde::{Deserialize, Serialize};

// Unit tests
pub mod tests;

/// Offsets of the half Moore neighborhood: the cell itself plus the cells
/// whose offset is lexicographically greater than zero. Together with the
/// same-cell index tie-break this visits every unordered pair of nearby
/// particles exactly once.
const HALF_MOORE: [[i64; 2]; 5] = [[0, 0], [0, 1], [1, -1], [1, 0], [1, 1]];

/// Grid-backed neighbor lists with a staleness flag and the position
/// snapshot taken at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborCache {
    /// Whether the cache must be rebuilt before use.
    pub stale: bool,
    /// Positions at the last build.
    pub x: Vec<Vec2>,
    /// Cell index vector of each particle at the last build.
    pub ijcell: Vec<[usize; 2]>,
    /// Flattened cell index of each particle at the last build.
    pub icell: Vec<usize>,
    /// Particle indices in each cell, bounded by [`NGROUP`].
    pub cell: Vec<Vec<usize>>,
    /// Neighbor candidates of each particle, bounded by [`NNEIGH`].
    pub neigh: Vec<Vec<usize>>,
    /// Cached moments of inertia.
    pub moi: Vec<f64>,
}

impl Default for NeighborCache {
    fn default() -> Self {
        NeighborCache {
            // A fresh cache has never been built
            stale: true,
            x: Vec::new(),
            ijcell: Vec::new(),
            icell: Vec::new(),
            cell: Vec::new(),
            neigh: Vec::new(),
            moi: Vec::new(),
        }
    }
}

impl NeighborCache {
    /// Creates an empty, stale cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the cache for rebuild before its next use.
    #[inline]
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Cell index vector of a position.
    ///
    /// Each component is `clamp(floor(x * (ncell - 1) / extent), 0,
    /// ncell - 1)`.
    pub fn cell_vector(x: &Vec2, opts: &SimulationOptions) -> [usize; 2] {
        let mut ij = [0; 2];

        for idim in 0..2 {
            let ncell = opts.cache.ncell[idim];
            let t = x[idim] * (ncell - 1) as f64 / opts.bounds.extents[idim];

            ij[idim] = if t < 0.0 {
                0
            } else if t >= (ncell - 1) as f64 {
                ncell - 1
            } else {
                t as usize
            };
        }

        ij
    }

    /// Whether particles `ipart` and `jpart` qualify as a neighbor pair
    /// from `ipart`'s list.
    ///
    /// Not symmetric and not reflexive: same-cell pairs are kept only in
    /// index order so that the half-neighborhood walk records each pair
    /// once.
    fn eligible(&self, ipart: usize, jpart: usize, opts: &SimulationOptions) -> bool {
        if self.icell[ipart] == self.icell[jpart] && jpart <= ipart {
            return false;
        }

        self.x[ipart].pbc_dist_squared(
            &self.x[jpart],
            &opts.bounds.extents,
            &opts.bounds.periodic,
        ) <= opts.cache.rcutoff * opts.cache.rcutoff
    }

    /// Flattened indices of the half-Moore neighborhood of the cell `ij`.
    ///
    /// Periodic dimensions wrap modulo the cell count; on non-periodic
    /// dimensions, offsets that leave the grid are skipped.
    fn half_moore_cells(ij: &[usize; 2], opts: &SimulationOptions) -> Vec<usize> {
        let mut cells = Vec::with_capacity(HALF_MOORE.len());

        'offsets: for offset in &HALF_MOORE {
            let mut jcell = [0usize; 2];

            for idim in 0..2 {
                let ncell = opts.cache.ncell[idim] as i64;
                let c = ij[idim] as i64 + offset[idim];

                if opts.bounds.periodic[idim] {
                    jcell[idim] = scalar::uwrap(c, ncell) as usize;
                } else if (0..ncell).contains(&c) {
                    jcell[idim] = c as usize;
                } else {
                    continue 'offsets;
                }
            }

            cells.push(unhc(&jcell, &opts.cache.ncell));
        }

        cells
    }

    /// Rebuilds the cache from the current particle state.
    ///
    /// The build recomputes the cached moments of inertia, snapshots the
    /// positions, bins every particle into its cell, and refills the
    /// per-particle neighbor lists through the half-Moore walk. A cell or
    /// neighbor list overflowing its capacity fails the build; the caller
    /// treats this as fatal for the step.
    pub fn rebuild(&mut self, part: &ParticleStore, opts: &SimulationOptions) -> Result<()> {
        let n = part.len();

        self.moi.clear();
        self.moi.extend((0..n).map(|ipart| part.moment_of_inertia(ipart)));

        self.x.clear();
        self.x.extend_from_slice(&part.x);

        self.ijcell.clear();
        self.ijcell
            .extend(part.x.iter().map(|x| Self::cell_vector(x, opts)));

        self.icell.clear();
        self.icell
            .extend(self.ijcell.iter().map(|ij| unhc(ij, &opts.cache.ncell)));

        let ncells = opts.cache.ncell[0] * opts.cache.ncell[1];
        self.cell.clear();
        self.cell.resize(ncells, Vec::new());

        for ipart in 0..n {
            let list = &mut self.cell[self.icell[ipart]];

            if list.len() >= NGROUP {
                return Err(SimError::Capacity {
                    what: "neighbor cell",
                    limit: NGROUP,
                });
            }

            list.push(ipart);
        }

        self.neigh.clear();
        self.neigh.resize(n, Vec::new());

        for ipart in 0..n {
            for icell in Self::half_moore_cells(&self.ijcell[ipart], opts) {
                for igroup in 0..self.cell[icell].len() {
                    let jpart = self.cell[icell][igroup];

                    if self.eligible(ipart, jpart, opts) {
                        if self.neigh[ipart].len() >= NNEIGH {
                            return Err(SimError::Capacity {
                                what: "neighbor list",
                                limit: NNEIGH,
                            });
                        }

                        self.neigh[ipart].push(jpart);
                    }
                }
            }
        }

        self.stale = false;

        Ok(())
    }

    /// Whether some particle has drifted beyond the safe radius since the
    /// last build.
    ///
    /// The safe radius along each dimension is the half cell margin
    /// `extent / (2 * (ncell - 2))` minus one particle radius, which
    /// guarantees no particle has crossed more than one cell since the
    /// snapshot was taken. Drifting exactly one safe radius is still within
    /// that guarantee, so the comparison is strict. The staleness flag
    /// short-circuits the scan.
    pub fn expired(&self, part: &ParticleStore, opts: &SimulationOptions) -> bool {
        if self.stale {
            return true;
        }

        for idim in 0..2 {
            let dx = opts.bounds.extents[idim] / ((opts.cache.ncell[idim] - 2) * 2) as f64;

            for ipart in 0..part.len() {
                let drift = swrap(
                    part.x[ipart][idim] - self.x[ipart][idim],
                    opts.bounds.extents[idim],
                );

                if drift.abs() > dx - part.r[ipart] {
                    return true;
                }
            }
        }

        false
    }
}
