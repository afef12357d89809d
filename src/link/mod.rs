//! # Link Store - Cohesive Bond Adjacency Lists
//!
//! Bonds model the cohesive beams that hold a brittle packing together
//! independently of current contact overlap. Each bond records the rest
//! geometry frozen at creation time together with the strain limits beyond
//! which it breaks.
//!
//! Every bond between particles `i` and `j` is stored exactly once, on the
//! side from whose half-neighborhood the pair was visited at creation (the
//! lower index under exhaustive iteration). Force evaluation walks all
//! stored bonds and applies equal-and-opposite effects to both endpoints, so
//! the storage side has no physical meaning.

use crate::NLINK;
use serde::{Deserialize, Serialize};


/// One cohesive bond, stored on the owning endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    /// Index of the other endpoint.
    pub j: usize,
    /// Rest length of the beam.
    pub rrest: f64,
    /// Rest angles of the two endpoints relative to the bond axis.
    pub phirest: [f64; 2],
    /// Tensile strain limit; the bond breaks when `|d - rrest|` exceeds it.
    pub rlim: f64,
    /// Angular strain limit for either endpoint.
    pub philim: f64,
}

/// Per-particle bond lists, parallel to the particle store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkStore {
    /// Bond list of each particle, bounded by [`NLINK`].
    pub bonds: Vec<Vec<Bond>>,
}

impl LinkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty bond list for a newly added particle.
    pub fn push_particle(&mut self) {
        self.bonds.push(Vec::new());
    }

    /// Tries to store `bond` on particle `ipart`.
    ///
    /// Returns whether the bond was stored. Capacity exhaustion is not an
    /// error: bonds beyond [`NLINK`] are simply not created.
    pub fn push_bond(&mut self, ipart: usize, bond: Bond) -> bool {
        let list = &mut self.bonds[ipart];

        if list.len() >= NLINK {
            return false;
        }

        list.push(bond);
        true
    }

    /// Number of bonds stored on particle `ipart`.
    #[inline]
    pub fn bond_count(&self, ipart: usize) -> usize {
        self.bonds[ipart].len()
    }

    /// Total number of stored bonds.
    pub fn total_bonds(&self) -> usize {
        self.bonds.iter().map(Vec::len).sum()
    }

    /// Removes every bond. Idempotent.
    pub fn unlink_all(&mut self) {
        for list in &mut self.bonds {
            list.clear();
        }
    }

    /// Removes the bond in slot `k` of particle `ipart` by swapping the
    /// last slot into its place.
    pub fn break_bond(&mut self, ipart: usize, k: usize) {
        self.bonds[ipart].swap_remove(k);
    }

    /// Keeps the bond lists consistent with a swap-with-last particle
    /// removal of `ipart`.
    ///
    /// The removed particle's list is replaced by the last particle's list.
    /// Bonds on other particles that pointed at the removed index are
    /// dropped, and bonds that pointed at the moved index are retargeted to
    /// its new slot.
    pub fn remove_particle(&mut self, ipart: usize) {
        let moved = self.bonds.len() - 1;
        self.bonds.swap_remove(ipart);

        for list in &mut self.bonds {
            list.retain(|bond| bond.j != ipart);

            if ipart != moved {
                for bond in list.iter_mut() {
                    if bond.j == moved {
                        bond.j = ipart;
                    }
                }
            }
        }
    }
}
