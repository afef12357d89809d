#[cfg(test)]
mod units {
    use crate::error::SimError;
    use crate::neighbor::NeighborCache;
    use crate::particle::ParticleStore;
    use crate::simulation::{BoundsOptions, CacheOptions, SimulationOptions};
    use crate::vector::Vec2;
    use crate::{NGROUP, NNEIGH};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid_opts(ncell: [usize; 2], rcutoff: f64, periodic: [bool; 2]) -> SimulationOptions {
        SimulationOptions {
            bounds: BoundsOptions {
                extents: Vec2::new(1.0, 1.0),
                periodic,
            },
            cache: CacheOptions { ncell, rcutoff },
            ..SimulationOptions::default()
        }
    }

    fn store_at(positions: &[(f64, f64)]) -> ParticleStore {
        let mut part = ParticleStore::new();

        for &(x, y) in positions {
            let i = part.add().unwrap();
            part.x[i] = Vec2::new(x, y);
            part.r[i] = 0.01;
        }

        part
    }

    #[test]
    fn cell_vector_bins_and_clamps() {
        let opts = grid_opts([5, 5], 0.2, [false, false]);

        assert_eq!(NeighborCache::cell_vector(&Vec2::new(0.0, 0.0), &opts), [0, 0]);
        assert_eq!(NeighborCache::cell_vector(&Vec2::new(0.3, 0.5), &opts), [1, 2]);
        assert_eq!(NeighborCache::cell_vector(&Vec2::new(0.99, 0.99), &opts), [3, 3]);
        // Out-of-box points clamp to the edge cells
        assert_eq!(
            NeighborCache::cell_vector(&Vec2::new(-0.1, 1.5), &opts),
            [0, 4]
        );
    }

    #[test]
    fn half_moore_wraps_periodic_dimensions_and_skips_edges() {
        let periodic = grid_opts([5, 5], 0.2, [true, true]);
        let clamped = grid_opts([5, 5], 0.2, [false, false]);

        // From the cell (4, 0): periodic dimensions wrap modulo the cell
        // count, non-periodic ones drop the out-of-range offsets
        let wrapped = NeighborCache::half_moore_cells(&[4, 0], &periodic);
        assert_eq!(wrapped, vec![20, 21, 4, 0, 1]);

        let skipped = NeighborCache::half_moore_cells(&[4, 0], &clamped);
        assert_eq!(skipped, vec![20, 21]);
    }

    #[test]
    fn rebuild_records_each_cutoff_pair_exactly_once() {
        let opts = grid_opts([6, 6], 0.2, [false, false]);

        let mut rng = StdRng::seed_from_u64(7);
        let positions: Vec<(f64, f64)> = (0..40)
            .map(|_| (rng.random::<f64>(), rng.random::<f64>()))
            .collect();
        let part = store_at(&positions);

        let mut cache = NeighborCache::new();
        cache.rebuild(&part, &opts).unwrap();
        assert!(!cache.stale);

        // Count how often each unordered pair shows up across the lists
        let mut counts = vec![vec![0usize; part.len()]; part.len()];
        for ipart in 0..part.len() {
            for &jpart in &cache.neigh[ipart] {
                let (a, b) = (ipart.min(jpart), ipart.max(jpart));
                counts[a][b] += 1;
            }
        }

        for i in 0..part.len() {
            for j in (i + 1)..part.len() {
                let within = part.x[i].pbc_dist_squared(
                    &part.x[j],
                    &opts.bounds.extents,
                    &opts.bounds.periodic,
                ) <= opts.cache.rcutoff * opts.cache.rcutoff;

                assert_eq!(
                    counts[i][j],
                    usize::from(within),
                    "pair ({i}, {j}) recorded {} times",
                    counts[i][j]
                );
            }
        }
    }

    #[test]
    fn same_cell_pairs_stored_on_lower_index() {
        let opts = grid_opts([5, 5], 0.2, [false, false]);
        let part = store_at(&[(0.25, 0.25), (0.26, 0.25)]);

        let mut cache = NeighborCache::new();
        cache.rebuild(&part, &opts).unwrap();

        assert_eq!(cache.neigh[0], vec![1]);
        assert!(cache.neigh[1].is_empty());
    }

    #[test]
    fn rebuild_caches_moments_of_inertia() {
        let opts = grid_opts([5, 5], 0.2, [false, false]);
        let mut part = store_at(&[(0.5, 0.5)]);
        part.r[0] = 0.1;
        part.m[0] = 2.0;

        let mut cache = NeighborCache::new();
        cache.rebuild(&part, &opts).unwrap();

        assert!((cache.moi[0] - 0.5 * 2.0 * 0.01).abs() < 1.0e-15);
        assert_eq!(cache.x[0], part.x[0]);
    }

    #[test]
    fn expiry_tracks_drift_beyond_safe_radius() {
        let opts = grid_opts([10, 10], 0.1, [true, false]);
        let mut part = store_at(&[(0.5, 0.5)]);
        part.r[0] = 0.05;

        let mut cache = NeighborCache::new();
        assert!(cache.expired(&part, &opts));

        cache.rebuild(&part, &opts).unwrap();
        assert!(!cache.expired(&part, &opts));

        // Safe radius is extent / (2 * (ncell - 2)) - r = 0.0625 - 0.05
        part.x[0].x = 0.5 + 0.012;
        assert!(!cache.expired(&part, &opts));

        // Drifting exactly one safe radius does not trigger a rebuild
        part.x[0].x = 0.5 + 0.0125;
        assert!(!cache.expired(&part, &opts));

        part.x[0].x = 0.5 + 0.013;
        assert!(cache.expired(&part, &opts));

        // A rebuild takes a fresh snapshot and clears the expiry
        cache.rebuild(&part, &opts).unwrap();
        assert!(!cache.expired(&part, &opts));
    }

    #[test]
    fn expiry_comparison_is_strict_at_the_boundary() {
        // Every quantity here is a dyadic rational, so the drift equals the
        // safe radius 0.0625 - 0.03125 = 0.03125 bit for bit
        let opts = grid_opts([10, 10], 0.1, [true, false]);
        let mut part = store_at(&[(0.5, 0.5)]);
        part.r[0] = 0.03125;

        let mut cache = NeighborCache::new();
        cache.rebuild(&part, &opts).unwrap();

        part.x[0].x = 0.5 + 0.03125;
        assert!(!cache.expired(&part, &opts));

        // One ulp past the safe radius does trigger
        part.x[0].x = (0.5f64 + 0.03125).next_up();
        assert!(cache.expired(&part, &opts));
    }

    #[test]
    fn expiry_sees_drift_across_the_periodic_face() {
        let opts = grid_opts([10, 10], 0.1, [true, false]);
        let mut part = store_at(&[(0.005, 0.5)]);
        part.r[0] = 0.05;

        let mut cache = NeighborCache::new();
        cache.rebuild(&part, &opts).unwrap();

        // Wrapping around to 0.985 is a drift of -0.02, not of 0.98
        part.x[0].x = 0.985;
        assert!(cache.expired(&part, &opts));

        part.x[0].x = 0.995;
        assert!(!cache.expired(&part, &opts));
    }

    #[test]
    fn cell_overflow_fails_the_build() {
        let opts = grid_opts([5, 5], 0.2, [false, false]);
        let positions = vec![(0.5, 0.5); NGROUP + 1];
        let part = store_at(&positions);

        let mut cache = NeighborCache::new();
        let result = cache.rebuild(&part, &opts);

        assert!(matches!(
            result,
            Err(SimError::Capacity {
                what: "neighbor cell",
                ..
            })
        ));
    }

    #[test]
    fn neighbor_list_overflow_fails_the_build() {
        let opts = grid_opts([6, 6], 0.5, [false, false]);

        // Fill five cells of one half-Moore neighborhood to capacity; the
        // first particle of the center cell then sees more candidates than
        // its list can hold
        let mut positions = Vec::new();
        for center in [(0.25, 0.25), (0.25, 0.45), (0.45, 0.25), (0.45, 0.45), (0.45, 0.05)] {
            for _ in 0..NGROUP {
                positions.push(center);
            }
        }
        let part = store_at(&positions);

        let mut cache = NeighborCache::new();
        let result = cache.rebuild(&part, &opts);

        assert!(matches!(
            result,
            Err(SimError::Capacity {
                what: "neighbor list",
                limit: NNEIGH,
            })
        ));
    }
}
