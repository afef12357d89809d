#[cfg(test)]
mod units {
    use crate::scalar::{Euclid, hc, swrap, unhc, uwrap, wrap};

    /// Reference wrap that shifts by whole periods one at a time.
    fn wrap_ref(x: i64, a: i64, b: i64) -> i64 {
        let c = b - a;
        let mut y = x;

        while y < a {
            y += c;
        }
        while y >= b {
            y -= c;
        }

        y
    }

    #[test]
    fn quot_signed() {
        for x in -128_i64..128 {
            for y in -128_i64..128 {
                if y == 0 {
                    continue;
                }

                let (q, r) = x.quot(y);
                assert_eq!(q * y + r, x);
                assert!(r >= 0);
            }
        }
    }

    #[test]
    fn quot_unsigned() {
        for x in 0_u64..256 {
            for y in 1_u64..256 {
                let (q, r) = x.quot(y);
                assert_eq!(q * y + r, x);
                assert!(r < y);
            }
        }
    }

    #[test]
    fn quot_float() {
        for i in -128_i32..128 {
            for j in -128_i32..128 {
                if j == 0 {
                    continue;
                }

                let x = f64::from(i) / 64.0;
                let y = f64::from(j) / 64.0;

                let (q, r) = x.quot(y);
                assert!((q * y + r - x).abs() < 1e-6);
                assert!(r >= 0.0);
            }
        }
    }

    #[test]
    fn wrap_signed_matches_reference() {
        for x in -128_i64..128 {
            for a in -128_i64..128 {
                for b in (a + 1)..128 {
                    assert_eq!(wrap(x, a, b), wrap_ref(x, a, b));
                }
            }
        }
    }

    #[test]
    fn wrap_unsigned_in_range() {
        for x in 0_u64..256 {
            for a in 0_u64..64 {
                for b in (a + 1)..64 {
                    let y = wrap(x, a, b);
                    assert!(y >= a && y < b);
                    assert_eq!((y as i64 - x as i64).rem_euclid(b as i64 - a as i64), 0);
                }
            }
        }
    }

    #[test]
    fn wrap_float_in_range() {
        for i in -128_i32..128 {
            for j in -32_i32..32 {
                for k in (j + 1)..32 {
                    let x = f64::from(i) / 64.0;
                    let a = f64::from(j) / 16.0;
                    let b = f64::from(k) / 16.0;

                    let y = wrap(x, a, b);
                    assert!(y >= a && y < b, "wrap({x}, {a}, {b}) = {y}");
                }
            }
        }
    }

    #[test]
    fn uwrap_matches_wrap() {
        for x in -128_i64..128 {
            for b in 1_i64..128 {
                assert_eq!(uwrap(x, b), wrap(x, 0, b));
            }
        }
    }

    #[test]
    fn uwrap_float_in_range() {
        for i in -128_i32..128 {
            for j in 1_i32..64 {
                let x = f64::from(i) / 64.0;
                let b = f64::from(j) / 16.0;

                let y = uwrap(x, b);
                assert!((0.0..b).contains(&y));
            }
        }
    }

    #[test]
    fn swrap_is_symmetric_and_congruent() {
        for i in -256_i32..256 {
            let x = f64::from(i) / 32.0;
            let p = 1.0;

            let y = swrap(x, p);
            assert!((-0.5 * p..0.5 * p).contains(&y));
            // y and x differ by a whole number of periods
            let k = (x - y) / p;
            assert!((k - k.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn swrap_boundary_faces() {
        // Opposite faces of a unit period are one step apart, not 0.98
        assert!((swrap(0.99 - 0.01, 1.0) - -0.02).abs() < 1e-12);
        assert!((swrap(0.01 - 0.99, 1.0) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn hc_row_major_order() {
        let nper = [6, 5];

        assert_eq!(hc(0, &nper), vec![0, 0]);
        assert_eq!(hc(1, &nper), vec![0, 1]);
        assert_eq!(hc(2, &nper), vec![0, 2]);
        assert_eq!(hc(5, &nper), vec![1, 0]);
    }

    #[test]
    fn hc_unhc_isomorphism() {
        let nper = [6, 5];

        for i in 0..(6 * 5) {
            let ij = hc(i, &nper);
            assert_eq!(unhc(&ij, &nper), i);
        }
    }

    #[test]
    fn hc_unhc_isomorphism_3d() {
        let nper = [3, 4, 5];

        for i in 0..(3 * 4 * 5) {
            let ij = hc(i, &nper);
            assert!(ij.iter().zip(&nper).all(|(&c, &n)| c < n));
            assert_eq!(unhc(&ij, &nper), i);
        }
    }
}
