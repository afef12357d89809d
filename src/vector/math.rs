//! Vector math operations for Vec2
//! Provides norms, dot products, perpendiculars, direction angles, and the
//! periodic-boundary helpers used by the neighbor cache and force kernels.

use super::Vec2;
use crate::scalar::{swrap, uwrap};
use std::f64::consts::{PI, TAU};

impl Vec2 {
    /// Calculates the squared magnitude of the vector.
    ///
    /// This is more efficient than `norm()` as it avoids the square root
    /// operation. Use this when comparing magnitudes or distances.
    ///
    /// # Examples
    /// ```
    /// # use granular_lib::vector::Vec2;
    /// let v = Vec2::new(3.0, 4.0);
    /// assert_eq!(v.norm_squared(), 25.0);
    /// ```
    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Calculates the magnitude of the vector.
    ///
    /// # Examples
    /// ```
    /// # use granular_lib::vector::Vec2;
    /// let v = Vec2::new(3.0, 4.0);
    /// assert_eq!(v.norm(), 5.0);
    /// ```
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Returns a unit vector in the same direction as this vector.
    ///
    /// If the vector has near-zero magnitude, returns the zero vector to
    /// avoid division by zero.
    pub fn normalize(&self) -> Self {
        let norm_sq = self.norm_squared();
        if norm_sq > f64::EPSILON * f64::EPSILON {
            let inv_norm = norm_sq.sqrt().recip();
            Vec2 {
                x: self.x * inv_norm,
                y: self.y * inv_norm,
            }
        } else {
            Vec2::zero()
        }
    }

    /// Calculates the dot product with another vector.
    ///
    /// # Examples
    /// ```
    /// # use granular_lib::vector::Vec2;
    /// let a = Vec2::new(1.0, 2.0);
    /// let b = Vec2::new(4.0, 5.0);
    /// assert_eq!(a.dot(&b), 14.0);
    /// ```
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Returns the right perpendicular of this vector.
    ///
    /// The contact kernels use this to build the tangent direction from the
    /// contact normal; `v.rperp()` has the same magnitude as `v` and
    /// `v.dot(&v.rperp()) == 0`.
    ///
    /// # Examples
    /// ```
    /// # use granular_lib::vector::Vec2;
    /// assert_eq!(Vec2::x_hat().rperp(), Vec2::new(0.0, -1.0));
    /// ```
    #[inline]
    pub fn rperp(&self) -> Self {
        Vec2 {
            x: self.y,
            y: -self.x,
        }
    }

    /// Returns the direction angle of this vector in `(-π, π]`.
    ///
    /// # Examples
    /// ```
    /// # use granular_lib::vector::Vec2;
    /// use std::f64::consts::PI;
    /// assert!((Vec2::y_hat().dir() - PI / 2.0).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn dir(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Checks approximate equality within a per-component tolerance.
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        let epsilon = epsilon.max(f64::EPSILON);
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }

    /// Shortest-image difference `other - self` under periodic boundaries.
    ///
    /// For each periodic dimension the component is reduced to the shortest
    /// signed representative modulo the box extent; non-periodic dimensions
    /// use the plain difference.
    ///
    /// # Examples
    /// ```
    /// # use granular_lib::vector::Vec2;
    /// let extents = Vec2::new(1.0, 1.0);
    /// let a = Vec2::new(0.05, 0.5);
    /// let b = Vec2::new(0.95, 0.5);
    /// let d = a.pbc_diff(&b, &extents, &[true, false]);
    /// // Across the periodic face the image at -0.1 is closer than +0.9
    /// assert!((d.x - -0.1).abs() < 1e-12);
    /// ```
    pub fn pbc_diff(&self, other: &Self, extents: &Vec2, periodic: &[bool; 2]) -> Self {
        let mut diff = other - self;

        for idim in 0..2 {
            if periodic[idim] {
                diff[idim] = swrap(diff[idim], extents[idim]);
            }
        }

        diff
    }

    /// Squared shortest-image distance to `other` under periodic boundaries.
    #[inline]
    pub fn pbc_dist_squared(&self, other: &Self, extents: &Vec2, periodic: &[bool; 2]) -> f64 {
        self.pbc_diff(other, extents, periodic).norm_squared()
    }

    /// Wraps this point into the box along every periodic dimension.
    pub fn wrap_into(&self, extents: &Vec2, periodic: &[bool; 2]) -> Self {
        let mut wrapped = *self;

        for idim in 0..2 {
            if periodic[idim] {
                wrapped[idim] = uwrap(wrapped[idim], extents[idim]);
            }
        }

        wrapped
    }
}

/// Returns the direction opposite to `angle`, wrapped into `[0, 2π)`.
#[inline]
pub fn redir(angle: f64) -> f64 {
    uwrap(angle + PI, TAU)
}

/// Area of a disk of radius `r`.
#[inline]
pub fn disk_volume(r: f64) -> f64 {
    PI * r * r
}

/// Reduced moment of inertia of a uniform disk.
///
/// The dimensionless factor `jred` such that the moment of inertia is
/// `jred * m * r^2`.
#[inline]
pub fn disk_moment_factor() -> f64 {
    0.5
}
