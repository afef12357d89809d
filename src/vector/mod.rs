//! # 2D Vector Mathematics Module
//!
//! This module provides the planar vector implementation used throughout the
//! discrete-element engine. The `Vec2` struct offers vector operations with
//! both value and reference semantics to minimize allocations in
//! performance-critical code, plus the periodic-boundary helpers (shortest
//! image difference and distance) that the neighbor cache and the force
//! kernels are built on.
//!
//! ## Example Usage
//! ```
//! use granular_lib::vector::Vec2;
//!
//! // Create vectors
//! let position = Vec2::new(0.25, 0.5);
//! let velocity = Vec2::new(1.0, -0.5);
//!
//! // Vector operations
//! let new_position = position + velocity * 0.1;
//! let distance = (position - new_position).norm();
//!
//! // Periodic geometry
//! let extents = Vec2::new(1.0, 1.0);
//! let across = Vec2::new(0.95, 0.5).pbc_diff(&Vec2::new(0.05, 0.5), &extents, &[true, false]);
//! assert!((across.x - 0.1).abs() < 1e-12);
//! ```

// Numerical operator implementations
pub mod ops;
// Helper functions for Vec2
pub mod math;
// Unit tests
pub mod tests;

/// A 2D vector in Cartesian coordinates.
///
/// `Vec2` represents a point, displacement, velocity, or force in the plane
/// using double-precision components. It implements `Copy` for efficient
/// passing and provides the mathematical operations the particle physics
/// needs, including the periodic-image variants.
///
/// # Fields
/// - `x`: The X-component
/// - `y`: The Y-component
///
/// # Examples
/// ```
/// # use granular_lib::vector::Vec2;
/// let position = Vec2::new(10.0, 5.0);
///
/// // Access components directly or by dimension index
/// assert_eq!(position.x, 10.0);
/// assert_eq!(position[1], 5.0);
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    /// X-component of the vector
    pub x: f64,
    /// Y-component of the vector
    pub y: f64,
}

impl Vec2 {
    /// Creates a new 2D vector with the given components.
    ///
    /// # Examples
    /// ```
    /// # use granular_lib::vector::Vec2;
    /// let velocity = Vec2::new(1.5, -2.3);
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Creates a zero vector (0, 0).
    ///
    /// The zero vector is the additive identity and represents no
    /// displacement, velocity, or force.
    ///
    /// # Examples
    /// ```
    /// # use granular_lib::vector::Vec2;
    /// let v = Vec2::new(1.0, 2.0);
    /// assert_eq!(v + Vec2::zero(), v);
    /// ```
    pub fn zero() -> Self {
        Vec2 { x: 0.0, y: 0.0 }
    }

    /// Returns the unit vector along the positive X-axis (1, 0).
    pub fn x_hat() -> Self {
        Vec2::new(1.0, 0.0)
    }

    /// Returns the unit vector along the positive Y-axis (0, 1).
    pub fn y_hat() -> Self {
        Vec2::new(0.0, 1.0)
    }
}
