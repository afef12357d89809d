//! # Vector operations for Vec2
//! This module provides implementations of the arithmetic operations for the
//! `Vec2` struct, including addition, subtraction, scalar multiplication,
//! scalar division, negation, and per-dimension indexing. These operations
//! are implemented using Rust's operator overloading traits (`Add`, `Sub`,
//! `Mul`, `Div`, `Neg`, `Index`).

use super::Vec2;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

/// Vector addition
///
/// Adds corresponding components of two vectors.
///
/// # Examples
/// ```
/// # use granular_lib::vector::Vec2;
/// let a = Vec2::new(1.0, 2.0);
/// let b = Vec2::new(4.0, 5.0);
/// assert_eq!(a + b, Vec2::new(5.0, 7.0));
/// ```
impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// Vector addition by reference (&Vec2 + &Vec2).
///
/// More efficient for cases where you want to preserve the original vectors
/// inside simulation loops.
impl Add for &Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: &Vec2) -> Self::Output {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// In-place vector addition, used by the force accumulators.
impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Vector subtraction by value (Vec2 - Vec2).
///
/// The result represents the displacement vector from the second vector to
/// the first.
///
/// # Examples
/// ```
/// # use granular_lib::vector::Vec2;
/// let a = Vec2::new(5.0, 7.0);
/// let b = Vec2::new(1.0, 2.0);
/// assert_eq!(a - b, Vec2::new(4.0, 5.0));
/// ```
impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Vector subtraction by reference (&Vec2 - &Vec2).
impl Sub for &Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: &Vec2) -> Self::Output {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// In-place vector subtraction.
impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// Scalar multiplication by value (Vec2 * f64).
///
/// Commonly used for applying time steps and scaling forces.
///
/// # Examples
/// ```
/// # use granular_lib::vector::Vec2;
/// let velocity = Vec2::new(2.0, -1.0);
/// assert_eq!(velocity * 0.1, Vec2::new(0.2, -0.1));
/// ```
impl Mul<f64> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Vec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Scalar multiplication by reference (&Vec2 * f64).
impl Mul<f64> for &Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Vec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Commutative scalar multiplication by value (f64 * Vec2).
///
/// Allows writing scalar multiplication in natural mathematical notation.
impl Mul<Vec2> for f64 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}

/// Commutative scalar multiplication by reference (f64 * &Vec2).
impl Mul<&Vec2> for f64 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: &Vec2) -> Self::Output {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}

/// Scalar division by value (Vec2 / f64).
///
/// The implementation uses multiplication by reciprocal for performance.
///
/// # Examples
/// ```
/// # use granular_lib::vector::Vec2;
/// let position = Vec2::new(10.0, 20.0);
/// assert_eq!(position / 2.0, Vec2::new(5.0, 10.0));
/// ```
impl Div<f64> for Vec2 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f64) -> Self::Output {
        let inv = rhs.recip();
        Vec2 {
            x: self.x * inv,
            y: self.y * inv,
        }
    }
}

/// Vector negation by value (-Vec2).
///
/// Returns a vector pointing in the opposite direction with the same
/// magnitude. Commonly used for reaction forces.
///
/// # Examples
/// ```
/// # use granular_lib::vector::Vec2;
/// let force = Vec2::new(10.0, -2.0);
/// assert_eq!(-force, Vec2::new(-10.0, 2.0));
/// ```
impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Per-dimension read access.
///
/// Dimension 0 is the X-component and dimension 1 is the Y-component.
/// This is what the integrator and the neighbor grid use to loop over
/// spatial dimensions uniformly.
///
/// # Panics
///
/// Panics when the index is not 0 or 1.
impl Index<usize> for Vec2 {
    type Output = f64;

    #[inline]
    fn index(&self, idim: usize) -> &f64 {
        match idim {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("dimension index out of range: {idim}"),
        }
    }
}

/// Per-dimension write access.
impl IndexMut<usize> for Vec2 {
    #[inline]
    fn index_mut(&mut self, idim: usize) -> &mut f64 {
        match idim {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("dimension index out of range: {idim}"),
        }
    }
}
