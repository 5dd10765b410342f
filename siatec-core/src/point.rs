//! Points and translation vectors.
//!
//! A [`Point`] doubles as a translation vector: both are fixed-length tuples
//! of real components with lexicographic ordering and componentwise
//! arithmetic.

use crate::error::{Result, SiatecError};
use crate::INLINE_DIMENSIONS;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Index, Sub};

type Components = SmallVec<[f64; INLINE_DIMENSIONS]>;

/// Collapse `-0.0` onto `0.0` so that equality, ordering and hashing agree.
#[inline]
fn normalize(component: f64) -> f64 {
    component + 0.0
}

/// An immutable point (or vector) in k-dimensional space.
///
/// # Invariants
///
/// - Components are never `-0.0` (normalised on construction).
/// - Components are expected to be finite; NaN is rejected at the loading
///   boundary and never produced by the algorithms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct Point {
    components: Components,
}

impl Point {
    /// Create a point from its components.
    pub fn new(components: impl IntoIterator<Item = f64>) -> Self {
        Self {
            components: components.into_iter().map(normalize).collect(),
        }
    }

    /// The zero vector of the given dimensionality.
    pub fn zero(dimensionality: usize) -> Self {
        Self {
            components: SmallVec::from_elem(0.0, dimensionality),
        }
    }

    /// Number of components.
    #[inline]
    pub fn dimensionality(&self) -> usize {
        self.components.len()
    }

    /// Component `i`. Panics if `i` is out of range, like slice indexing.
    #[inline]
    pub fn component(&self, i: usize) -> f64 {
        self.components[i]
    }

    /// Component `i`, or `None` if out of range.
    #[inline]
    pub fn get(&self, i: usize) -> Option<f64> {
        self.components.get(i).copied()
    }

    /// All components in order.
    #[inline]
    pub fn components(&self) -> &[f64] {
        &self.components
    }

    /// Check whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.components.iter().all(|&c| c == 0.0)
    }

    /// Componentwise sum, checking dimensionality.
    pub fn try_add(&self, other: &Point) -> Result<Point> {
        self.check_dimensionality(other)?;
        Ok(self + other)
    }

    /// Componentwise difference `self - other`, checking dimensionality.
    pub fn try_sub(&self, other: &Point) -> Result<Point> {
        self.check_dimensionality(other)?;
        Ok(self - other)
    }

    /// Lexicographic three-way comparison by component index.
    pub fn compare(&self, other: &Point) -> Ordering {
        for (a, b) in self.components.iter().zip(other.components.iter()) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.components.len().cmp(&other.components.len())
    }

    /// Componentwise minimum of two points of equal dimensionality.
    pub fn min_components(&self, other: &Point) -> Point {
        Self::zip_with(self, other, f64::min)
    }

    /// Componentwise maximum of two points of equal dimensionality.
    pub fn max_components(&self, other: &Point) -> Point {
        Self::zip_with(self, other, f64::max)
    }

    /// Whether every component lies within the closed box `[min, max]`.
    pub fn is_within(&self, min: &Point, max: &Point) -> bool {
        self.components
            .iter()
            .zip(min.components.iter().zip(max.components.iter()))
            .all(|(&c, (&lo, &hi))| c >= lo && c <= hi)
    }

    fn check_dimensionality(&self, other: &Point) -> Result<()> {
        if self.dimensionality() != other.dimensionality() {
            return Err(SiatecError::DimensionMismatch {
                expected: self.dimensionality(),
                found: other.dimensionality(),
            });
        }
        Ok(())
    }

    #[inline]
    fn zip_with(a: &Point, b: &Point, f: impl Fn(f64, f64) -> f64) -> Point {
        debug_assert_eq!(a.dimensionality(), b.dimensionality());
        Point {
            components: a
                .components
                .iter()
                .zip(b.components.iter())
                .map(|(&x, &y)| normalize(f(x, y)))
                .collect(),
        }
    }
}

/// Consecutive differences `p[i] - p[i - 1]` of a point sequence.
///
/// Two patterns are translationally equivalent exactly when their vectorised
/// forms are equal.
pub fn vectorize(points: &[Point]) -> Vec<Point> {
    points.windows(2).map(|w| &w[1] - &w[0]).collect()
}

// =============================================================================
// ORDERING / EQUALITY / HASHING
// =============================================================================

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.components.len());
        for c in &self.components {
            state.write_u64(c.to_bits());
        }
    }
}

// =============================================================================
// ARITHMETIC
// =============================================================================

// Unchecked operators for inner loops. Callers at the public boundary use
// `try_add`/`try_sub`.

impl Add for &Point {
    type Output = Point;

    fn add(self, rhs: &Point) -> Point {
        Point::zip_with(self, rhs, |a, b| a + b)
    }
}

impl Sub for &Point {
    type Output = Point;

    fn sub(self, rhs: &Point) -> Point {
        Point::zip_with(self, rhs, |a, b| a - b)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        &self + &rhs
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        &self - &rhs
    }
}

impl Index<usize> for Point {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.components[i]
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<Vec<f64>> for Point {
    fn from(components: Vec<f64>) -> Self {
        Point::new(components)
    }
}

impl<const N: usize> From<[f64; N]> for Point {
    fn from(components: [f64; N]) -> Self {
        Point::new(components)
    }
}

impl From<Point> for Vec<f64> {
    fn from(point: Point) -> Self {
        point.components.into_vec()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}
