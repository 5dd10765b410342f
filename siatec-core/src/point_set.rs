//! Sorted point sets.
//!
//! A [`PointSet`] is always held in ascending lexicographic order. A point's
//! position in that order is its identity throughout the algorithms.

use crate::error::{Result, SiatecError};
use crate::point::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;

/// An ascending-sorted multiset of points of uniform dimensionality.
///
/// # Invariants
///
/// - Points are sorted ascending (stable, so equal points keep input order).
/// - All points share the same dimensionality.
/// - Duplicate points are allowed and counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    /// Build a sorted point set, checking that dimensionality is uniform.
    pub fn new(mut points: Vec<Point>) -> Result<Self> {
        if let Some(first) = points.first() {
            let expected = first.dimensionality();
            if let Some(bad) = points.iter().find(|p| p.dimensionality() != expected) {
                return Err(SiatecError::DimensionMismatch {
                    expected,
                    found: bad.dimensionality(),
                });
            }
        }
        points.sort();
        Ok(Self { points })
    }

    /// Build a point set from numeric rows (one point per row).
    pub fn from_rows<R>(rows: impl IntoIterator<Item = R>) -> Result<Self>
    where
        R: IntoIterator<Item = f64>,
    {
        Self::new(rows.into_iter().map(Point::new).collect())
    }

    /// Return a fresh sorted set; the caller's slice is left untouched.
    ///
    /// Sorting an already-sorted set yields an identical sequence.
    pub fn sort_ascending(points: &[Point]) -> Result<Self> {
        Self::new(points.to_vec())
    }

    /// Number of points (duplicates counted).
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimensionality of the points, or `None` for an empty set.
    pub fn dimensionality(&self) -> Option<usize> {
        self.points.first().map(Point::dimensionality)
    }

    /// Point at sorted position `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&Point> {
        self.points.get(i)
    }

    /// The canonical sorted view.
    #[inline]
    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Iterate in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Check membership by binary search.
    pub fn contains(&self, point: &Point) -> bool {
        self.points.binary_search(point).is_ok()
    }

    /// Remove one occurrence per element of `removed`.
    ///
    /// Multiset semantics: a value present `k` times here and requested `r`
    /// times is removed `min(k, r)` times. Order is preserved.
    pub fn remove_all<'a>(&mut self, removed: impl IntoIterator<Item = &'a Point>) {
        let mut pending: HashMap<&Point, usize> = HashMap::new();
        for point in removed {
            *pending.entry(point).or_insert(0) += 1;
        }
        if pending.is_empty() {
            return;
        }

        let mut kept = Vec::with_capacity(self.points.len());
        for point in self.points.drain(..) {
            match pending.get_mut(&point) {
                Some(count) if *count > 0 => *count -= 1,
                _ => kept.push(point),
            }
        }
        self.points = kept;
    }

    /// Consume the set, returning its sorted points.
    pub fn into_vec(self) -> Vec<Point> {
        self.points
    }
}

impl Index<usize> for PointSet {
    type Output = Point;

    fn index(&self, i: usize) -> &Point {
        &self.points[i]
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
