//! Translational equivalence classes.

use crate::point::Point;
use crate::point_set::PointSet;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A pattern together with every translator mapping it into the dataset.
///
/// # Invariants
///
/// - `pattern` and `pattern_indices` are sorted ascending, so for a TEC built
///   from a sorted point set `pattern[k]` sits at position `pattern_indices[k]`.
/// - The coverage is computed lazily once and cached inside the instance.
///
/// A residual TEC (the uncovered leftovers of a selector) has empty
/// `pattern_indices` and `translators`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tec {
    pattern: Vec<Point>,
    pattern_indices: Vec<usize>,
    translators: Vec<Point>,
    #[serde(skip)]
    coverage: OnceCell<BTreeSet<Point>>,
}

impl Tec {
    /// Create a TEC. Pattern and indices are sorted before storing.
    pub fn new(
        mut pattern: Vec<Point>,
        mut pattern_indices: Vec<usize>,
        translators: Vec<Point>,
    ) -> Self {
        pattern.sort();
        pattern_indices.sort_unstable();
        Self {
            pattern,
            pattern_indices,
            translators,
            coverage: OnceCell::new(),
        }
    }

    /// A TEC holding uncovered points verbatim, with no translators.
    pub fn residual(points: Vec<Point>) -> Self {
        Self::new(points, Vec::new(), Vec::new())
    }

    pub fn pattern(&self) -> &[Point] {
        &self.pattern
    }

    pub fn pattern_indices(&self) -> &[usize] {
        &self.pattern_indices
    }

    pub fn translators(&self) -> &[Point] {
        &self.translators
    }

    /// True for the residual TEC emitted by a selector.
    pub fn is_residual(&self) -> bool {
        self.translators.is_empty() && self.pattern_indices.is_empty()
    }

    /// Encoding cost `|pattern| + |translators| - 1`, floored at zero.
    pub fn encoding_cost(&self) -> usize {
        (self.pattern.len() + self.translators.len()).saturating_sub(1)
    }

    /// Every point produced by applying a translator to the pattern.
    ///
    /// The pattern itself is always part of the coverage, whether or not
    /// the zero vector appears among the translators.
    pub fn coverage(&self) -> &BTreeSet<Point> {
        self.coverage.get_or_init(|| {
            let mut covered: BTreeSet<Point> = self.pattern.iter().cloned().collect();
            for translator in &self.translators {
                if translator.is_zero() {
                    continue;
                }
                for point in &self.pattern {
                    covered.insert(point + translator);
                }
            }
            covered
        })
    }

    /// Componentwise min and max over the pattern, or `None` when empty.
    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        let (first, rest) = self.pattern.split_first()?;
        Some(rest.iter().fold(
            (first.clone(), first.clone()),
            |(min, max), point| (min.min_components(point), max.max_components(point)),
        ))
    }

    /// The dual TEC with pattern and translator roles swapped.
    ///
    /// With `p0 = pattern[0]`, the conjugate's pattern is `p0` plus `p0 + t`
    /// for every non-zero translator `t`, and its translators are the zero
    /// vector plus `p - p0` for every other pattern point. Positions in
    /// `points` are found by probing outward from the position of `p0`.
    ///
    /// Both TECs cover the same points.
    pub fn conjugate(&self, points: &PointSet) -> Tec {
        let Some(p0) = self.pattern.first() else {
            return self.clone();
        };

        let data = points.as_slice();
        let anchor = self.pattern_indices.first().copied();

        let mut pattern = vec![p0.clone()];
        let mut indices: Vec<usize> = anchor.into_iter().collect();

        for translator in self.translators.iter().filter(|t| !t.is_zero()) {
            let target = p0 + translator;
            if let Some(found) = anchor.and_then(|a| probe(data, a, &target, p0)) {
                indices.push(found);
            }
            pattern.push(target);
        }

        let mut translators = vec![Point::zero(p0.dimensionality())];
        translators.extend(
            self.pattern
                .iter()
                .map(|p| p - p0)
                .filter(|t| !t.is_zero()),
        );

        Tec::new(pattern, indices, translators)
    }

    /// The same TEC with `pattern_indices` recomputed against `points`.
    ///
    /// Used when a TEC found in a subset is reported against the full set.
    /// Pattern points missing from `points` get no index.
    pub fn relocated(&self, points: &PointSet) -> Tec {
        let data = points.as_slice();
        let mut indices: Vec<usize> = Vec::with_capacity(self.pattern.len());

        for point in &self.pattern {
            let mut at = data.partition_point(|p| p < point);
            // Repeated pattern points take successive copies.
            if let Some(&prev) = indices.last() {
                if data.get(prev) == Some(point) && at <= prev {
                    at = prev + 1;
                }
            }
            if data.get(at) == Some(point) {
                indices.push(at);
            }
        }

        Tec {
            pattern: self.pattern.clone(),
            pattern_indices: indices,
            translators: self.translators.clone(),
            coverage: self.coverage.clone(),
        }
    }
}

/// Position of `target` in `data`, searching backward from `anchor` when the
/// target precedes `origin` and forward otherwise.
fn probe(data: &[Point], anchor: usize, target: &Point, origin: &Point) -> Option<usize> {
    let anchor = anchor.min(data.len().checked_sub(1)?);
    if target < origin {
        let end = data[..=anchor].partition_point(|p| p <= target);
        (end > 0 && &data[end - 1] == target).then(|| end - 1)
    } else {
        let at = anchor + data[anchor..].partition_point(|p| p < target);
        (at < data.len() && &data[at] == target).then_some(at)
    }
}

/// Two TECs are equal when their patterns match and their translator sets
/// hold the same vectors. Indices and the cache are ignored.
impl PartialEq for Tec {
    fn eq(&self, other: &Self) -> bool {
        if self.pattern != other.pattern || self.translators.len() != other.translators.len() {
            return false;
        }
        let mut ours = self.translators.clone();
        let mut theirs = other.translators.clone();
        ours.sort();
        theirs.sort();
        ours == theirs
    }
}

impl fmt::Display for Tec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_set(f, &self.pattern)?;
        write!(f, ", ")?;
        write_set(f, &self.translators)
    }
}

fn write_set(f: &mut fmt::Formatter<'_>, points: &[Point]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", point)?;
    }
    write!(f, "}}")
}
