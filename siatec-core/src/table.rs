//! Difference-vector tables.
//!
//! Two representations of the pairwise differences of a sorted point set:
//!
//! - [`VectorTable`]: the dense table `T[i][j] = p[j] - p[i]`. Because the
//!   point set is sorted and translation preserves lexicographic order, every
//!   row is sorted ascending. The merge-based translator finder relies on it.
//! - [`DifferenceIndex`]: a hashed map from vector to the `(source, target)`
//!   pairs `j > i` that realise it. Used by the hash pipeline.
//!
//! Both are built once per algorithm call and never mutated afterward.

use crate::hashing::{UniversalMap, UniversalState};
use crate::point::Point;
use crate::point_set::PointSet;
use serde::{Deserialize, Serialize};

/// A pair of sorted positions with `point[target] - point[source] = vector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexPair {
    pub source: usize,
    pub target: usize,
}

/// One cell of a flattened vector table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    /// `point[target] - point[source]`.
    pub vector: Point,
    /// Position of the point the vector starts from.
    pub source: usize,
    /// Position of the point the vector ends at.
    pub target: usize,
}

// =============================================================================
// DENSE TABLE
// =============================================================================

/// Dense `n × n` difference table with sorted rows.
///
/// ```text
///            col 0        col 1        ...  col n-1
/// row 0   [ p0 - p0,     p1 - p0,     ...  pn-1 - p0   ]
/// row 1   [ p0 - p1,     p1 - p1,     ...  pn-1 - p1   ]
/// ...
/// ```
#[derive(Debug, Clone, Default)]
pub struct VectorTable {
    n: usize,
    cells: Vec<Point>,
}

impl VectorTable {
    /// Build the full table. O(n²) space.
    pub fn new(points: &PointSet) -> Self {
        let p = points.as_slice();
        let n = p.len();
        let mut cells = Vec::with_capacity(n * n);
        for from in p {
            for to in p {
                cells.push(to - from);
            }
        }
        Self { n, cells }
    }

    /// Number of points the table was built from.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// `point[col] - point[row]`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> &Point {
        &self.cells[row * self.n + col]
    }

    /// All differences starting at `row`, ascending.
    #[inline]
    pub fn row(&self, row: usize) -> &[Point] {
        &self.cells[row * self.n..(row + 1) * self.n]
    }

    /// Strict upper triangle (`target > source`) sorted by vector, then by
    /// source position.
    ///
    /// Consecutive runs of equal vectors are exactly the MTPs of the set, and
    /// the tie-break on `source` fixes the order of points inside each run.
    pub fn forward_entries(points: &PointSet) -> Vec<TableEntry> {
        let p = points.as_slice();
        let n = p.len();
        let mut entries = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for source in 0..n {
            for target in source + 1..n {
                entries.push(TableEntry {
                    vector: &p[target] - &p[source],
                    source,
                    target,
                });
            }
        }
        entries.sort_by(|a, b| a.vector.cmp(&b.vector).then(a.source.cmp(&b.source)));
        entries
    }

    /// Every ordered pair (including `source == target`), stably sorted by
    /// vector.
    ///
    /// Pairs are generated target-major, so within a run of equal vectors the
    /// targets ascend. Runs cover negative and zero vectors too, giving the
    /// MTP of every difference vector of the set.
    pub fn all_entries(points: &PointSet) -> Vec<TableEntry> {
        let p = points.as_slice();
        let n = p.len();
        let mut entries = Vec::with_capacity(n * n);
        for target in 0..n {
            for source in 0..n {
                entries.push(TableEntry {
                    vector: &p[target] - &p[source],
                    source,
                    target,
                });
            }
        }
        entries.sort_by(|a, b| a.vector.cmp(&b.vector));
        entries
    }
}

// =============================================================================
// HASHED INDEX
// =============================================================================

/// Map from difference vector to the forward pairs realising it.
///
/// Buckets are kept in first-insertion order so iteration is reproducible
/// regardless of the hash seed. Within a bucket pairs are ordered by source,
/// then target.
#[derive(Debug, Clone)]
pub struct DifferenceIndex {
    buckets: Vec<(Point, Vec<IndexPair>)>,
    lookup: UniversalMap<Point, usize>,
}

impl DifferenceIndex {
    /// Build with the process-wide hashing table.
    pub fn new(points: &PointSet) -> Self {
        Self::with_state(points, UniversalState::default())
    }

    /// Build with an explicit hashing state.
    pub fn with_state(points: &PointSet, state: UniversalState) -> Self {
        let p = points.as_slice();
        let n = p.len();
        let mut buckets: Vec<(Point, Vec<IndexPair>)> = Vec::new();
        let mut lookup: UniversalMap<Point, usize> = UniversalMap::with_hasher(state);

        for source in 0..n {
            for target in source + 1..n {
                let diff = &p[target] - &p[source];
                let pair = IndexPair { source, target };
                match lookup.get(&diff) {
                    Some(&slot) => buckets[slot].1.push(pair),
                    None => {
                        lookup.insert(diff.clone(), buckets.len());
                        buckets.push((diff, vec![pair]));
                    }
                }
            }
        }

        Self { buckets, lookup }
    }

    /// Pairs realising `vector`, if any.
    pub fn get(&self, vector: &Point) -> Option<&[IndexPair]> {
        self.lookup
            .get(vector)
            .map(|&slot| self.buckets[slot].1.as_slice())
    }

    /// Number of distinct difference vectors.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no pairs were indexed (fewer than two points).
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Point, &[IndexPair])> {
        self.buckets
            .iter()
            .map(|(vector, pairs)| (vector, pairs.as_slice()))
    }
}
