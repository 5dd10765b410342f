//! Maximal translatable pattern (MTP) discovery.
//!
//! - [`sia`]: sort the strict upper triangle of the vector table and segment
//!   runs of equal vectors (Meredith, Lemström & Wiggins 2002, fig. 18).
//! - [`siah`]: group the same pairs in a hashed map instead of sorting.
//! - [`siar`]: restrict to the first `r` sub-diagonals of the table and
//!   recover full MTPs for the most frequent within-pattern vectors.
//! - [`siact`]: split MTPs into compact runs (Collins 2011, def. 7.2).
//!
//! `sia` and `siah` produce the same set of `(vector, points)` pairs; only the
//! order of MTPs differs.

use crate::config::DiscoveryStrategy;
use crate::heuristics::{compactness, find_pattern_span};
use crate::point::Point;
use crate::point_set::PointSet;
use crate::table::{DifferenceIndex, VectorTable};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, instrument};

/// A translation vector with every point it maps onto another point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mtp {
    pub vector: Point,
    pub points: Vec<Point>,
}

impl Mtp {
    pub fn new(vector: Point, points: Vec<Point>) -> Self {
        Self { vector, points }
    }

    /// Number of points in the pattern.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the pattern holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl fmt::Display for Mtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {{", self.vector)?;
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", point)?;
        }
        write!(f, "}}")
    }
}

/// Compute all MTPs by sorting the vector table.
///
/// MTPs come out in ascending vector order; points inside an MTP ascend.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn sia(points: &PointSet) -> Vec<Mtp> {
    let entries = VectorTable::forward_entries(points);
    let mut mtps = Vec::new();

    for run in entries.chunk_by(|a, b| a.vector == b.vector) {
        mtps.push(Mtp::new(
            run[0].vector.clone(),
            run.iter().map(|e| points[e.source].clone()).collect(),
        ));
    }

    debug!(mtps = mtps.len(), "sia complete");
    mtps
}

/// Compute all MTPs by hashing difference vectors.
///
/// MTPs come out in order of first discovery.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siah(points: &PointSet) -> Vec<Mtp> {
    let index = DifferenceIndex::new(points);
    let mtps: Vec<Mtp> = index
        .iter()
        .map(|(vector, pairs)| {
            Mtp::new(
                vector.clone(),
                pairs.iter().map(|pair| points[pair.source].clone()).collect(),
            )
        })
        .collect();

    debug!(mtps = mtps.len(), "siah complete");
    mtps
}

/// MTP discovery with the selected strategy.
pub fn discover_mtps(points: &PointSet, strategy: DiscoveryStrategy) -> Vec<Mtp> {
    match strategy {
        DiscoveryStrategy::VectorTable => sia(points),
        DiscoveryStrategy::Hashed => siah(points),
    }
}

/// The MTP of a single vector: every point `p` with `p + vector` in the set.
pub fn find_mtp(points: &PointSet, vector: &Point) -> Mtp {
    let data = points.as_slice();
    let translated: Vec<Point> = data.iter().map(|p| p - vector).collect();

    let mut found = Vec::new();
    let (mut a, mut b) = (0, 0);
    while a < data.len() && b < translated.len() {
        match data[a].cmp(&translated[b]) {
            Ordering::Equal => {
                found.push(data[a].clone());
                a += 1;
                b += 1;
            }
            Ordering::Less => a += 1,
            Ordering::Greater => b += 1,
        }
    }

    Mtp::new(vector.clone(), found)
}

/// SIAR: MTPs for the vectors that recur inside patterns found on the first
/// `r` sub-diagonals of the vector table, most frequent first.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siar(points: &PointSet, r: usize) -> Vec<Mtp> {
    let data = points.as_slice();
    let n = data.len();

    let mut diagonal: Vec<(Point, usize)> = Vec::new();
    for i in 0..n.saturating_sub(1) {
        for j in i + 1..n.min(i + r + 1) {
            diagonal.push((&data[j] - &data[i], i));
        }
    }
    if diagonal.is_empty() {
        return Vec::new();
    }
    diagonal.sort();

    let mut within: Vec<Point> = Vec::new();
    for run in diagonal.chunk_by(|a, b| a.0 == b.0) {
        let pattern: Vec<&Point> = run.iter().map(|(_, i)| &data[*i]).collect();
        for (j, from) in pattern.iter().enumerate() {
            for to in &pattern[j + 1..] {
                within.push(*to - *from);
            }
        }
    }
    within.sort();

    let mut by_frequency: Vec<(Point, usize)> = within
        .chunk_by(|a, b| a == b)
        .map(|run| (run[0].clone(), run.len()))
        .collect();
    // Stable, so equally frequent vectors stay in ascending order.
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1));

    by_frequency
        .iter()
        .map(|(vector, _)| find_mtp(points, vector))
        .collect()
}

/// SIACT: discover MTPs, then keep their compact runs.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siact(
    points: &PointSet,
    strategy: DiscoveryStrategy,
    compactness_threshold: f64,
    cardinality_threshold: usize,
) -> Vec<Mtp> {
    discover_mtps(points, strategy)
        .iter()
        .flat_map(|mtp| {
            compactness_trawl(mtp, compactness_threshold, cardinality_threshold, points)
        })
        .collect()
}

/// Split an MTP into maximal runs whose compactness stays at or above the
/// threshold, keeping runs of at least `cardinality_threshold` points.
///
/// A run is extended one point at a time; when adding the next point drops
/// the compactness below the threshold, the run is closed and a new one
/// starts at that point.
pub fn compactness_trawl(
    mtp: &Mtp,
    compactness_threshold: f64,
    cardinality_threshold: usize,
    points: &PointSet,
) -> Vec<Mtp> {
    let pattern = &mtp.points;
    let mut runs = Vec::new();
    let mut start = 0;

    for j in 0..pattern.len().saturating_sub(1) {
        let candidate = &pattern[start..j + 2];
        let c = find_pattern_span(candidate, points)
            .map_or(0.0, |(begin, end)| compactness(begin, end, candidate.len()));

        if c < compactness_threshold {
            let run = &pattern[start..j + 1];
            if run.len() >= cardinality_threshold {
                runs.push(Mtp::new(mtp.vector.clone(), run.to_vec()));
            }
            start = j + 1;
        }
    }

    let tail = &pattern[start.min(pattern.len())..];
    if !tail.is_empty() && tail.len() >= cardinality_threshold {
        runs.push(Mtp::new(mtp.vector.clone(), tail.to_vec()));
    }

    runs
}
