//! TEC discovery.
//!
//! - [`siatec`]: MTPs from the sorted vector table, one TEC per distinct
//!   pattern shape, translators by row merge (Meredith, Lemström & Wiggins
//!   2002, figs. 20-25).
//! - [`siatech`]: the same universe from the hashed [`DifferenceIndex`],
//!   translators by posting-list intersection.
//! - [`siatech_pf`] and [`siatechf`]: `siatech` restricted to TECs whose
//!   compression ratio reaches a threshold, filtering after construction or
//!   pruning with [`cr_upper_bound`] before it.
//!
//! Translator finding for distinct patterns is independent, so it runs on
//! the rayon pool over the shared read-only tables.

use crate::config::DiscoveryStrategy;
use crate::hashing::{Pattern, UniversalSet, UniversalState};
use crate::heuristics::compression_ratio;
use crate::point::{vectorize, Point};
use crate::point_set::PointSet;
use crate::table::{DifferenceIndex, VectorTable};
use crate::tec::Tec;
use crate::translators::{find_translators, find_translators_hashed};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Build a TEC for the pattern at the given positions.
///
/// Positions need not be sorted; they are sorted before use.
pub fn build_tec(mut pattern_indices: Vec<usize>, table: &VectorTable, points: &PointSet) -> Tec {
    pattern_indices.sort_unstable();
    let pattern = pattern_indices.iter().map(|&i| points[i].clone()).collect();
    let translators = find_translators(&pattern_indices, table);
    Tec::new(pattern, pattern_indices, translators)
}

/// One candidate MTP: where its run starts in the sorted table, its shape and
/// the positions of its points.
struct Candidate {
    start: usize,
    shape: Vec<Point>,
    indices: Vec<usize>,
}

/// Compute the TEC of every distinct MTP shape using the vector table.
///
/// Output is ordered by pattern size, then by shape.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siatec(points: &PointSet) -> Vec<Tec> {
    let table = VectorTable::new(points);
    let entries = VectorTable::forward_entries(points);

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut start = 0;
    for run in entries.chunk_by(|a, b| a.vector == b.vector) {
        let indices: Vec<usize> = run.iter().map(|e| e.source).collect();
        let pattern: Vec<Point> = indices.iter().map(|&i| points[i].clone()).collect();
        candidates.push(Candidate {
            start,
            shape: vectorize(&pattern),
            indices,
        });
        start += run.len();
    }

    candidates.sort_by(|a, b| {
        a.shape
            .len()
            .cmp(&b.shape.len())
            .then_with(|| a.shape.cmp(&b.shape))
            .then_with(|| a.start.cmp(&b.start))
    });
    candidates.dedup_by(|later, earlier| later.shape == earlier.shape);

    debug!(pairs = entries.len(), distinct = candidates.len(), "building tecs");

    candidates
        .into_par_iter()
        .map(|candidate| build_tec(candidate.indices, &table, points))
        .collect()
}

/// Compute the TEC of every distinct MTP shape using the hashed index.
///
/// Output follows first discovery of each shape.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siatech(points: &PointSet) -> Vec<Tec> {
    let index = DifferenceIndex::new(points);
    let tecs: Vec<Tec> = distinct_patterns(&index, points)
        .into_par_iter()
        .map(|(pattern, indices)| hashed_tec(pattern, indices, &index, points))
        .collect();

    debug!(tecs = tecs.len(), "siatech complete");
    tecs
}

/// `siatech` keeping only TECs whose compression ratio is at least `min_cr`.
///
/// Every TEC is built before filtering.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siatech_pf(points: &PointSet, min_cr: f64) -> Vec<Tec> {
    siatech(points)
        .into_iter()
        .filter(|tec| compression_ratio(tec) >= min_cr)
        .collect()
}

/// `siatech` keeping only TECs whose compression ratio is at least `min_cr`.
///
/// Patterns whose [`cr_upper_bound`] is below `min_cr` are skipped before
/// their translators are computed.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siatechf(points: &PointSet, min_cr: f64) -> Vec<Tec> {
    let index = DifferenceIndex::new(points);
    let n = points.len();

    let candidates: Vec<(Vec<Point>, Vec<usize>)> = distinct_patterns(&index, points)
        .into_iter()
        .filter(|(pattern, _)| cr_upper_bound(pattern, &index, n) >= min_cr)
        .collect();

    debug!(kept = candidates.len(), "pruned by compression bound");

    candidates
        .into_par_iter()
        .map(|(pattern, indices)| hashed_tec(pattern, indices, &index, points))
        .filter(|tec| compression_ratio(tec) >= min_cr)
        .collect()
}

/// Upper bound on the compression ratio any TEC of `pattern` can reach in a
/// set of `n` points.
///
/// The translator count is bounded by the rarest vector between pattern
/// points (including first to last) and by the room left in the dataset.
pub fn cr_upper_bound(pattern: &[Point], index: &DifferenceIndex, n: usize) -> f64 {
    let size = pattern.len();
    let mut shape = vectorize(pattern);
    if let (Some(first), Some(last)) = (pattern.first(), pattern.last()) {
        if size > 1 {
            shape.push(last - first);
        }
    }

    let rarest = shape
        .iter()
        .map(|v| index.get(v).map_or(0, <[_]>::len))
        .min()
        .unwrap_or(usize::MAX);
    let translators = rarest.min((n + 1).saturating_sub(size));

    match size + translators {
        0 | 1 => 0.0,
        total => (size * translators) as f64 / (total - 1) as f64,
    }
}

/// TEC discovery with the selected strategy.
pub fn discover_tecs(points: &PointSet, strategy: DiscoveryStrategy) -> Vec<Tec> {
    match strategy {
        DiscoveryStrategy::VectorTable => siatec(points),
        DiscoveryStrategy::Hashed => siatech(points),
    }
}

/// MTP patterns from the index, first of each shape only.
fn distinct_patterns(index: &DifferenceIndex, points: &PointSet) -> Vec<(Vec<Point>, Vec<usize>)> {
    let mut seen: UniversalSet<Pattern> = UniversalSet::with_hasher(UniversalState::default());
    let mut patterns = Vec::new();

    for (_, pairs) in index.iter() {
        let indices: Vec<usize> = pairs.iter().map(|pair| pair.source).collect();
        let pattern: Vec<Point> = indices.iter().map(|&i| points[i].clone()).collect();
        if seen.insert(Pattern::of(&pattern)) {
            patterns.push((pattern, indices));
        }
    }

    patterns
}

fn hashed_tec(
    pattern: Vec<Point>,
    indices: Vec<usize>,
    index: &DifferenceIndex,
    points: &PointSet,
) -> Tec {
    let translators = find_translators_hashed(&pattern, index, points);
    Tec::new(pattern, indices, translators)
}

/// Order TECs by pattern size, then pattern, for comparing outputs that
/// differ only in order.
pub fn canonical_order(a: &Tec, b: &Tec) -> Ordering {
    a.pattern()
        .len()
        .cmp(&b.pattern().len())
        .then_with(|| a.pattern().cmp(b.pattern()))
}
