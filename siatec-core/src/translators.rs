//! Translator finding.
//!
//! Given a pattern (by its sorted positions in the point set), find every
//! vector `t` such that `{p + t : p ∈ pattern}` lies inside the point set.
//! The identity alignment yields the zero vector like any other.
//!
//! Two implementations with identical output:
//!
//! - [`find_translators`]: multi-cursor merge over the rows of the dense
//!   [`VectorTable`] (Meredith, Lemström & Wiggins 2002, fig. 25).
//! - [`find_translators_hashed`]: successive intersection of posting lists
//!   from the [`DifferenceIndex`].
//!
//! Both emit translators in ascending order of the occurrence's last point.
//!
//! # Repeated points
//!
//! A translator is emitted once per alignment, so the same vector can appear
//! several times. The merge advances every cursor by one column after each
//! alignment. Take a run of `s` equal pattern points whose translate occurs
//! `c` times in the set. That run supports `c - s + 1` alignments, and the
//! vector is emitted as often as the tightest run allows; see
//! [`alignment_count`].

use crate::point::{vectorize, Point};
use crate::point_set::PointSet;
use crate::table::{DifferenceIndex, IndexPair, VectorTable};

/// Find translators by merging the table rows of the pattern's points.
///
/// `pattern_indices` must be sorted ascending. Row `pattern_indices[k]` of
/// the table lists the vectors from pattern point `k` to every point of the
/// set, ascending. A translator exists wherever the same vector appears in
/// all of those rows at strictly increasing columns.
pub fn find_translators(pattern_indices: &[usize], table: &VectorTable) -> Vec<Point> {
    debug_assert!(pattern_indices.windows(2).all(|w| w[0] <= w[1]));

    let n = table.len();
    let m = pattern_indices.len();

    match m {
        0 => return Vec::new(),
        // Every point of the set is an occurrence of a single point.
        1 => return table.row(pattern_indices[0]).to_vec(),
        _ if m > n => return Vec::new(),
        _ => {}
    }

    // Last column pattern point k may occupy while leaving room for the rest.
    let bound = |k: usize| n - m + k;
    let diff = |k: usize, col: usize| table.get(pattern_indices[k], col);

    // cols[k] is the column currently examined in pattern point k's row.
    let mut cols = vec![0usize; m];
    let mut translators = Vec::new();
    let mut k = 1;

    loop {
        if cols[k] <= cols[k - 1] {
            cols[k] = cols[k - 1] + 1;
        }

        while cols[k] <= bound(k) && diff(k, cols[k]) < diff(k - 1, cols[k - 1]) {
            cols[k] += 1;
        }

        if cols[k] > bound(k) {
            break;
        }

        if diff(k, cols[k]) > diff(k - 1, cols[k - 1]) {
            // No match for the current start; restart with the next one.
            k = 1;
            cols[0] += 1;
            if cols[0] > bound(0) {
                break;
            }
        } else if k == m - 1 {
            translators.push(diff(k, cols[k]).clone());

            let mut exhausted = false;
            for (j, col) in cols.iter_mut().enumerate() {
                *col += 1;
                if *col > bound(j) {
                    exhausted = true;
                    break;
                }
            }
            if exhausted {
                break;
            }
            k = 1;
        } else {
            k += 1;
        }
    }

    translators
}

/// Find translators by intersecting posting lists of the pattern's shape.
///
/// Starting from the targets of the first difference vector, each further
/// vector keeps only the chains that continue from a current target. The
/// surviving final targets are the last points of the occurrences. Each
/// distinct translator is then repeated [`alignment_count`] times, matching
/// [`find_translators`] on sets with repeated points.
///
/// `pattern` must be sorted ascending. A shape vector never observed between
/// two points yields no translators.
pub fn find_translators_hashed(
    pattern: &[Point],
    index: &DifferenceIndex,
    points: &PointSet,
) -> Vec<Point> {
    let (first, last) = match (pattern.first(), pattern.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Vec::new(),
    };

    if pattern.len() == 1 {
        return points.iter().map(|q| q - first).collect();
    }

    let shape = vectorize(pattern);

    let mut targets: Vec<usize> = match index.get(&shape[0]) {
        Some(pairs) => pairs.iter().map(|pair| pair.target).collect(),
        None => return Vec::new(),
    };
    targets.sort_unstable();

    for vector in &shape[1..] {
        let pairs = match index.get(vector) {
            Some(pairs) => pairs,
            None => return Vec::new(),
        };
        targets = continue_chains(&targets, pairs);
        if targets.is_empty() {
            return Vec::new();
        }
    }

    let mut distinct: Vec<Point> = targets.iter().map(|&t| &points[t] - last).collect();
    distinct.dedup();

    let mut translators = Vec::with_capacity(distinct.len());
    for translator in distinct {
        let count = alignment_count(pattern, &translator, points);
        translators.extend(std::iter::repeat(translator).take(count));
    }
    translators
}

/// Number of alignments of the sorted `pattern` at `translator`.
///
/// Each run of `s` equal pattern points whose translate occurs `c` times in
/// the set allows `c - s + 1` alignments. The pattern as a whole allows the
/// minimum over its runs, or none when some run does not fit.
pub fn alignment_count(pattern: &[Point], translator: &Point, points: &PointSet) -> usize {
    let data = points.as_slice();
    pattern
        .chunk_by(|a, b| a == b)
        .map(|run| {
            let target = &run[0] + translator;
            let copies = data.partition_point(|q| q <= &target)
                - data.partition_point(|q| q < &target);
            (copies + 1).saturating_sub(run.len())
        })
        .min()
        .unwrap_or(0)
}

/// Targets of the pairs whose source is one of `targets` (both sorted).
fn continue_chains(targets: &[usize], pairs: &[IndexPair]) -> Vec<usize> {
    let mut next = Vec::with_capacity(targets.len().min(pairs.len()));
    let (mut a, mut b) = (0, 0);

    while a < targets.len() && b < pairs.len() {
        let source = pairs[b].source;
        if targets[a] == source {
            while b < pairs.len() && pairs[b].source == source {
                next.push(pairs[b].target);
                b += 1;
            }
            a += 1;
        } else if targets[a] < source {
            a += 1;
        } else {
            b += 1;
        }
    }

    next.sort_unstable();
    next
}
