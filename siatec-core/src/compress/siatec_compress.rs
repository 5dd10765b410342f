use super::remove_redundant_translators;
use crate::config::DiscoveryStrategy;
use crate::hashing::{Pattern, UniversalSet, UniversalState};
use crate::heuristics::{compression_ratio, sort_by_quality};
use crate::point::Point;
use crate::point_set::PointSet;
use crate::siatec::{build_tec, siatech};
use crate::table::VectorTable;
use crate::tec::Tec;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// SIATECCompress (Meredith 2013).
///
/// Builds the TEC universe once, adds every TEC's conjugate, ranks the lot
/// best-first and keeps each TEC whose not-yet-covered points outnumber its
/// encoding cost. Uncovered points come last as a residual TEC.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siatec_compress(points: &PointSet, strategy: DiscoveryStrategy) -> Vec<Tec> {
    let tecs = with_conjugates(universe(points, strategy), points);
    encode(tecs, points)
}

/// [`siatec_compress`] considering only TECs (conjugates included) whose
/// compression ratio is at least `min_cr`.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn siatec_compress_filtered(
    points: &PointSet,
    strategy: DiscoveryStrategy,
    min_cr: f64,
) -> Vec<Tec> {
    let tecs: Vec<Tec> = with_conjugates(universe(points, strategy), points)
        .into_iter()
        .filter(|tec| compression_ratio(tec) >= min_cr)
        .collect();
    encode(tecs, points)
}

fn encode(mut tecs: Vec<Tec>, points: &PointSet) -> Vec<Tec> {
    sort_by_quality(&mut tecs, points);
    let encoding = remove_redundant_translators(compute_encoding(tecs, points));
    debug!(tecs = encoding.len(), "siatec_compress complete");
    encoding
}

/// Greedy pass over best-first TECs (Meredith 2013, fig. 7).
///
/// A TEC is accepted when it adds more new points than it costs to encode.
/// The pass stops as soon as every point is covered.
pub fn compute_encoding(tecs: Vec<Tec>, points: &PointSet) -> Vec<Tec> {
    let distinct: BTreeSet<&Point> = points.iter().collect();
    let mut covered: BTreeSet<Point> = BTreeSet::new();
    let mut selected = Vec::new();

    for tec in tecs {
        let new_points = tec
            .coverage()
            .iter()
            .filter(|p| !covered.contains(*p))
            .count();
        if new_points <= tec.encoding_cost() {
            continue;
        }

        covered.extend(tec.coverage().iter().cloned());
        selected.push(tec);

        if covered.len() >= distinct.len() && distinct.iter().all(|p| covered.contains(*p)) {
            break;
        }
    }

    let residual: Vec<Point> = distinct
        .into_iter()
        .filter(|p| !covered.contains(*p))
        .cloned()
        .collect();
    if !residual.is_empty() {
        selected.push(Tec::residual(residual));
    }

    selected
}

/// TECs of every MTP shape. The table path draws MTPs from all ordered
/// pairs, negative and zero vectors included.
fn universe(points: &PointSet, strategy: DiscoveryStrategy) -> Vec<Tec> {
    match strategy {
        DiscoveryStrategy::VectorTable => {
            let table = VectorTable::new(points);
            let entries = VectorTable::all_entries(points);

            let mut seen: UniversalSet<Pattern> =
                UniversalSet::with_hasher(UniversalState::default());
            let mut patterns: Vec<Vec<usize>> = Vec::new();
            for run in entries.chunk_by(|a, b| a.vector == b.vector) {
                let mut indices: Vec<usize> = run.iter().map(|e| e.source).collect();
                indices.sort_unstable();
                let pattern: Vec<Point> = indices.iter().map(|&i| points[i].clone()).collect();
                if seen.insert(Pattern::of(&pattern)) {
                    patterns.push(indices);
                }
            }

            patterns
                .into_par_iter()
                .map(|indices| build_tec(indices, &table, points))
                .collect()
        }
        DiscoveryStrategy::Hashed => siatech(points),
    }
}

fn with_conjugates(mut tecs: Vec<Tec>, points: &PointSet) -> Vec<Tec> {
    let conjugates: Vec<Tec> = tecs.par_iter().map(|tec| tec.conjugate(points)).collect();
    tecs.extend(conjugates);
    tecs
}
