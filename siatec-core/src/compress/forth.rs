use super::tec_universe;
use crate::config::DiscoveryStrategy;
use crate::heuristics::{compression_ratio, max_occurrence_compactness};
use crate::point::Point;
use crate::point_set::PointSet;
use crate::tec::Tec;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument, trace};

/// Output of Forth's algorithm.
///
/// `secondary_tecs[i]` holds the secondaries attached to `primary_tecs[i]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForthCover {
    pub primary_tecs: Vec<Tec>,
    pub secondary_tecs: Vec<Vec<Tec>>,
    /// Points left uncovered when no remaining TEC qualified.
    pub residual: Vec<Point>,
}

/// Forth's algorithm (Forth 2012; Meredith 2016, fig. 13.10) over the whole
/// TEC universe of `points`.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn forths_algorithm(
    points: &PointSet,
    strategy: DiscoveryStrategy,
    c_min: usize,
    sigma_min: f64,
) -> ForthCover {
    forth_cover(points, tec_universe(points, strategy, None), c_min, sigma_min)
}

/// Normalised compression ratio times normalised best occurrence
/// compactness, per TEC.
///
/// Normalisation is min-max over `tecs`; a zero range divides by one.
pub fn tec_saliences(tecs: &[Tec], points: &PointSet) -> Vec<f64> {
    let measured: Vec<(f64, f64)> = tecs
        .par_iter()
        .map(|tec| (compression_ratio(tec), max_occurrence_compactness(tec, points)))
        .collect();

    // Seeds lie outside the reachable ranges so the first TEC sets both ends.
    let (mut min_cr, mut max_cr) = (points.len() as f64, -1.0_f64);
    let (mut min_comp, mut max_comp) = (2.0_f64, -1.0_f64);
    for &(cr, comp) in &measured {
        min_cr = min_cr.min(cr);
        max_cr = max_cr.max(cr);
        min_comp = min_comp.min(comp);
        max_comp = max_comp.max(comp);
    }

    let range = |lo: f64, hi: f64| if hi - lo == 0.0 { 1.0 } else { hi - lo };
    let cr_range = range(min_cr, max_cr);
    let comp_range = range(min_comp, max_comp);

    measured
        .into_iter()
        .map(|(cr, comp)| ((cr - min_cr) / cr_range) * ((comp - min_comp) / comp_range))
        .collect()
}

/// Greedy salience-weighted cover.
///
/// Each round scores every surviving TEC by the number of points it would
/// newly cover times its salience. TECs adding fewer than `c_min` new points
/// are dropped for good. The winner becomes a secondary of the first primary
/// whose coverage it overlaps by more than `sigma_min` of that primary's
/// coverage, or a new primary otherwise. Rounds continue until every point
/// is covered or no TEC scores above zero.
#[instrument(level = "debug", skip(points, tecs), fields(n = points.len(), tecs = tecs.len()))]
pub fn forth_cover(points: &PointSet, tecs: Vec<Tec>, c_min: usize, sigma_min: f64) -> ForthCover {
    let saliences = tec_saliences(&tecs, points);
    let mut candidates: Vec<(Tec, f64)> = tecs.into_iter().zip(saliences).collect();

    let distinct: BTreeSet<&Point> = points.iter().collect();
    let mut covered: BTreeSet<Point> = BTreeSet::new();
    let mut groups: Vec<Vec<Tec>> = Vec::new();

    while !distinct.iter().all(|p| covered.contains(*p)) {
        let mut best: Option<usize> = None;
        let mut best_score = 0.0;
        let mut dropped: BTreeSet<usize> = BTreeSet::new();

        for (i, (tec, salience)) in candidates.iter().enumerate() {
            let new_points = tec
                .coverage()
                .iter()
                .filter(|p| !covered.contains(*p))
                .count();
            if new_points < c_min {
                dropped.insert(i);
                continue;
            }
            let score = new_points as f64 * salience;
            if score > best_score {
                best_score = score;
                best = Some(i);
            }
        }

        let Some(best) = best else {
            break;
        };

        let mut winner = None;
        let mut survivors = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.into_iter().enumerate() {
            if i == best {
                winner = Some(candidate.0);
            } else if !dropped.contains(&i) {
                survivors.push(candidate);
            }
        }
        candidates = survivors;
        let Some(winner) = winner else {
            break;
        };

        trace!(tec = %winner, score = best_score, dropped = dropped.len(), "selected");
        covered.extend(winner.coverage().iter().cloned());

        let primary = groups.iter_mut().find(|group| {
            let primary = group[0].coverage();
            let shared = primary.intersection(winner.coverage()).count();
            !primary.is_empty() && shared as f64 / primary.len() as f64 > sigma_min
        });
        match primary {
            Some(group) => group.push(winner),
            None => groups.push(vec![winner]),
        }
    }

    let residual: Vec<Point> = distinct
        .into_iter()
        .filter(|p| !covered.contains(*p))
        .cloned()
        .collect();

    debug!(
        primaries = groups.len(),
        residual = residual.len(),
        "forth cover complete"
    );

    let mut primary_tecs = Vec::with_capacity(groups.len());
    let mut secondary_tecs = Vec::with_capacity(groups.len());
    for mut group in groups {
        let rest = group.split_off(1);
        primary_tecs.extend(group);
        secondary_tecs.push(rest);
    }

    ForthCover {
        primary_tecs,
        secondary_tecs,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(v: f64) -> Point {
        Point::from([v, 0.0])
    }

    /// Six points 0..=5 and four points 20..=23 on one line.
    fn line() -> PointSet {
        PointSet::new([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 20.0, 21.0, 22.0, 23.0].map(x).to_vec())
            .unwrap()
    }

    /// Full cover of 0..=5 (ratio 1.5), a pair that reaches into 20..=22
    /// (ratio 1.25) and a sparse two-point anchor (ratio 1, compactness 0.2).
    fn line_tecs() -> Vec<Tec> {
        vec![
            Tec::new(vec![x(0.0), x(1.0)], vec![0, 1], vec![x(0.0), x(2.0), x(4.0)]),
            Tec::new(vec![x(4.0), x(5.0)], vec![4, 5], vec![x(0.0), x(16.0), x(17.0)]),
            Tec::new(vec![x(0.0), x(23.0)], vec![0, 9], vec![x(0.0)]),
        ]
    }

    #[test]
    fn saliences_are_min_max_normalised() {
        let saliences = tec_saliences(&line_tecs(), &line());
        assert_eq!(saliences, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn saliences_of_identical_tecs_are_zero() {
        let tecs = vec![line_tecs()[0].clone(), line_tecs()[0].clone()];
        assert_eq!(tec_saliences(&tecs, &line()), vec![0.0, 0.0]);
    }

    #[test]
    fn overlapping_tec_becomes_secondary() {
        let cover = forth_cover(&line(), line_tecs(), 1, 0.2);
        assert_eq!(cover.primary_tecs, vec![line_tecs()[0].clone()]);
        assert_eq!(cover.secondary_tecs, vec![vec![line_tecs()[1].clone()]]);
        assert_eq!(cover.residual, vec![x(23.0)]);
    }

    #[test]
    fn low_overlap_starts_a_new_primary() {
        let cover = forth_cover(&line(), line_tecs(), 1, 0.5);
        assert_eq!(cover.primary_tecs.len(), 2);
        assert!(cover.secondary_tecs.iter().all(Vec::is_empty));
    }

    #[test]
    fn high_c_min_selects_nothing() {
        let cover = forth_cover(&line(), line_tecs(), 10, 0.5);
        assert!(cover.primary_tecs.is_empty());
        assert_eq!(cover.residual.len(), 10);
    }

    #[test]
    fn forths_algorithm_accounts_for_every_point() {
        let points = line();
        for strategy in [DiscoveryStrategy::VectorTable, DiscoveryStrategy::Hashed] {
            let cover = forths_algorithm(&points, strategy, 2, 0.5);
            let mut covered: BTreeSet<Point> = cover.residual.iter().cloned().collect();
            for tec in cover.primary_tecs.iter().chain(cover.secondary_tecs.iter().flatten()) {
                covered.extend(tec.coverage().iter().cloned());
            }
            assert!(points.iter().all(|p| covered.contains(p)));
        }
    }
}
