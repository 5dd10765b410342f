use crate::config::DiscoveryStrategy;
use crate::heuristics::TecQuality;
use crate::point_set::PointSet;
use crate::siatec::{build_tec, siatech};
use crate::table::VectorTable;
use crate::tec::Tec;
use rayon::prelude::*;
use tracing::{debug, instrument, trace};

/// COSIATEC (Meredith 2013, fig. 2).
///
/// Works on its own copy of the points. Each round takes the best TEC of the
/// remaining points (conjugates compete too) and removes that TEC's coverage,
/// until no point remains. Returned TECs carry indices into `points`.
#[instrument(level = "debug", skip(points), fields(n = points.len()))]
pub fn cosiatec(points: &PointSet, strategy: DiscoveryStrategy) -> Vec<Tec> {
    let mut remaining = points.clone();
    let mut selected = Vec::new();

    while !remaining.is_empty() {
        let Some(best) = best_tec(&remaining, strategy) else {
            // A lone point has no pairs for the hashed index to work with.
            selected.push(Tec::residual(remaining.into_vec()));
            break;
        };

        trace!(tec = %best, remaining = remaining.len(), "selected");
        remaining.remove_all(best.coverage());
        selected.push(best.relocated(points));
    }

    debug!(tecs = selected.len(), "cosiatec complete");
    selected
}

/// The best TEC of `remaining`, scored against `remaining`.
fn best_tec(remaining: &PointSet, strategy: DiscoveryStrategy) -> Option<Tec> {
    let candidates: Vec<Tec> = match strategy {
        DiscoveryStrategy::VectorTable => {
            let table = VectorTable::new(remaining);
            let entries = VectorTable::all_entries(remaining);
            let runs: Vec<Vec<usize>> = entries
                .chunk_by(|a, b| a.vector == b.vector)
                .map(|run| run.iter().map(|e| e.source).collect())
                .collect();

            runs.into_par_iter()
                .flat_map_iter(|indices| {
                    let tec = build_tec(indices, &table, remaining);
                    let conjugate = tec.conjugate(remaining);
                    [tec, conjugate]
                })
                .collect()
        }
        DiscoveryStrategy::Hashed => siatech(remaining)
            .into_par_iter()
            .flat_map_iter(|tec| {
                let conjugate = tec.conjugate(remaining);
                [tec, conjugate]
            })
            .collect(),
    };

    let qualities: Vec<TecQuality> = candidates
        .par_iter()
        .map(|tec| TecQuality::measure(tec, remaining))
        .collect();

    // First of equally good candidates wins.
    let best = qualities
        .iter()
        .enumerate()
        .min_by_key(|(_, quality)| **quality)
        .map(|(i, _)| i)?;

    candidates.into_iter().nth(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;

    fn fig11() -> PointSet {
        PointSet::from_rows(vec![
            vec![1.0, 1.0],
            vec![1.0, 3.0],
            vec![2.0, 1.0],
            vec![2.0, 2.0],
            vec![2.0, 3.0],
            vec![3.0, 2.0],
        ])
        .unwrap()
    }

    #[test]
    fn covers_fig11_with_one_tec() {
        let points = fig11();
        let tecs = cosiatec(&points, DiscoveryStrategy::VectorTable);
        // The two-point pattern with three translators covers all six points
        // at ratio 1.5, the best available.
        assert_eq!(tecs.len(), 1);
        assert_eq!(tecs[0].coverage().len(), 6);
        assert!(points.iter().all(|p| tecs[0].coverage().contains(p)));
    }

    #[test]
    fn hashed_strategy_covers_everything() {
        let points = fig11();
        let tecs = cosiatec(&points, DiscoveryStrategy::Hashed);
        let covered: usize = tecs.iter().map(|t| t.coverage().len()).sum();
        assert!(covered >= points.len());
        for p in points.iter() {
            assert!(tecs.iter().any(|t| t.coverage().contains(p)));
        }
    }

    #[test]
    fn single_point_dataset() {
        let points = PointSet::from_rows(vec![vec![4.0, 2.0]]).unwrap();
        let table = cosiatec(&points, DiscoveryStrategy::VectorTable);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].pattern(), &[Point::from([4.0, 2.0])]);

        let hashed = cosiatec(&points, DiscoveryStrategy::Hashed);
        assert_eq!(hashed.len(), 1);
        assert!(hashed[0].is_residual());
    }

    #[test]
    fn empty_dataset_yields_nothing() {
        assert!(cosiatec(&PointSet::default(), DiscoveryStrategy::VectorTable).is_empty());
    }

    #[test]
    fn indices_refer_to_the_input() {
        let points = PointSet::from_rows(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![5.0, 5.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
        ])
        .unwrap();
        for tec in cosiatec(&points, DiscoveryStrategy::VectorTable) {
            for (&i, p) in tec.pattern_indices().iter().zip(tec.pattern()) {
                assert_eq!(&points[i], p);
            }
        }
    }
}
