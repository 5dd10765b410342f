//! Property tests over random point sets.

use proptest::prelude::*;
use siatec_core::heuristics::compression_ratio;
use siatec_core::{
    cosiatec, find_mtp, find_translators, find_translators_hashed, forths_algorithm, is_better,
    sia, siah, siatec, siatec_compress, siatech, DifferenceIndex, DiscoveryStrategy, Mtp,
    Pattern, Point, PointSet, Tec, TecQuality, VectorTable,
};
use std::collections::BTreeSet;

// -- Strategy helpers --

/// Distinct points on a small grid, so repeated structure is common.
fn arb_point_set() -> impl Strategy<Value = PointSet> {
    prop::collection::btree_set((0i32..8, 0i32..6), 1..12).prop_map(|cells| {
        let points = cells
            .into_iter()
            .map(|(x, y)| Point::from([x as f64, y as f64]))
            .collect();
        PointSet::new(points).unwrap()
    })
}

/// Points on a tiny grid with repeats, so equal points are common.
fn arb_point_multiset() -> impl Strategy<Value = PointSet> {
    prop::collection::vec((0i32..4, 0i32..3), 1..10).prop_map(|cells| {
        let points = cells
            .into_iter()
            .map(|(x, y)| Point::from([x as f64, y as f64]))
            .collect();
        PointSet::new(points).unwrap()
    })
}

/// Points with repeats allowed, in arbitrary order.
fn arb_point_list() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((-4i32..4, -4i32..4, -4i32..4), 0..20).prop_map(|rows| {
        rows.into_iter()
            .map(|(x, y, z)| Point::from([x as f64, y as f64, z as f64]))
            .collect()
    })
}

fn arb_points_with_pattern() -> impl Strategy<Value = (PointSet, Vec<usize>)> {
    prop_oneof![arb_point_set(), arb_point_multiset()].prop_flat_map(|points| {
        let n = points.len();
        (
            Just(points),
            prop::collection::btree_set(0..n, 1..=n).prop_map(|s| s.into_iter().collect()),
        )
    })
}

fn sorted_mtps(mut mtps: Vec<Mtp>) -> Vec<Mtp> {
    mtps.sort();
    mtps
}

fn tec_classes(tecs: &[Tec]) -> Vec<(Pattern, Vec<Point>)> {
    let mut classes: Vec<(Pattern, Vec<Point>)> = tecs
        .iter()
        .map(|tec| (Pattern::of(tec.pattern()), tec.coverage().iter().cloned().collect()))
        .collect();
    classes.sort();
    classes
}

fn covered_by(tecs: &[Tec]) -> BTreeSet<Point> {
    tecs.iter()
        .flat_map(|tec| tec.coverage().iter().cloned())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sorting_is_idempotent(points in arb_point_list()) {
        let once = PointSet::sort_ascending(&points).unwrap();
        let twice = PointSet::sort_ascending(once.as_slice()).unwrap();
        prop_assert_eq!(once.as_slice(), twice.as_slice());
        prop_assert!(once.as_slice().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn sort_and_hash_mtps_agree(
        points in prop_oneof![arb_point_set(), arb_point_multiset()],
    ) {
        prop_assert_eq!(sorted_mtps(sia(&points)), sorted_mtps(siah(&points)));
    }

    #[test]
    fn every_mtp_is_maximal(points in arb_point_set()) {
        for mtp in sia(&points) {
            prop_assert_eq!(&mtp, &find_mtp(&points, &mtp.vector));
        }
    }

    #[test]
    fn translator_finders_agree((points, indices) in arb_points_with_pattern()) {
        let table = VectorTable::new(&points);
        let index = DifferenceIndex::new(&points);
        let pattern: Vec<Point> = indices.iter().map(|&i| points[i].clone()).collect();

        let merged = find_translators(&indices, &table);
        let hashed = find_translators_hashed(&pattern, &index, &points);
        prop_assert_eq!(&merged, &hashed);

        // Every translator maps the whole pattern into the set, the
        // identity included.
        prop_assert!(merged.iter().any(Point::is_zero));
        for t in &merged {
            prop_assert!(pattern.iter().all(|p| points.contains(&(p + t))));
        }
    }

    #[test]
    fn table_and_hash_pipelines_build_the_same_tecs(
        points in prop_oneof![arb_point_set(), arb_point_multiset()],
    ) {
        // Either pipeline may pick a different occurrence of a shape, so
        // compare shapes and what they cover.
        prop_assert_eq!(tec_classes(&siatec(&points)), tec_classes(&siatech(&points)));
    }

    #[test]
    fn conjugate_preserves_coverage(
        points in prop_oneof![arb_point_set(), arb_point_multiset()],
    ) {
        for tec in siatec(&points) {
            let conjugate = tec.conjugate(&points);
            prop_assert_eq!(conjugate.coverage(), tec.coverage());
        }
    }

    #[test]
    fn compression_ratio_matches_definition(points in arb_point_set()) {
        for tec in siatec(&points) {
            let cost = tec.pattern().len() + tec.translators().len() - 1;
            prop_assert_eq!(
                compression_ratio(&tec),
                tec.coverage().len() as f64 / cost as f64
            );
        }
    }

    #[test]
    fn is_better_follows_measured_quality(points in arb_point_set()) {
        let tecs = siatec(&points);
        let qualities: Vec<TecQuality> =
            tecs.iter().map(|tec| TecQuality::measure(tec, &points)).collect();
        for tec in &tecs {
            prop_assert!(!is_better(tec, tec, &points));
        }
        for (pair, q) in tecs.windows(2).zip(qualities.windows(2)) {
            prop_assert_eq!(is_better(&pair[0], &pair[1], &points), q[0] < q[1]);
        }
    }

    #[test]
    fn cosiatec_removes_repeated_points_one_copy_at_a_time(points in arb_point_multiset()) {
        // Coverage is a set, so each selected TEC removes one copy per
        // covered value; the loop still empties the multiset.
        let tecs = cosiatec(&points, DiscoveryStrategy::VectorTable);
        prop_assert!(!tecs.is_empty());
        let mut remaining = points.clone();
        for tec in &tecs {
            let before = remaining.len();
            remaining.remove_all(tec.coverage());
            prop_assert!(remaining.len() < before);
        }
        prop_assert!(remaining.is_empty());
    }

    #[test]
    fn quality_order_is_transitive(points in arb_point_set()) {
        let qualities: Vec<TecQuality> = siatec(&points)
            .iter()
            .map(|tec| TecQuality::measure(tec, &points))
            .collect();
        for a in &qualities {
            for b in qualities.iter().filter(|b| a < *b) {
                for c in qualities.iter().filter(|c| b < *c) {
                    prop_assert!(a < c);
                }
            }
        }
    }

    #[test]
    fn cosiatec_covers_the_dataset(
        points in prop_oneof![arb_point_set(), arb_point_multiset()],
    ) {
        for strategy in [DiscoveryStrategy::VectorTable, DiscoveryStrategy::Hashed] {
            let covered = covered_by(&cosiatec(&points, strategy));
            prop_assert!(points.iter().all(|p| covered.contains(p)));
        }
    }

    #[test]
    fn siatec_compress_covers_the_dataset(
        points in prop_oneof![arb_point_set(), arb_point_multiset()],
    ) {
        for strategy in [DiscoveryStrategy::VectorTable, DiscoveryStrategy::Hashed] {
            let covered = covered_by(&siatec_compress(&points, strategy));
            prop_assert!(points.iter().all(|p| covered.contains(p)));
        }
    }

    #[test]
    fn forth_cover_and_residual_cover_the_dataset(
        points in prop_oneof![arb_point_set(), arb_point_multiset()],
        c_min in 1usize..4,
        sigma_min in 0.0f64..1.0,
    ) {
        let cover = forths_algorithm(&points, DiscoveryStrategy::VectorTable, c_min, sigma_min);
        prop_assert_eq!(cover.primary_tecs.len(), cover.secondary_tecs.len());

        let mut covered = covered_by(&cover.primary_tecs);
        for group in &cover.secondary_tecs {
            covered.extend(covered_by(group));
        }
        covered.extend(cover.residual.iter().cloned());
        prop_assert!(points.iter().all(|p| covered.contains(p)));
    }
}
