//! End-to-end scenarios on small published datasets.

use siatec_core::report::{EncodingReport, TecReport};
use siatec_core::{
    compress, cosiatec, forths_algorithm, io, siatec, siatec_compress, siah, sia, siatech,
    Algorithm, CompressionConfig, DiscoveryStrategy, LoaderConfig, Mtp, Point, PointSet,
    SiatecError,
};
use std::io::Write;

fn p(x: f64, y: f64) -> Point {
    Point::from([x, y])
}

fn test_data1() -> PointSet {
    PointSet::from_rows(vec![
        vec![1.0, 2.0],
        vec![2.0, 1.0],
        vec![3.0, 3.0],
        vec![4.0, 2.0],
    ])
    .unwrap()
}

/// Meredith, Lemström & Wiggins (2002), fig. 11.
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
fn test_data1_mtps() {
    let expected = vec![
        Mtp::new(p(1.0, -1.0), vec![p(1.0, 2.0), p(3.0, 3.0)]),
        Mtp::new(p(1.0, 2.0), vec![p(2.0, 1.0)]),
        Mtp::new(p(2.0, 1.0), vec![p(1.0, 2.0), p(2.0, 1.0)]),
        Mtp::new(p(3.0, 0.0), vec![p(1.0, 2.0)]),
    ];
    assert_eq!(sia(&test_data1()), expected);
    assert_eq!(siah(&test_data1()), expected);
}

#[test]
fn fig11_discovery() {
    let points = fig11();
    assert_eq!(sia(&points).len(), 9);
    assert_eq!(siatec(&points).len(), 4);
    assert_eq!(siatech(&points).len(), 4);
}

#[test]
fn fig11_selectors_cover_the_dataset() {
    let points = fig11();
    for strategy in [DiscoveryStrategy::VectorTable, DiscoveryStrategy::Hashed] {
        for tecs in [cosiatec(&points, strategy), siatec_compress(&points, strategy)] {
            assert!(points
                .iter()
                .all(|p| tecs.iter().any(|t| t.coverage().contains(p))));
        }
        let cover = forths_algorithm(&points, strategy, 2, 0.5);
        for point in points.iter() {
            let in_tec = cover
                .primary_tecs
                .iter()
                .chain(cover.secondary_tecs.iter().flatten())
                .any(|t| t.coverage().contains(point));
            assert!(in_tec || cover.residual.contains(point));
        }
    }
}

#[test]
fn fig11_cosiatec_encoding() {
    let points = fig11();
    let encoding = compress(&points, &CompressionConfig::default()).unwrap();
    assert_eq!(encoding.tecs.len(), 1);
    assert!(encoding.residual.is_empty());
    assert_eq!(encoding.encoding_length(), 4);
    assert_eq!(encoding.compression_factor(points.len()), 1.5);

    let report = EncodingReport::new(&encoding, points.len());
    assert_eq!(report.tecs[0], TecReport::from(&encoding.tecs[0]));
    assert!(report.to_string().ends_with("compression factor 1.500"));
}

#[test]
fn compress_from_yaml_config() {
    let config = CompressionConfig::from_yaml_str(
        "algorithm: forth\ndiscovery: hashed\nforth:\n  c_min: 2\n  sigma_min: 0.5\n",
    )
    .unwrap();
    assert_eq!(config.algorithm, Algorithm::Forth);

    let points = fig11();
    let encoding = compress(&points, &config).unwrap();
    assert!(encoding.covers(&points));
    for group in &encoding.forth_groups {
        assert!(group.primary < encoding.tecs.len());
        assert!(group.secondaries.iter().all(|&s| s > group.primary));
    }
}

#[test]
fn compress_rejects_bad_input() {
    assert_eq!(
        compress(&PointSet::default(), &CompressionConfig::default()).unwrap_err(),
        SiatecError::EmptyDataset
    );

    let mut config = CompressionConfig::forth(2, 1.5);
    assert!(matches!(
        compress(&fig11(), &config).unwrap_err(),
        SiatecError::InvalidConfig(_)
    ));
    config.forth.sigma_min = 0.5;
    config.min_compression_ratio = Some(f64::NAN);
    assert!(compress(&fig11(), &config).is_err());
}

#[test]
fn load_config_and_points_from_files() {
    let mut data = tempfile::NamedTempFile::new().unwrap();
    writeln!(data, "# fig. 11").unwrap();
    writeln!(data, "2,3\n1,1\n3,2\n1,3\n2,1\n2,2").unwrap();

    let mut yaml = tempfile::NamedTempFile::new().unwrap();
    writeln!(yaml, "algorithm: siatec_compress").unwrap();

    let points = io::load_csv(data.path(), &LoaderConfig::default()).unwrap();
    assert_eq!(points, fig11());

    let config = CompressionConfig::from_path(yaml.path()).unwrap();
    let encoding = compress(&points, &config).unwrap();
    assert_eq!(encoding.tecs.len(), 1);
    assert!(encoding.covers(&points));
}
