//! Compression selectors.
//!
//! Each selector picks a subset of TECs that together cover the dataset:
//!
//! - [`cosiatec`]: take the best TEC of the remaining points, remove its
//!   coverage, repeat until nothing remains.
//! - [`siatec_compress`]: rank the whole TEC universe once and accept TECs in
//!   a single greedy pass while they pay for their own encoding.
//! - [`forths_algorithm`]: salience-weighted greedy cover grouping TECs into
//!   primaries and the secondaries that overlap them.
//!
//! [`compress`] is the validated entry point driven by a
//! [`CompressionConfig`].

mod cosiatec;
mod forth;
mod siatec_compress;

pub use cosiatec::cosiatec;
pub use forth::{forth_cover, forths_algorithm, tec_saliences, ForthCover};
pub use siatec_compress::{compute_encoding, siatec_compress, siatec_compress_filtered};

use crate::config::{Algorithm, CompressionConfig, DiscoveryStrategy};
use crate::error::{Result, SiatecError};
use crate::heuristics::compression_ratio;
use crate::point::Point;
use crate::point_set::PointSet;
use crate::siatec::{discover_tecs, siatechf};
use crate::tec::Tec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// A primary TEC and the secondaries attached to it, as positions into
/// [`Encoding::tecs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForthGroup {
    pub primary: usize,
    pub secondaries: Vec<usize>,
}

/// The result of a compression run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Encoding {
    /// Selected TECs in selection order. The residual is never among them.
    pub tecs: Vec<Tec>,
    /// Primary/secondary grouping; empty unless Forth's algorithm ran.
    pub forth_groups: Vec<ForthGroup>,
    /// Points no selected TEC covers.
    pub residual: Vec<Point>,
}

impl Encoding {
    /// Split a selector's output into TECs and residual points.
    pub fn from_tecs(mut tecs: Vec<Tec>) -> Self {
        let residual = match tecs.last() {
            Some(last) if last.is_residual() => tecs
                .pop()
                .map(|tec| tec.pattern().to_vec())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        Self {
            tecs,
            forth_groups: Vec::new(),
            residual,
        }
    }

    /// Flatten a Forth cover, recording the grouping by position.
    pub fn from_forth(cover: ForthCover) -> Self {
        let mut tecs = Vec::new();
        let mut forth_groups = Vec::new();

        for (primary, secondaries) in cover.primary_tecs.into_iter().zip(cover.secondary_tecs) {
            let primary_at = tecs.len();
            tecs.push(primary);
            let start = tecs.len();
            tecs.extend(secondaries);
            forth_groups.push(ForthGroup {
                primary: primary_at,
                secondaries: (start..tecs.len()).collect(),
            });
        }

        Self {
            tecs,
            forth_groups,
            residual: cover.residual,
        }
    }

    /// Union of every TEC's coverage and the residual.
    pub fn covered_points(&self) -> BTreeSet<Point> {
        let mut covered: BTreeSet<Point> = self.residual.iter().cloned().collect();
        for tec in &self.tecs {
            covered.extend(tec.coverage().iter().cloned());
        }
        covered
    }

    /// Check that every point of `points` is covered.
    pub fn covers(&self, points: &PointSet) -> bool {
        let covered = self.covered_points();
        points.iter().all(|p| covered.contains(p))
    }

    /// Total encoding cost: the TECs' costs plus one per residual point.
    pub fn encoding_length(&self) -> usize {
        self.tecs.iter().map(Tec::encoding_cost).sum::<usize>() + self.residual.len()
    }

    /// Dataset size over encoding length. `0.0` for an empty encoding.
    pub fn compression_factor(&self, dataset_size: usize) -> f64 {
        match self.encoding_length() {
            0 => 0.0,
            length => dataset_size as f64 / length as f64,
        }
    }
}

/// Run the configured selector.
///
/// Unlike the selector functions, which return an empty result for an empty
/// set, this rejects empty input.
#[instrument(level = "info", skip_all, fields(n = points.len(), algorithm = ?config.algorithm))]
pub fn compress(points: &PointSet, config: &CompressionConfig) -> Result<Encoding> {
    config.validate()?;
    if points.is_empty() {
        return Err(SiatecError::EmptyDataset);
    }

    let encoding = match config.algorithm {
        Algorithm::Cosiatec => Encoding::from_tecs(cosiatec(points, config.discovery)),
        Algorithm::SiatecCompress => Encoding::from_tecs(match config.min_compression_ratio {
            Some(min_cr) => siatec_compress_filtered(points, config.discovery, min_cr),
            None => siatec_compress(points, config.discovery),
        }),
        Algorithm::Forth => {
            let tecs = tec_universe(points, config.discovery, config.min_compression_ratio);
            Encoding::from_forth(forth_cover(
                points,
                tecs,
                config.forth.c_min,
                config.forth.sigma_min,
            ))
        }
    };

    info!(
        tecs = encoding.tecs.len(),
        residual = encoding.residual.len(),
        factor = encoding.compression_factor(points.len()),
        "compression complete"
    );
    Ok(encoding)
}

/// Refinement hook applied to an encoding before it is returned.
///
/// Returns its input unchanged. The refinement it stands for has no agreed
/// definition, so no translators are dropped.
pub fn remove_redundant_translators(tecs: Vec<Tec>) -> Vec<Tec> {
    tecs
}

/// Every TEC of the set, optionally without those below `min_cr`.
pub(crate) fn tec_universe(
    points: &PointSet,
    strategy: DiscoveryStrategy,
    min_cr: Option<f64>,
) -> Vec<Tec> {
    match (strategy, min_cr) {
        (_, None) => discover_tecs(points, strategy),
        (DiscoveryStrategy::Hashed, Some(min_cr)) => siatechf(points, min_cr),
        (DiscoveryStrategy::VectorTable, Some(min_cr)) => discover_tecs(points, strategy)
            .into_iter()
            .filter(|tec| compression_ratio(tec) >= min_cr)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn compress_rejects_empty_input() {
        let err = compress(&PointSet::default(), &CompressionConfig::default()).unwrap_err();
        assert_eq!(err, SiatecError::EmptyDataset);
    }

    #[test]
    fn compress_rejects_invalid_config() {
        let config = CompressionConfig::forth(1, 2.0);
        let err = compress(&fig11(), &config).unwrap_err();
        assert!(matches!(err, SiatecError::InvalidConfig(_)));
    }

    #[test]
    fn every_algorithm_covers_fig11() {
        let points = fig11();
        for algorithm in [Algorithm::Cosiatec, Algorithm::SiatecCompress, Algorithm::Forth] {
            for discovery in [DiscoveryStrategy::VectorTable, DiscoveryStrategy::Hashed] {
                let config = CompressionConfig {
                    algorithm,
                    discovery,
                    forth: crate::config::ForthConfig {
                        c_min: 1,
                        sigma_min: 0.5,
                    },
                    min_compression_ratio: None,
                };
                let encoding = compress(&points, &config).unwrap();
                assert!(encoding.covers(&points), "{:?}/{:?}", algorithm, discovery);
            }
        }
    }

    #[test]
    fn from_tecs_splits_off_residual() {
        let points = fig11();
        let tecs = vec![
            Tec::new(vec![points[0].clone()], vec![0], vec![Point::zero(2)]),
            Tec::residual(vec![points[1].clone()]),
        ];
        let encoding = Encoding::from_tecs(tecs);
        assert_eq!(encoding.tecs.len(), 1);
        assert_eq!(encoding.residual, vec![points[1].clone()]);
        assert_eq!(encoding.encoding_length(), 2);
        assert_eq!(encoding.compression_factor(2), 1.0);
    }

    #[test]
    fn from_forth_records_groups() {
        let t = |x: f64| Tec::new(vec![Point::from([x, 0.0])], vec![], vec![Point::zero(2)]);
        let cover = ForthCover {
            primary_tecs: vec![t(1.0), t(2.0)],
            secondary_tecs: vec![vec![t(3.0), t(4.0)], vec![]],
            residual: Vec::new(),
        };
        let encoding = Encoding::from_forth(cover);
        assert_eq!(encoding.tecs.len(), 4);
        assert_eq!(
            encoding.forth_groups,
            vec![
                ForthGroup {
                    primary: 0,
                    secondaries: vec![1, 2]
                },
                ForthGroup {
                    primary: 3,
                    secondaries: vec![]
                },
            ]
        );
    }

    #[test]
    fn redundant_translator_hook_is_identity() {
        let tecs = vec![Tec::residual(vec![Point::from([1.0, 1.0])])];
        assert_eq!(remove_redundant_translators(tecs.clone()), tecs);
    }
}
