//! Translational pattern discovery and pattern-based compression.
//!
//! This crate finds repeated, translationally-equivalent patterns in a finite
//! set of k-dimensional points (typically `(onset, pitch)` pairs extracted
//! from music) and selects compact covering subsets of those patterns.
//!
//! # Architecture
//!
//! ```text
//! rows ──► PointSet ──► VectorTable ─────┬──► sia / siatec ──────┐
//!            │          (sorted, dense)  │    (merge finder)     │
//!            │                           │                       ├──► Vec<Tec> ──► heuristics ──► selector ──► Encoding
//!            └────────► DifferenceIndex ─┴──► siah / siatech ────┘                (TecQuality)   (cosiatec,
//!                       (hashed)              (intersection finder)                               siatec_compress,
//!                                                                                                  forth)
//! ```
//!
//! # Key Concepts
//!
//! - **MTP**: the maximal set of points that a single vector translates onto
//!   other points of the dataset.
//! - **TEC**: a pattern together with every translator that maps it onto an
//!   occurrence inside the dataset.
//! - **Coverage**: the set of points produced by applying a TEC's translators
//!   to its pattern.
//! - **Compression ratio**: coverage size divided by the TEC's encoding cost.
//!
//! # Example
//!
//! ```
//! use siatec_core::{cosiatec, DiscoveryStrategy, PointSet};
//!
//! let points = PointSet::from_rows(vec![
//!     vec![1.0, 1.0],
//!     vec![1.0, 3.0],
//!     vec![2.0, 1.0],
//!     vec![2.0, 2.0],
//!     vec![2.0, 3.0],
//!     vec![3.0, 2.0],
//! ])
//! .unwrap();
//!
//! let encoding = cosiatec(&points, DiscoveryStrategy::VectorTable);
//! let covered: usize = encoding.iter().map(|tec| tec.coverage().len()).sum();
//! assert!(covered >= points.len());
//! ```

pub mod compress;
mod config;
mod error;
pub mod hashing;
pub mod heuristics;
pub mod io;
mod mtp;
mod point;
mod point_set;
pub mod report;
mod siatec;
mod table;
mod tec;
mod translators;

pub use compress::{
    compress, compute_encoding, cosiatec, forth_cover, forths_algorithm,
    remove_redundant_translators, siatec_compress, siatec_compress_filtered, tec_saliences,
    Encoding, ForthCover, ForthGroup,
};
pub use config::{
    Algorithm, CompressionConfig, DiscoveryStrategy, ForthConfig, LoaderConfig,
    MalformedRowPolicy, DEFAULT_C_MIN, DEFAULT_SIGMA_MIN,
};
pub use error::{Result, SiatecError};
pub use hashing::{MultiplierTable, Pattern, UniversalState};
pub use heuristics::{is_better, sort_by_quality, TecQuality};
pub use mtp::{compactness_trawl, discover_mtps, find_mtp, sia, siact, siah, siar, Mtp};
pub use point::{vectorize, Point};
pub use point_set::PointSet;
pub use siatec::{
    build_tec, canonical_order, cr_upper_bound, discover_tecs, siatec, siatech, siatech_pf,
    siatechf,
};
pub use table::{DifferenceIndex, IndexPair, TableEntry, VectorTable};
pub use tec::Tec;
pub use translators::{alignment_count, find_translators, find_translators_hashed};

/// Number of multipliers in the process-wide hashing table.
///
/// Inputs longer than this many 32-bit chunks reuse multipliers cyclically.
pub const DEFAULT_MULTIPLIER_COUNT: usize = 1024;

/// Inline capacity of a point before its components spill to the heap.
pub const INLINE_DIMENSIONS: usize = 4;
