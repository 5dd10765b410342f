//! Serializable views of discovery and compression results.
//!
//! Reports expose exactly what a caller needs to print or export a result:
//! the vector and points of an MTP; the pattern, sorted pattern indices,
//! translators, coverage and bounding box of a TEC.

use crate::compress::{Encoding, ForthGroup};
use crate::heuristics::compression_ratio;
use crate::mtp::Mtp;
use crate::point::Point;
use crate::tec::Tec;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MtpReport {
    pub vector: Point,
    pub points: Vec<Point>,
}

impl From<&Mtp> for MtpReport {
    fn from(mtp: &Mtp) -> Self {
        Self {
            vector: mtp.vector.clone(),
            points: mtp.points.clone(),
        }
    }
}

impl fmt::Display for MtpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.vector)?;
        write_points(f, &self.points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TecReport {
    pub pattern: Vec<Point>,
    pub pattern_indices: Vec<usize>,
    pub translators: Vec<Point>,
    /// Sorted ascending.
    pub coverage: Vec<Point>,
    /// `[min, max]` of the pattern; absent for an empty pattern.
    pub bounding_box: Option<[Point; 2]>,
    pub compression_ratio: f64,
}

impl From<&Tec> for TecReport {
    fn from(tec: &Tec) -> Self {
        Self {
            pattern: tec.pattern().to_vec(),
            pattern_indices: tec.pattern_indices().to_vec(),
            translators: tec.translators().to_vec(),
            coverage: tec.coverage().iter().cloned().collect(),
            bounding_box: tec.bounding_box().map(|(min, max)| [min, max]),
            compression_ratio: compression_ratio(tec),
        }
    }
}

impl fmt::Display for TecReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_points(f, &self.pattern)?;
        write!(f, ", ")?;
        write_points(f, &self.translators)?;
        write!(
            f,
            "  [cr {:.3}, covers {}]",
            self.compression_ratio,
            self.coverage.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingReport {
    pub dataset_size: usize,
    pub tecs: Vec<TecReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forth_groups: Vec<ForthGroup>,
    pub residual: Vec<Point>,
    pub encoding_length: usize,
    pub compression_factor: f64,
}

impl EncodingReport {
    pub fn new(encoding: &Encoding, dataset_size: usize) -> Self {
        Self {
            dataset_size,
            tecs: encoding.tecs.iter().map(TecReport::from).collect(),
            forth_groups: encoding.forth_groups.clone(),
            residual: encoding.residual.clone(),
            encoding_length: encoding.encoding_length(),
            compression_factor: encoding.compression_factor(dataset_size),
        }
    }
}

impl fmt::Display for EncodingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.forth_groups.is_empty() {
            for tec in &self.tecs {
                writeln!(f, "{}", tec)?;
            }
        } else {
            for (n, group) in self.forth_groups.iter().enumerate() {
                writeln!(f, "primary {}: {}", n + 1, self.tecs[group.primary])?;
                for &secondary in &group.secondaries {
                    writeln!(f, "    secondary: {}", self.tecs[secondary])?;
                }
            }
        }
        if !self.residual.is_empty() {
            write!(f, "residual: ")?;
            write_points(f, &self.residual)?;
            writeln!(f)?;
        }
        write!(
            f,
            "{} points, encoding length {}, compression factor {:.3}",
            self.dataset_size, self.encoding_length, self.compression_factor
        )
    }
}

fn write_points(f: &mut fmt::Formatter<'_>, points: &[Point]) -> fmt::Result {
    write!(f, "[")?;
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", point)?;
    }
    write!(f, "]")
}
