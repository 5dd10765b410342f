//! Loading point sets from CSV.
//!
//! Input is header-less: one point per row, one numeric component per
//! field. The first usable row fixes the dimensionality; rows that disagree
//! with it, or that hold a field that is not a finite number, are handled
//! according to [`MalformedRowPolicy`]. Blank lines are ignored.

use crate::config::{LoaderConfig, MalformedRowPolicy};
use crate::error::{Result, SiatecError};
use crate::point::Point;
use crate::point_set::PointSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Read a point set from any CSV source.
pub fn read_points(reader: impl Read, config: &LoaderConfig) -> Result<PointSet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut points = Vec::new();
    let mut dimensionality: Option<usize> = None;
    let mut skipped = 0usize;

    for (idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| SiatecError::Io(e.to_string()))?;
        let line = record.position().map_or(idx + 1, |pos| pos.line() as usize);

        if record.iter().all(str::is_empty) {
            continue;
        }

        match parse_row(&record, dimensionality) {
            Ok(point) => {
                dimensionality.get_or_insert(point.dimensionality());
                points.push(point);
            }
            Err(reason) => match config.on_malformed {
                MalformedRowPolicy::Reject => {
                    return Err(SiatecError::MalformedInput { line, reason });
                }
                MalformedRowPolicy::Skip => {
                    warn!(line, %reason, "skipping malformed row");
                    skipped += 1;
                }
            },
        }
    }

    debug!(points = points.len(), skipped, "loaded point set");
    PointSet::new(points)
}

/// Read a point set from a CSV file.
pub fn load_csv(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<PointSet> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| SiatecError::Io(format!("{}: {}", path.display(), e)))?;
    read_points(file, config)
}

fn parse_row(
    record: &csv::StringRecord,
    dimensionality: Option<usize>,
) -> std::result::Result<Point, String> {
    if let Some(expected) = dimensionality {
        if record.len() != expected {
            return Err(format!(
                "expected {} components, found {}",
                expected,
                record.len()
            ));
        }
    }

    let mut components = Vec::with_capacity(record.len());
    for (column, field) in record.iter().enumerate() {
        let value: f64 = field
            .parse()
            .map_err(|_| format!("column {}: '{}' is not a number", column + 1, field))?;
        if !value.is_finite() {
            return Err(format!("column {}: '{}' is not finite", column + 1, field));
        }
        components.push(value);
    }

    Ok(Point::new(components))
}
