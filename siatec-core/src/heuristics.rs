//! Quality heuristics for ranking TECs.
//!
//! All heuristics are pure functions of a TEC and the sorted dataset it was
//! found in. Divisions that would be by zero yield `0.0`.

use crate::point::Point;
use crate::point_set::PointSet;
use crate::tec::Tec;
use std::cmp::Ordering;

/// Coverage size over encoding cost. `0.0` when the cost is zero.
pub fn compression_ratio(tec: &Tec) -> f64 {
    match tec.encoding_cost() {
        0 => 0.0,
        cost => tec.coverage().len() as f64 / cost as f64,
    }
}

/// Fraction of the dataset points inside the pattern's bounding box that
/// belong to the pattern.
///
/// Candidates are taken from the index range spanned by the pattern,
/// extended past its ends while neighbouring points stay within the box's
/// lexicographic limits. A single-point pattern scores `1.0`.
pub fn bounding_box_compactness(tec: &Tec, points: &PointSet) -> f64 {
    let size = tec.pattern_indices().len();
    if size == 1 {
        return 1.0;
    }
    let (Some(&first), Some(&last), Some((min, max))) = (
        tec.pattern_indices().first(),
        tec.pattern_indices().last(),
        tec.bounding_box(),
    ) else {
        return 0.0;
    };

    let data = points.as_slice();
    let mut end = last.min(data.len());
    while end < data.len() && data[end] <= max {
        end += 1;
    }
    let mut begin = first.min(end);
    while begin > 0 && data[begin] >= min {
        begin -= 1;
    }

    let in_box = data[begin..end]
        .iter()
        .filter(|p| p.is_within(&min, &max))
        .count();

    if in_box == 0 {
        0.0
    } else {
        size as f64 / in_box as f64
    }
}

/// First and last positions of a sorted pattern inside `points`.
///
/// Returns `None` if either end point is absent.
pub fn find_pattern_span(pattern: &[Point], points: &PointSet) -> Option<(usize, usize)> {
    let data = points.as_slice();
    let locate = |target: &Point| {
        let at = data.partition_point(|p| p < target);
        (at < data.len() && &data[at] == target).then_some(at)
    };
    Some((locate(pattern.first()?)?, locate(pattern.last()?)?))
}

/// Pattern size over the number of dataset points between its first and
/// last position inclusive (Collins 2011, eq. 7.3).
pub fn compactness(begin: usize, end: usize, pattern_size: usize) -> f64 {
    if end < begin {
        return 0.0;
    }
    pattern_size as f64 / (end - begin + 1) as f64
}

/// Extent of the pattern along the first (onset) axis.
pub fn pattern_width(tec: &Tec) -> f64 {
    tec.bounding_box()
        .map_or(0.0, |(min, max)| max.component(0) - min.component(0))
}

/// Product of the bounding box extents.
pub fn pattern_volume(tec: &Tec) -> f64 {
    tec.bounding_box().map_or(0.0, |(min, max)| {
        min.components()
            .iter()
            .zip(max.components())
            .map(|(lo, hi)| hi - lo)
            .product()
    })
}

/// Highest compactness of any occurrence of the pattern (the pattern itself
/// included).
pub fn max_occurrence_compactness(tec: &Tec, points: &PointSet) -> f64 {
    let Some(p0) = tec.pattern().first() else {
        return 0.0;
    };
    let zero = Point::zero(p0.dimensionality());
    let size = tec.pattern().len();

    std::iter::once(&zero)
        .chain(tec.translators().iter().filter(|t| !t.is_zero()))
        .map(|translator| {
            let occurrence: Vec<Point> = tec.pattern().iter().map(|p| p + translator).collect();
            find_pattern_span(&occurrence, points)
                .map_or(0.0, |(begin, end)| compactness(begin, end, size))
        })
        .fold(0.0, f64::max)
}

// =============================================================================
// RANKING
// =============================================================================

/// The six ranking keys of a TEC, measured once.
///
/// Ordered so that the better TEC compares `Less`, letting an ascending sort
/// produce a best-first sequence. Keys are compared in turn, and the first
/// strict difference decides:
///
/// 1. higher compression ratio
/// 2. higher bounding-box compactness
/// 3. larger coverage
/// 4. larger pattern
/// 5. smaller width
/// 6. smaller volume
#[derive(Debug, Clone, Copy)]
pub struct TecQuality {
    pub compression_ratio: f64,
    pub compactness: f64,
    pub coverage: usize,
    pub pattern_size: usize,
    pub width: f64,
    pub volume: f64,
}

impl TecQuality {
    pub fn measure(tec: &Tec, points: &PointSet) -> Self {
        Self {
            compression_ratio: compression_ratio(tec),
            compactness: bounding_box_compactness(tec, points),
            coverage: tec.coverage().len(),
            pattern_size: tec.pattern().len(),
            width: pattern_width(tec),
            volume: pattern_volume(tec),
        }
    }
}

impl Ord for TecQuality {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .compression_ratio
            .total_cmp(&self.compression_ratio)
            .then_with(|| other.compactness.total_cmp(&self.compactness))
            .then_with(|| other.coverage.cmp(&self.coverage))
            .then_with(|| other.pattern_size.cmp(&self.pattern_size))
            .then_with(|| self.width.total_cmp(&other.width))
            .then_with(|| self.volume.total_cmp(&other.volume))
    }
}

impl PartialOrd for TecQuality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TecQuality {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TecQuality {}

/// Whether `a` is strictly preferred over `b`. Ties keep `b`.
///
/// Measures both TECs on every call, and compactness scans `points`. To
/// rank many TECs, measure each once with [`TecQuality::measure`] and
/// compare the results, as [`sort_by_quality`] does.
pub fn is_better(a: &Tec, b: &Tec, points: &PointSet) -> bool {
    TecQuality::measure(a, points) < TecQuality::measure(b, points)
}

/// Sort best-first. Equal-quality TECs keep their relative order.
pub fn sort_by_quality(tecs: &mut [Tec], points: &PointSet) {
    tecs.sort_by_cached_key(|tec| TecQuality::measure(tec, points));
}
