use crate::data::model::RecordId;
use crate::error::{QueryError, Result};
use crate::query::series::DerivedSeries;

use super::align::JointSample;

/// A closed numeric interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub low: f64,
    pub high: f64,
}

impl ValueRange {
    /// A user-supplied range. Both ends must be finite and `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(QueryError::InvalidRange { low, high });
        }
        Ok(ValueRange { low, high })
    }

    /// The span of `values`. A single repeated value is widened by 0.5 on
    /// each side; no values gives `[0, 1]`.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let mut bounds: Option<(f64, f64)> = None;
        for v in values {
            bounds = Some(match bounds {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        match bounds {
            None => ValueRange { low: 0.0, high: 1.0 },
            Some((lo, hi)) if lo == hi => ValueRange {
                low: lo - 0.5,
                high: hi + 0.5,
            },
            Some((lo, hi)) => ValueRange { low: lo, high: hi },
        }
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// `count` equal-width bins over a range.
///
/// Bins are half-open `[low, high)` except the last, which also takes the
/// upper edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinEdges {
    range: ValueRange,
    count: usize,
}

impl BinEdges {
    pub fn uniform(range: ValueRange, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(QueryError::InvalidBinCount);
        }
        Ok(BinEdges { range, count })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn width(&self) -> f64 {
        self.range.span() / self.count as f64
    }

    /// Left edge of bin `i`; `edge(count)` is the upper bound.
    pub fn edge(&self, i: usize) -> f64 {
        if i >= self.count {
            return self.range.high;
        }
        self.range.low + self.range.span() * i as f64 / self.count as f64
    }

    /// All `count + 1` edges.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.count).map(|i| self.edge(i)).collect()
    }

    /// `(low, high)` of bin `i`.
    pub fn bounds(&self, i: usize) -> (f64, f64) {
        (self.edge(i), self.edge(i + 1))
    }

    pub fn center(&self, i: usize) -> f64 {
        let (lo, hi) = self.bounds(i);
        (lo + hi) / 2.0
    }

    /// Bin containing `value`, `None` outside the range.
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if !self.range.contains(value) {
            return None;
        }
        let last = self.count - 1;
        if value == self.range.high {
            return Some(last);
        }
        let guess = ((value - self.range.low) / self.range.span() * self.count as f64).floor();
        let mut bin = (guess.max(0.0) as usize).min(last);
        // settle rounding at the edges against the edges themselves
        if value < self.edge(bin) && bin > 0 {
            bin -= 1;
        } else if bin < last && value >= self.edge(bin + 1) {
            bin += 1;
        }
        Some(bin)
    }
}

/// One-dimensional histogram that keeps the identity of every counted value.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    edges: BinEdges,
    counts: Vec<usize>,
    samples: Vec<(RecordId, f64)>,
}

impl Histogram1D {
    /// Bin a series. Without a range the data span is used; values outside
    /// an explicit range are not counted.
    pub fn build(series: &DerivedSeries, bins: usize, range: Option<ValueRange>) -> Result<Self> {
        let range = range.unwrap_or_else(|| ValueRange::of(series.iter().map(|(_, v)| v)));
        let edges = BinEdges::uniform(range, bins)?;
        let mut counts = vec![0; bins];
        let mut samples = Vec::with_capacity(series.len());
        for (id, value) in series.iter() {
            if let Some(bin) = edges.bin_of(value) {
                counts[bin] += 1;
                samples.push((id, value));
            }
        }
        Ok(Histogram1D {
            edges,
            counts,
            samples,
        })
    }

    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of values that fell inside the range.
    pub fn total(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[(RecordId, f64)] {
        &self.samples
    }

    /// Bar heights normalised so the bars integrate to 1 over the range.
    /// All zero when nothing was counted.
    pub fn densities(&self) -> Vec<f64> {
        let scale = self.total() as f64 * self.edges.width();
        self.counts
            .iter()
            .map(|&c| if scale > 0.0 { c as f64 / scale } else { 0.0 })
            .collect()
    }

    pub fn bin_at(&self, x: f64) -> Option<usize> {
        self.edges.bin_of(x)
    }

    /// Identities in bin `i`, recomputed from the retained samples.
    pub fn members(&self, bin: usize) -> Vec<RecordId> {
        self.samples
            .iter()
            .filter(|(_, v)| self.edges.bin_of(*v) == Some(bin))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Identities in the bin under `x`; empty outside all bins.
    pub fn members_at(&self, x: f64) -> Vec<RecordId> {
        self.bin_at(x).map(|b| self.members(b)).unwrap_or_default()
    }
}

/// Two-dimensional histogram over a joint sample. Cells are indexed
/// `[x_bin][y_bin]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    x_edges: BinEdges,
    y_edges: BinEdges,
    counts: Vec<Vec<usize>>,
    samples: Vec<(RecordId, f64, f64)>,
}

impl Histogram2D {
    pub fn build(
        joint: &JointSample,
        bins: usize,
        x_range: Option<ValueRange>,
        y_range: Option<ValueRange>,
    ) -> Result<Self> {
        let x_range = x_range.unwrap_or_else(|| ValueRange::of(joint.xs.iter().copied()));
        let y_range = y_range.unwrap_or_else(|| ValueRange::of(joint.ys.iter().copied()));
        let x_edges = BinEdges::uniform(x_range, bins)?;
        let y_edges = BinEdges::uniform(y_range, bins)?;

        let mut counts = vec![vec![0; bins]; bins];
        let mut samples = Vec::with_capacity(joint.len());
        for (id, x, y) in joint.triples() {
            if let (Some(ix), Some(iy)) = (x_edges.bin_of(x), y_edges.bin_of(y)) {
                counts[ix][iy] += 1;
                samples.push((id, x, y));
            }
        }
        Ok(Histogram2D {
            x_edges,
            y_edges,
            counts,
            samples,
        })
    }

    pub fn x_edges(&self) -> &BinEdges {
        &self.x_edges
    }

    pub fn y_edges(&self) -> &BinEdges {
        &self.y_edges
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn count(&self, ix: usize, iy: usize) -> usize {
        self.counts
            .get(ix)
            .and_then(|col| col.get(iy))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.samples.len()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn samples(&self) -> &[(RecordId, f64, f64)] {
        &self.samples
    }

    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        Some((self.x_edges.bin_of(x)?, self.y_edges.bin_of(y)?))
    }

    /// Identities in cell `(ix, iy)`, recomputed from the retained samples.
    pub fn members(&self, ix: usize, iy: usize) -> Vec<RecordId> {
        self.samples
            .iter()
            .filter(|(_, x, y)| self.cell_at(*x, *y) == Some((ix, iy)))
            .map(|(id, _, _)| *id)
            .collect()
    }

    pub fn members_at(&self, x: f64, y: f64) -> Vec<RecordId> {
        self.cell_at(x, y)
            .map(|(ix, iy)| self.members(ix, iy))
            .unwrap_or_default()
    }

    /// Bar heights per cell, raw counts or `log10(count + 1)`.
    pub fn heights(&self, log_scale: bool) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|col| {
                col.iter()
                    .map(|&c| {
                        if log_scale {
                            (c as f64 + 1.0).log10()
                        } else {
                            c as f64
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
