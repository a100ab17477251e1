use crate::data::model::RecordId;

use super::histogram::{Histogram1D, Histogram2D};

/// A plotted value with the identity it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlottedPoint {
    pub id: RecordId,
    pub x: f64,
    pub y: f64,
}

/// The range an axis is currently displayed over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        AxisRange { min, max }
    }

    pub fn span(&self) -> f64 {
        (self.max - self.min).abs()
    }
}

/// Identity of the point closest to a click, in data coordinates.
///
/// The closest point is accepted only when its distance is below
/// `tolerance × max(x span, y span)`.
pub fn nearest_point(
    points: &[PlottedPoint],
    click_x: f64,
    click_y: f64,
    x_axis: AxisRange,
    y_axis: AxisRange,
    tolerance: f64,
) -> Option<RecordId> {
    if !click_x.is_finite() || !click_y.is_finite() {
        return None;
    }
    let limit = tolerance * x_axis.span().max(y_axis.span());

    let (best, distance) = points
        .iter()
        .map(|p| (p, (p.x - click_x).hypot(p.y - click_y)))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    (distance < limit).then_some(best.id)
}

/// Identities in the 2D cell under a click.
pub fn bin_membership(histogram: &Histogram2D, click_x: f64, click_y: f64) -> Vec<RecordId> {
    histogram.members_at(click_x, click_y)
}

/// Identities in the 1D bin under a click.
pub fn bin_membership_1d(histogram: &Histogram1D, click_x: f64) -> Vec<RecordId> {
    histogram.members_at(click_x)
}
