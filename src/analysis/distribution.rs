use crate::config::PolicyConfig;
use crate::error::{QueryError, Result};
use crate::query::series::DerivedSeries;

use super::align::{require_values, Analysis};
use super::histogram::{Histogram1D, ValueRange};
use super::stats::Summary;

/// Counted histogram plus empirical cumulative distribution of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub histogram: Histogram1D,
    /// `(value, share of values ≤ value)`, sorted by value.
    pub cumulative: Vec<(f64, f64)>,
    pub summary: Summary,
    pub bins: usize,
    /// The display range the values were filtered to, if any.
    pub range: Option<ValueRange>,
}

/// Bin count for a display range narrower than the data: scaled up by the
/// narrowing ratio and capped at `max_bins`.
pub fn scaled_bins(base: usize, max_bins: usize, full: ValueRange, shown: ValueRange) -> usize {
    let ratio = full.span() / shown.span();
    if ratio.is_finite() && ratio > 1.0 {
        ((base as f64 * ratio) as usize).min(max_bins)
    } else {
        base
    }
}

/// Build a distribution. With a display range only values inside it take
/// part, and the histogram spans what remains.
pub fn distribution(
    series: &DerivedSeries,
    base_bins: usize,
    max_bins: usize,
    range: Option<ValueRange>,
    policy: &PolicyConfig,
) -> Result<Distribution> {
    require_values(Analysis::Distribution, series.len(), policy)?;

    let (shown, bins) = match range {
        Some(r) => {
            let filtered = DerivedSeries::from_points(
                series.iter().filter(|(_, v)| r.contains(*v)).collect(),
            );
            require_values(Analysis::Distribution, filtered.len(), policy)?;
            let full = ValueRange::of(series.values());
            (filtered, scaled_bins(base_bins, max_bins, full, r))
        }
        None => (series.clone(), base_bins),
    };

    let histogram = Histogram1D::build(&shown, bins, None)?;
    let values = shown.values();
    let summary = Summary::of(&values).ok_or(QueryError::TooFewValues {
        analysis: Analysis::Distribution,
        count: 0,
        required: Analysis::Distribution.min_samples(policy),
    })?;

    log::debug!(
        "distribution: {} of {} values in {bins} bins",
        shown.len(),
        series.len()
    );
    Ok(Distribution {
        histogram,
        cumulative: cumulative(&values),
        summary,
        bins,
        range,
    })
}

/// Empirical cumulative distribution: the i-th smallest value maps to i / n.
pub fn cumulative(values: &[f64]) -> Vec<(f64, f64)> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, (i + 1) as f64 / n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RecordId;

    fn series(values: &[f64]) -> DerivedSeries {
        DerivedSeries::from_points(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (RecordId(i), *v))
                .collect(),
        )
    }

    #[test]
    fn full_range_uses_base_bins() {
        let s = series(&(0..100).map(f64::from).collect::<Vec<_>>());
        let d = distribution(&s, 20, 200, None, &PolicyConfig::default()).unwrap();
        assert_eq!(d.bins, 20);
        assert_eq!(d.histogram.counts().len(), 20);
        assert_eq!(d.histogram.total(), 100);
        assert_eq!(d.cumulative.last(), Some(&(99.0, 1.0)));
        assert_eq!(d.summary.count, 100);
    }

    #[test]
    fn narrowed_range_filters_and_scales_bins() {
        let s = series(&(0..100).map(f64::from).collect::<Vec<_>>());
        let range = ValueRange::new(0.0, 33.0).unwrap();
        let d = distribution(&s, 20, 200, Some(range), &PolicyConfig::default()).unwrap();
        // 99 / 33 = 3
        assert_eq!(d.bins, 60);
        assert_eq!(d.summary.count, 34);
        assert_eq!(d.summary.max, 33.0);
    }

    #[test]
    fn scaled_bins_are_capped() {
        let full = ValueRange::new(0.0, 1000.0).unwrap();
        let shown = ValueRange::new(0.0, 1.0).unwrap();
        assert_eq!(scaled_bins(20, 200, full, shown), 200);
        assert_eq!(scaled_bins(20, 200, shown, full), 20);
    }

    #[test]
    fn too_few_values_after_filtering() {
        let s = series(&[1.0, 2.0, 3.0, 50.0, 60.0, 70.0]);
        let range = ValueRange::new(0.0, 10.0).unwrap();
        let err = distribution(&s, 20, 200, Some(range), &PolicyConfig::default()).unwrap_err();
        assert_eq!(
            err,
            QueryError::TooFewValues {
                analysis: Analysis::Distribution,
                count: 3,
                required: 5
            }
        );
    }

    #[test]
    fn cumulative_shares() {
        assert_eq!(
            cumulative(&[3.0, 1.0, 2.0, 4.0]),
            vec![(1.0, 0.25), (2.0, 0.5), (3.0, 0.75), (4.0, 1.0)]
        );
    }
}
