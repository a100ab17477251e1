use std::collections::HashMap;
use std::fmt;

use crate::config::PolicyConfig;
use crate::data::model::RecordId;
use crate::error::{QueryError, Result};
use crate::query::series::DerivedSeries;

use super::lookup::PlottedPoint;
use super::stats::MIN_CORRELATION_PAIRS;

/// The analyses that carry a minimum sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    Scatter,
    Histogram1D,
    Histogram2D,
    Histogram3D,
    Distribution,
    Statistics,
    Correlation,
}

impl Analysis {
    pub fn min_samples(self, policy: &PolicyConfig) -> usize {
        match self {
            Analysis::Statistics => 1,
            Analysis::Correlation => MIN_CORRELATION_PAIRS,
            Analysis::Scatter => policy.min_scatter,
            Analysis::Histogram2D => policy.min_histogram_2d,
            Analysis::Histogram3D => policy.min_histogram_3d,
            Analysis::Histogram1D | Analysis::Distribution => policy.min_histogram_1d,
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Analysis::Scatter => "scatter plot",
            Analysis::Histogram1D => "histogram",
            Analysis::Histogram2D => "2D histogram",
            Analysis::Histogram3D => "3D histogram",
            Analysis::Distribution => "distribution",
            Analysis::Statistics => "statistics",
            Analysis::Correlation => "correlation",
        })
    }
}

/// Paired values of two series over the identities they share.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointSample {
    pub ids: Vec<RecordId>,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl JointSample {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(id, x, y)` triples in joint order.
    pub fn triples(&self) -> impl Iterator<Item = (RecordId, f64, f64)> + '_ {
        self.ids
            .iter()
            .zip(self.xs.iter().zip(&self.ys))
            .map(|(id, (x, y))| (*id, *x, *y))
    }

    pub fn points(&self) -> Vec<PlottedPoint> {
        self.triples()
            .map(|(id, x, y)| PlottedPoint { id, x, y })
            .collect()
    }

    /// The pair for one identity, if both axes have a value for it.
    pub fn get(&self, id: RecordId) -> Option<(f64, f64)> {
        self.ids
            .iter()
            .position(|i| *i == id)
            .map(|i| (self.xs[i], self.ys[i]))
    }
}

/// Intersect two series by identity. Each axis keeps its own value; the
/// order follows `x`.
pub fn align(x: &DerivedSeries, y: &DerivedSeries) -> JointSample {
    let y_by_id: HashMap<RecordId, f64> = y.iter().collect();
    let mut joint = JointSample {
        ids: Vec::with_capacity(x.len().min(y.len())),
        xs: Vec::with_capacity(x.len().min(y.len())),
        ys: Vec::with_capacity(x.len().min(y.len())),
    };
    for (id, xv) in x.iter() {
        if let Some(yv) = y_by_id.get(&id) {
            joint.ids.push(id);
            joint.xs.push(xv);
            joint.ys.push(*yv);
        }
    }
    joint
}

/// [`align`], failing with the observed counts when the joint sample is
/// smaller than the minimum for `analysis`.
pub fn align_for(
    analysis: Analysis,
    x: &DerivedSeries,
    y: &DerivedSeries,
    policy: &PolicyConfig,
) -> Result<JointSample> {
    let joint = align(x, y);
    let required = analysis.min_samples(policy);
    if joint.len() < required {
        return Err(QueryError::InsufficientData {
            analysis,
            x_count: x.len(),
            y_count: y.len(),
            joint: joint.len(),
            required,
        });
    }
    Ok(joint)
}

/// Fail with [`QueryError::TooFewValues`] unless `count` reaches the minimum.
pub fn require_values(analysis: Analysis, count: usize, policy: &PolicyConfig) -> Result<()> {
    let required = analysis.min_samples(policy);
    if count < required {
        return Err(QueryError::TooFewValues {
            analysis,
            count,
            required,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(usize, f64)]) -> DerivedSeries {
        DerivedSeries::from_points(points.iter().map(|(i, v)| (RecordId(*i), *v)).collect())
    }

    #[test]
    fn intersection_keeps_each_axis_value() {
        let x = series(&[(1, 10.0), (2, 20.0), (5, 50.0)]);
        let y = series(&[(2, -2.0), (5, -5.0), (9, -9.0)]);
        let joint = align(&x, &y);
        assert_eq!(joint.ids, vec![RecordId(2), RecordId(5)]);
        assert_eq!(joint.xs, vec![20.0, 50.0]);
        assert_eq!(joint.ys, vec![-2.0, -5.0]);
        assert_eq!(joint.get(RecordId(5)), Some((50.0, -5.0)));
        assert_eq!(joint.get(RecordId(1)), None);
    }

    #[test]
    fn disjoint_series_give_empty_sample() {
        let joint = align(&series(&[(0, 1.0)]), &series(&[(1, 1.0)]));
        assert!(joint.is_empty());
    }

    #[test]
    fn insufficient_joint_reports_counts() {
        let x = series(&[(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0), (4, 5.0), (5, 6.0)]);
        let y = series(&[(3, 1.0), (4, 1.0), (5, 1.0), (6, 1.0)]);
        let err = align_for(Analysis::Scatter, &x, &y, &PolicyConfig::default()).unwrap_err();
        assert_eq!(
            err,
            QueryError::InsufficientData {
                analysis: Analysis::Scatter,
                x_count: 6,
                y_count: 4,
                joint: 3,
                required: 5,
            }
        );
    }

    #[test]
    fn thresholds_follow_policy() {
        let policy = PolicyConfig::default();
        assert_eq!(Analysis::Scatter.min_samples(&policy), 5);
        assert_eq!(Analysis::Histogram2D.min_samples(&policy), 10);
        assert_eq!(Analysis::Histogram3D.min_samples(&policy), 20);

        let points: Vec<(usize, f64)> = (0..10).map(|i| (i, i as f64)).collect();
        let s = series(&points);
        assert!(align_for(Analysis::Histogram2D, &s, &s, &policy).is_ok());
        assert!(align_for(Analysis::Histogram3D, &s, &s, &policy).is_err());
    }
}
