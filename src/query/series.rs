use crate::data::model::{Dataset, Record, RecordId};
use crate::expr::{self, ExprError};

use super::classify::ParameterSpec;

/// Why a row contributes nothing to a series. Never an error for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Skip {
    /// A referenced column is missing for the row.
    MissingInput { column: String },
    /// Malformed expression, unknown name, division by zero, domain error.
    EvaluationFailure(ExprError),
    /// The expression produced infinity or NaN.
    NonFinite,
    /// The parameter text was never recognized.
    Unrecognized,
}

pub type RowOutcome = Result<f64, Skip>;

/// Evaluate a classified parameter for one record.
pub fn evaluate(spec: &ParameterSpec, record: &Record<'_>) -> RowOutcome {
    match spec {
        ParameterSpec::ColumnRef(column) => record
            .value(column)
            .ok_or_else(|| Skip::MissingInput {
                column: column.clone(),
            }),
        ParameterSpec::Expression(derived) => {
            let mut bindings: Vec<(&str, f64)> = Vec::with_capacity(derived.columns().len());
            for column in derived.columns() {
                let value = record.value(column).ok_or_else(|| Skip::MissingInput {
                    column: column.clone(),
                })?;
                bindings.push((column.as_str(), value));
            }
            let tree = derived
                .tree()
                .map_err(|e| Skip::EvaluationFailure(e.clone()))?;
            expr::evaluate(tree, &bindings).map_err(|e| match e {
                ExprError::NonFinite => Skip::NonFinite,
                other => Skip::EvaluationFailure(other),
            })
        }
        ParameterSpec::Unrecognized(_) => Err(Skip::Unrecognized),
    }
}

/// Identity-tagged values of one parameter, in record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedSeries {
    points: Vec<(RecordId, f64)>,
    skipped: usize,
}

impl DerivedSeries {
    /// Series from already evaluated pairs; order is kept as given.
    pub fn from_points(points: Vec<(RecordId, f64)>) -> Self {
        DerivedSeries { points, skipped: 0 }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Rows that were evaluated but skipped.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn points(&self) -> &[(RecordId, f64)] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, f64)> + '_ {
        self.points.iter().copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.points.iter().map(|(id, _)| *id)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    /// Value carried for `id`, if the row survived.
    pub fn get(&self, id: RecordId) -> Option<f64> {
        self.points.iter().find(|(i, _)| *i == id).map(|(_, v)| *v)
    }
}

/// Evaluate `spec` for every record, keeping the rows that produce a value.
pub fn build(spec: &ParameterSpec, dataset: &Dataset) -> DerivedSeries {
    let mut points = Vec::with_capacity(dataset.len());
    let mut skipped = 0;
    let mut missing = 0;
    let mut failed = 0;

    for record in dataset.records() {
        match build_for_record(spec, &record) {
            Ok(value) => points.push((record.id(), value)),
            Err(skip) => {
                skipped += 1;
                match skip {
                    Skip::MissingInput { .. } => missing += 1,
                    Skip::EvaluationFailure(_) | Skip::NonFinite => failed += 1,
                    Skip::Unrecognized => {}
                }
            }
        }
    }

    log::debug!(
        "'{}': {} values, {skipped} skipped ({missing} missing input, {failed} failed)",
        spec.text(),
        points.len()
    );
    DerivedSeries { points, skipped }
}

/// Single-record variant of [`build`], for the selected-object views.
pub fn build_for_record(spec: &ParameterSpec, record: &Record<'_>) -> RowOutcome {
    evaluate(spec, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::data::model::{RawTable, RawValue};
    use crate::query::classify::classify;

    fn n(v: f64) -> RawValue {
        RawValue::Float(v)
    }

    /// Six rows so both columns pass the analyzable threshold.
    fn dataset() -> Dataset {
        let rows = vec![
            vec![n(2.0), n(3.0)],
            vec![n(5.0), RawValue::Null],
            vec![n(1.0), n(0.0)],
            vec![RawValue::Null, n(4.0)],
            vec![n(-8.0), n(2.0)],
            vec![n(9.0), n(1.0)],
        ];
        Dataset::load(
            RawTable {
                headers: vec!["a".into(), "b".into()],
                rows,
            },
            &SchemaConfig::default(),
        )
    }

    fn spec(ds: &Dataset, text: &str) -> ParameterSpec {
        classify(text, ds.analyzable_columns()).expect("non-empty")
    }

    #[test]
    fn column_ref_returns_cleaned_values_only() {
        let ds = dataset();
        let series = build(&spec(&ds, "a"), &ds);
        assert_eq!(
            series.points(),
            &[
                (RecordId(0), 2.0),
                (RecordId(1), 5.0),
                (RecordId(2), 1.0),
                (RecordId(4), -8.0),
                (RecordId(5), 9.0)
            ]
        );
        assert_eq!(series.skipped(), 1);
    }

    #[test]
    fn expression_skips_rows_with_missing_inputs() {
        let ds = dataset();
        let series = build(&spec(&ds, "a+b"), &ds);
        assert_eq!(series.get(RecordId(0)), Some(5.0));
        assert_eq!(series.get(RecordId(1)), None);
        assert_eq!(series.get(RecordId(3)), None);
        assert_eq!(
            series.ids().collect::<Vec<_>>(),
            vec![RecordId(0), RecordId(2), RecordId(4), RecordId(5)]
        );
    }

    #[test]
    fn division_by_zero_skips_the_row() {
        let ds = dataset();
        let s = spec(&ds, "a/b");
        let record = ds.record(RecordId(2)).expect("row 2");
        assert!(matches!(
            build_for_record(&s, &record),
            Err(Skip::EvaluationFailure(ExprError::DivisionByZero))
        ));
        let series = build(&s, &ds);
        assert_eq!(series.get(RecordId(2)), None);
        assert_eq!(series.get(RecordId(4)), Some(-4.0));

        let by_zero = spec(&ds, "a/0");
        assert!(build(&by_zero, &ds).is_empty());
    }

    #[test]
    fn domain_and_non_finite_results_skip() {
        let ds = dataset();
        let series = build(&spec(&ds, "log10(a) + 0"), &ds);
        // a = -8 is outside the log domain
        assert_eq!(series.get(RecordId(4)), None);
        assert_eq!(series.get(RecordId(2)), Some(0.0));

        let huge = build(&spec(&ds, "exp(a * 1000)"), &ds);
        assert_eq!(huge.ids().collect::<Vec<_>>(), vec![RecordId(4)]);
    }

    #[test]
    fn unrecognized_always_skips() {
        let ds = dataset();
        let s = spec(&ds, "velocity");
        let record = ds.record(RecordId(0)).expect("row 0");
        assert_eq!(build_for_record(&s, &record), Err(Skip::Unrecognized));
        assert!(build(&s, &ds).is_empty());
    }

    #[test]
    fn single_record_matches_bulk() {
        let ds = dataset();
        let s = spec(&ds, "(a - b) * 2");
        let bulk = build(&s, &ds);
        for record in ds.records() {
            assert_eq!(build_for_record(&s, &record).ok(), bulk.get(record.id()));
        }
    }
}
