//! Identity-preserving queries over a loaded catalog.
//!
//! ```text
//!  parameter text ──► classify ──► ParameterSpec
//!                                       │
//!                     Dataset ──► series::build ──► DerivedSeries
//!                                       │
//!               QueryContext ──► Catalog::{scatter, histogram, ...}
//!                                       │
//!                                       ▼
//!                    plot structures carrying RecordIds
//! ```
//!
//! Every operation takes an explicit [`QueryContext`] and returns either a
//! result or a typed [`QueryError`]. Rows that cannot be evaluated are dropped
//! silently along the way.

pub mod classify;
pub mod context;
pub mod series;

use std::path::Path;

use crate::analysis::align::{align, align_for, require_values, Analysis, JointSample};
use crate::analysis::density;
use crate::analysis::distribution::{self, Distribution};
use crate::analysis::histogram::{Histogram1D, Histogram2D};
use crate::analysis::lookup::{self, AxisRange, PlottedPoint};
use crate::analysis::stats::{self, LinearFit, OverlayLine, Summary};
use crate::config::{ExplorerConfig, NamingConfig};
use crate::data::identity::{resolve_designator, DisplayNames};
use crate::data::loader::load_file;
use crate::data::model::{Dataset, RawTable, RecordId};
use crate::describe::describe;
use crate::error::{QueryError, Result};

pub use classify::{classify, DerivedExpression, ParameterSpec};
pub use context::QueryContext;
pub use series::{DerivedSeries, RowOutcome, Skip};

// ---------------------------------------------------------------------------
// Result structures
// ---------------------------------------------------------------------------

/// A resolved object, ready for highlighting and image lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedObject {
    pub id: RecordId,
    pub name: String,
    /// Secondary catalog number, when the record has one.
    pub secondary_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    pub x_label: String,
    pub y_label: String,
    pub joint: JointSample,
    pub trend: Option<LinearFit>,
    pub x_overlays: Vec<OverlayLine>,
    pub y_overlays: Vec<OverlayLine>,
}

impl ScatterPlot {
    pub fn points(&self) -> Vec<PlottedPoint> {
        self.joint.points()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPlot {
    pub label: String,
    pub histogram: Histogram1D,
    /// Bar heights normalised to unit area.
    pub densities: Vec<f64>,
    /// Gaussian KDE over `[min, max]` of the values; absent for five values
    /// or fewer.
    pub density_curve: Option<Vec<(f64, f64)>>,
    pub summary: Summary,
    pub overlays: Vec<OverlayLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BivariatePlot {
    pub x_label: String,
    pub y_label: String,
    pub histogram: Histogram2D,
    /// Per-cell bar heights, filled only for the 3D variant.
    pub heights: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionPlot {
    pub label: String,
    pub distribution: Distribution,
    pub overlays: Vec<OverlayLine>,
}

/// Joint statistics of two parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub x: Summary,
    pub y: Summary,
    pub fit: LinearFit,
}

/// Where one object sits within the population of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProfile {
    pub object: PickedObject,
    pub parameter: String,
    pub value: f64,
    /// Share of records with a strictly smaller value, in percent.
    pub percentile: f64,
    pub population: Summary,
    /// Deviation from the population mean in standard deviations.
    pub z_score: f64,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A loaded dataset together with its display names. Immutable; a reload
/// builds a new one.
#[derive(Debug, Clone)]
pub struct Catalog {
    dataset: Dataset,
    names: DisplayNames,
    naming: NamingConfig,
}

impl Catalog {
    pub fn new(dataset: Dataset, naming: &NamingConfig) -> Self {
        let names = DisplayNames::build(&dataset, naming);
        log::info!(
            "catalog ready: {} records, {} analyzable parameters",
            dataset.len(),
            dataset.analyzable_columns().len()
        );
        Catalog {
            dataset,
            names,
            naming: naming.clone(),
        }
    }

    pub fn from_table(table: RawTable, config: &ExplorerConfig) -> Self {
        Self::new(Dataset::load(table, &config.schema), &config.naming)
    }

    /// Load a catalog file. A file that parses but has no analyzable column
    /// still gives a valid, if empty, parameter list.
    pub fn open(path: &Path, config: &ExplorerConfig) -> anyhow::Result<Self> {
        let table = load_file(path, &config.loader)?;
        Ok(Self::from_table(table, config))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn names(&self) -> &DisplayNames {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Column names offered as parameters.
    pub fn parameters(&self) -> &[String] {
        self.dataset.analyzable_columns()
    }

    pub fn classify(&self, text: &str) -> Result<ParameterSpec> {
        classify(text, self.parameters())
    }

    /// Classify and reject unrecognized text.
    pub fn parameter(&self, text: &str) -> Result<ParameterSpec> {
        let spec = self.classify(text)?;
        if let ParameterSpec::Unrecognized(text) = spec {
            return Err(QueryError::UnrecognizedParameter(text));
        }
        Ok(spec)
    }

    /// Label for parameter text; unknown text is labelled, not rejected.
    pub fn label(&self, text: &str) -> String {
        match self.classify(text) {
            Ok(spec) => describe(&spec),
            Err(_) => String::new(),
        }
    }

    pub fn series(&self, text: &str) -> Result<DerivedSeries> {
        let spec = self.parameter(text)?;
        Ok(series::build(&spec, &self.dataset))
    }

    // ----- identity -----

    pub fn resolve(&self, designator: &str) -> Result<RecordId> {
        resolve_designator(&self.dataset, &self.names, &self.naming, designator)
    }

    pub fn search(&self, term: &str) -> Vec<&str> {
        self.names.search(term, self.naming.search_limit)
    }

    pub fn display_name(&self, id: RecordId) -> Option<&str> {
        self.names.get(id)
    }

    pub fn picked(&self, id: RecordId) -> Option<PickedObject> {
        Some(PickedObject {
            id,
            name: self.names.get(id)?.to_string(),
            secondary_id: self.dataset.secondary_integer(id),
        })
    }

    /// Display names of a set of identities, in the given order.
    pub fn names_of(&self, ids: &[RecordId]) -> Vec<&str> {
        ids.iter().filter_map(|id| self.names.get(*id)).collect()
    }

    // ----- single-record values -----

    /// Value of a parameter for one record, through the same path as the
    /// full-catalog series.
    pub fn value_for(&self, id: RecordId, text: &str) -> Result<RowOutcome> {
        let spec = self.parameter(text)?;
        let record = self
            .dataset
            .record(id)
            .ok_or_else(|| QueryError::IdentityNotFound(id.to_string()))?;
        Ok(series::build_for_record(&spec, &record))
    }

    /// The object's `(x, y)` point, if both parameters have a value for it.
    pub fn object_point(&self, id: RecordId, x: &str, y: &str) -> Result<Option<(f64, f64)>> {
        let xv = self.value_for(id, x)?;
        let yv = self.value_for(id, y)?;
        Ok(xv.ok().zip(yv.ok()))
    }

    pub fn object_profile(&self, id: RecordId, text: &str) -> Result<ObjectProfile> {
        let object = self
            .picked(id)
            .ok_or_else(|| QueryError::IdentityNotFound(id.to_string()))?;
        let value = self.value_for(id, text)?.map_err(|_| QueryError::NoValueForObject {
            object: object.name.clone(),
            parameter: text.trim().to_string(),
        })?;
        let all = self.series(text)?.values();
        let population = Summary::of(&all).ok_or(QueryError::TooFewValues {
            analysis: Analysis::Statistics,
            count: 0,
            required: 1,
        })?;
        Ok(ObjectProfile {
            percentile: stats::percentile_rank(&all, value),
            z_score: population.z_score(value),
            object,
            parameter: text.trim().to_string(),
            value,
            population,
        })
    }

    // ----- aggregate queries -----

    pub fn summary(&self, text: &str) -> Result<Summary> {
        let values = self.series(text)?.values();
        Summary::of(&values).ok_or(QueryError::TooFewValues {
            analysis: Analysis::Statistics,
            count: 0,
            required: 1,
        })
    }

    pub fn correlation(&self, x: &str, y: &str, ctx: &QueryContext) -> Result<Correlation> {
        let (xs, ys) = (self.series(x)?, self.series(y)?);
        let joint = align_for(Analysis::Correlation, &xs, &ys, &ctx.policy)?;
        let insufficient = || QueryError::InsufficientData {
            analysis: Analysis::Correlation,
            x_count: xs.len(),
            y_count: ys.len(),
            joint: joint.len(),
            required: Analysis::Correlation.min_samples(&ctx.policy),
        };
        Ok(Correlation {
            x: Summary::of(&joint.xs).ok_or_else(insufficient)?,
            y: Summary::of(&joint.ys).ok_or_else(insufficient)?,
            fit: LinearFit::fit(&joint.xs, &joint.ys).ok_or_else(insufficient)?,
        })
    }

    pub fn scatter(&self, x: &str, y: &str, ctx: &QueryContext) -> Result<ScatterPlot> {
        let (xs, ys) = (self.series(x)?, self.series(y)?);
        let joint = align_for(Analysis::Scatter, &xs, &ys, &ctx.policy)?;
        Ok(ScatterPlot {
            x_label: self.label(x),
            y_label: self.label(y),
            trend: LinearFit::fit(&joint.xs, &joint.ys),
            x_overlays: stats::overlay_lines(&joint.xs, &ctx.overlays),
            y_overlays: stats::overlay_lines(&joint.ys, &ctx.overlays),
            joint,
        })
    }

    pub fn histogram(&self, x: &str, ctx: &QueryContext) -> Result<HistogramPlot> {
        let xs = self.series(x)?;
        require_values(Analysis::Histogram1D, xs.len(), &ctx.policy)?;
        let histogram = Histogram1D::build(&xs, ctx.histogram_bins, ctx.x_range)?;
        let values = xs.values();
        let summary = Summary::of(&values).ok_or(QueryError::TooFewValues {
            analysis: Analysis::Histogram1D,
            count: 0,
            required: Analysis::Histogram1D.min_samples(&ctx.policy),
        })?;
        Ok(HistogramPlot {
            label: self.label(x),
            overlays: stats::overlay_lines(&values, &ctx.overlays),
            densities: histogram.densities(),
            density_curve: density::density_curve(&values),
            histogram,
            summary,
        })
    }

    pub fn histogram_2d(&self, x: &str, y: &str, ctx: &QueryContext) -> Result<BivariatePlot> {
        self.bivariate(Analysis::Histogram2D, x, y, ctx)
    }

    pub fn histogram_3d(&self, x: &str, y: &str, ctx: &QueryContext) -> Result<BivariatePlot> {
        self.bivariate(Analysis::Histogram3D, x, y, ctx)
    }

    fn bivariate(
        &self,
        analysis: Analysis,
        x: &str,
        y: &str,
        ctx: &QueryContext,
    ) -> Result<BivariatePlot> {
        let (xs, ys) = (self.series(x)?, self.series(y)?);
        let joint = align_for(analysis, &xs, &ys, &ctx.policy)?;
        let histogram = Histogram2D::build(&joint, ctx.bivariate_bins, ctx.x_range, ctx.y_range)?;
        let heights = (analysis == Analysis::Histogram3D).then(|| histogram.heights(ctx.log_scale));
        Ok(BivariatePlot {
            x_label: self.label(x),
            y_label: self.label(y),
            histogram,
            heights,
        })
    }

    pub fn distribution(&self, x: &str, ctx: &QueryContext) -> Result<DistributionPlot> {
        let xs = self.series(x)?;
        let distribution = distribution::distribution(
            &xs,
            ctx.distribution_bins,
            ctx.max_distribution_bins,
            ctx.x_range,
            &ctx.policy,
        )?;
        let shown: Vec<f64> = distribution.cumulative.iter().map(|(v, _)| *v).collect();
        Ok(DistributionPlot {
            label: self.label(x),
            overlays: stats::overlay_lines(&shown, &ctx.overlays),
            distribution,
        })
    }

    /// Joint sample of two parameters with no minimum size.
    pub fn joint(&self, x: &str, y: &str) -> Result<JointSample> {
        Ok(align(&self.series(x)?, &self.series(y)?))
    }

    // ----- reverse lookup -----

    /// Object under a click on a scatter plot.
    pub fn pick(
        &self,
        points: &[PlottedPoint],
        click: (f64, f64),
        axes: (AxisRange, AxisRange),
        ctx: &QueryContext,
    ) -> Option<PickedObject> {
        let id = lookup::nearest_point(
            points,
            click.0,
            click.1,
            axes.0,
            axes.1,
            ctx.policy.pick_tolerance,
        )?;
        self.picked(id)
    }

    /// Objects in the 2D histogram cell under a click.
    pub fn bin_objects(&self, histogram: &Histogram2D, x: f64, y: f64) -> Vec<PickedObject> {
        lookup::bin_membership(histogram, x, y)
            .into_iter()
            .filter_map(|id| self.picked(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::histogram::ValueRange;
    use crate::data::model::RawValue;

    fn s(text: &str) -> RawValue {
        RawValue::String(text.to_string())
    }

    fn f(v: f64) -> RawValue {
        RawValue::Float(v)
    }

    /// Twelve galaxies; `vrot` is missing for the last two.
    fn catalog() -> Catalog {
        let headers = ["objname", "pgc", "bt", "vt", "vrot"];
        let rows = (0..12)
            .map(|i| {
                let x = i as f64;
                vec![
                    if i == 3 { s("G") } else { s(&format!("NGC{}", 100 + i)) },
                    f(1000.0 + x),
                    f(10.0 + x),
                    f(9.0 + x * 0.5),
                    if i >= 10 { RawValue::Null } else { f(100.0 + 10.0 * x) },
                ]
            })
            .collect();
        Catalog::from_table(
            RawTable {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows,
            },
            &ExplorerConfig::default(),
        )
    }

    #[test]
    fn parameters_exclude_identity_columns() {
        let c = catalog();
        assert_eq!(c.parameters(), &["bt", "vt", "vrot"]);
        assert_eq!(c.display_name(RecordId(3)), Some("PGC1003"));
    }

    #[test]
    fn unrecognized_and_empty_text_are_errors() {
        let c = catalog();
        assert_eq!(c.series("  "), Err(QueryError::EmptyParameter));
        assert_eq!(
            c.series("velocity"),
            Err(QueryError::UnrecognizedParameter("velocity".into()))
        );
        assert_eq!(c.series("pgc"), Err(QueryError::UnrecognizedParameter("pgc".into())));
    }

    #[test]
    fn scatter_pairs_by_identity_and_fits_trend() {
        let c = catalog();
        let ctx = QueryContext::default();
        let plot = c.scatter("bt - vt", "vrot", &ctx).unwrap();
        assert_eq!(plot.joint.len(), 10);
        assert_eq!(plot.joint.get(RecordId(4)), Some((3.0, 140.0)));
        let trend = plot.trend.unwrap();
        assert!((trend.slope - 20.0).abs() < 1e-9);
        assert_eq!(plot.x_label, "Expression: bt - vt");
        assert!(plot.x_overlays.is_empty());
    }

    #[test]
    fn bivariate_thresholds() {
        let c = catalog();
        let ctx = QueryContext::default();
        assert!(c.histogram_2d("bt", "vrot", &ctx).is_ok());
        let err = c.histogram_3d("bt", "vrot", &ctx).unwrap_err();
        assert_eq!(
            err,
            QueryError::InsufficientData {
                analysis: Analysis::Histogram3D,
                x_count: 12,
                y_count: 10,
                joint: 10,
                required: 20,
            }
        );
    }

    #[test]
    fn histogram_respects_explicit_range() {
        let c = catalog();
        let ctx = QueryContext {
            histogram_bins: 2,
            ..QueryContext::default()
        }
        .with_x_range(Some(ValueRange::new(10.0, 14.0).unwrap()));
        let plot = c.histogram("bt", &ctx).unwrap();
        assert_eq!(plot.histogram.counts(), &[2, 3]);
        assert_eq!(plot.summary.count, 12);
        // 5 counted values over bins of width 2
        assert_eq!(plot.densities, vec![0.2, 0.3]);
        let curve = plot.density_curve.unwrap();
        assert_eq!(curve.len(), 100);
        assert_eq!((curve[0].0, curve[99].0), (10.0, 21.0));
    }

    #[test]
    fn profile_of_resolved_object() {
        let c = catalog();
        let id = c.resolve("ngc105").unwrap();
        assert_eq!(id, RecordId(5));
        let profile = c.object_profile(id, "bt").unwrap();
        assert_eq!(profile.value, 15.0);
        assert!((profile.percentile - 5.0 / 12.0 * 100.0).abs() < 1e-9);
        assert_eq!(profile.object.secondary_id, Some(1005));

        let missing = c.object_profile(RecordId(11), "vrot").unwrap_err();
        assert!(matches!(missing, QueryError::NoValueForObject { .. }));
    }

    #[test]
    fn single_record_value_matches_series() {
        let c = catalog();
        let series = c.series("vrot / bt").unwrap();
        for id in c.dataset().ids() {
            let single = c.value_for(id, "vrot / bt").unwrap().ok();
            assert_eq!(single, series.get(id));
        }
        assert_eq!(c.object_point(RecordId(10), "bt", "vrot").unwrap(), None);
    }

    #[test]
    fn pick_maps_click_back_to_object() {
        let c = catalog();
        let ctx = QueryContext::default();
        let plot = c.scatter("bt", "vrot", &ctx).unwrap();
        let axes = (AxisRange::new(10.0, 19.0), AxisRange::new(100.0, 190.0));
        let picked = c.pick(&plot.points(), (12.1, 120.5), axes, &ctx).unwrap();
        assert_eq!(picked.id, RecordId(2));
        assert_eq!(picked.name, "NGC102");
        assert!(c.pick(&plot.points(), (12.5, 135.0), axes, &ctx).is_none());
    }

    #[test]
    fn bin_click_lists_members() {
        let c = catalog();
        let ctx = QueryContext {
            bivariate_bins: 2,
            ..QueryContext::default()
        };
        let plot = c.histogram_2d("bt", "vrot", &ctx).unwrap();
        let objects = c.bin_objects(&plot.histogram, 10.0, 100.0);
        let ids: Vec<RecordId> = objects.iter().map(|o| o.id).collect();
        assert_eq!(ids, (0..5).map(RecordId).collect::<Vec<_>>());
    }
}
