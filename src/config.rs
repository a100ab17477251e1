use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Fraction of the larger displayed axis span within which a click selects
/// the nearest plotted point.
pub const PICK_TOLERANCE: f64 = 0.05;

/// Minimum joint sample for a paired scatter plot.
pub const MIN_SCATTER_SAMPLES: usize = 5;
/// Minimum joint sample for a 2D histogram.
pub const MIN_HISTOGRAM_2D_SAMPLES: usize = 10;
/// Minimum joint sample for a 3D (height) histogram.
pub const MIN_HISTOGRAM_3D_SAMPLES: usize = 20;
/// Minimum sample for a 1D histogram or distribution.
pub const MIN_HISTOGRAM_1D_SAMPLES: usize = 5;

/// Minimum non-missing values for a numeric column to be offered for plotting.
pub const MIN_ANALYZABLE_VALUES: usize = 5;

/// Complete explorer configuration. Every section falls back to defaults, so
/// a config file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub loader: LoaderConfig,
    pub schema: SchemaConfig,
    pub naming: NamingConfig,
    pub policy: PolicyConfig,
    pub plot: PlotConfig,
}

impl ExplorerConfig {
    /// Read a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// How delimited catalog files are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub delimiter: char,
    /// Lines starting with this character are skipped.
    pub comment: Option<char>,
    /// Cell contents (after trimming) treated as missing in every column.
    pub missing_tokens: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            comment: Some('#'),
            missing_tokens: vec!["".into(), "NaN".into(), "nan".into(), "...".into()],
        }
    }
}

/// Which columns carry identity rather than measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub name_column: String,
    pub secondary_id_column: String,
    /// Matched case-insensitively; kept as text instead of being cleaned.
    pub categorical_columns: Vec<String>,
    pub min_analyzable_values: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            name_column: "objname".into(),
            secondary_id_column: "pgc".into(),
            categorical_columns: vec![
                "objname".into(),
                "pgc".into(),
                "type".into(),
                "objtype".into(),
            ],
            min_analyzable_values: MIN_ANALYZABLE_VALUES,
        }
    }
}

/// Display-name synthesis and search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Prefix for names built from the secondary identifier (`PGC303`).
    pub secondary_prefix: String,
    /// Prefix for positional placeholders (`Galaxy_2`).
    pub placeholder_prefix: String,
    /// Exact primary names that are never used as display names.
    pub rejected_names: Vec<String>,
    /// Primary names shorter than this are rejected.
    pub min_name_len: usize,
    pub search_limit: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            secondary_prefix: "PGC".into(),
            placeholder_prefix: "Galaxy".into(),
            rejected_names: vec!["G".into()],
            min_name_len: 3,
            search_limit: 50,
        }
    }
}

/// Tolerances and minimum sample sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub pick_tolerance: f64,
    pub min_scatter: usize,
    pub min_histogram_2d: usize,
    pub min_histogram_3d: usize,
    pub min_histogram_1d: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            pick_tolerance: PICK_TOLERANCE,
            min_scatter: MIN_SCATTER_SAMPLES,
            min_histogram_2d: MIN_HISTOGRAM_2D_SAMPLES,
            min_histogram_3d: MIN_HISTOGRAM_3D_SAMPLES,
            min_histogram_1d: MIN_HISTOGRAM_1D_SAMPLES,
        }
    }
}

/// Binning and overlay defaults for the aggregation queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub histogram_bins: usize,
    pub bivariate_bins: usize,
    pub distribution_bins: usize,
    /// Upper bound when a narrowed distribution range scales the bin count up.
    pub max_distribution_bins: usize,
    /// Report 3D histogram heights as `log10(count + 1)`.
    pub log_scale: bool,
    pub overlays: OverlayToggles,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 15,
            bivariate_bins: 20,
            distribution_bins: 20,
            max_distribution_bins: 200,
            log_scale: true,
            overlays: OverlayToggles::default(),
        }
    }
}

/// Statistical reference lines requested alongside a plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayToggles {
    pub median: bool,
    pub mean: bool,
    pub quartiles: bool,
    pub std_dev: bool,
}

impl OverlayToggles {
    pub fn any(&self) -> bool {
        self.median || self.mean || self.quartiles || self.std_dev
    }
}
