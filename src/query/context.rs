use crate::analysis::histogram::ValueRange;
use crate::config::{ExplorerConfig, OverlayToggles, PolicyConfig};

/// Display state a query depends on, passed in explicitly with every call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    pub policy: PolicyConfig,
    pub histogram_bins: usize,
    pub bivariate_bins: usize,
    pub distribution_bins: usize,
    pub max_distribution_bins: usize,
    pub log_scale: bool,
    pub overlays: OverlayToggles,
    /// Displayed X range; histograms bin over it and distributions filter to it.
    pub x_range: Option<ValueRange>,
    pub y_range: Option<ValueRange>,
}

impl QueryContext {
    pub fn from_config(config: &ExplorerConfig) -> Self {
        let plot = &config.plot;
        QueryContext {
            policy: config.policy.clone(),
            histogram_bins: plot.histogram_bins,
            bivariate_bins: plot.bivariate_bins,
            distribution_bins: plot.distribution_bins,
            max_distribution_bins: plot.max_distribution_bins,
            log_scale: plot.log_scale,
            overlays: plot.overlays,
            x_range: None,
            y_range: None,
        }
    }

    pub fn with_x_range(mut self, range: Option<ValueRange>) -> Self {
        self.x_range = range;
        self
    }

    pub fn with_y_range(mut self, range: Option<ValueRange>) -> Self {
        self.y_range = range;
        self
    }

    pub fn with_overlays(mut self, overlays: OverlayToggles) -> Self {
        self.overlays = overlays;
        self
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::from_config(&ExplorerConfig::default())
    }
}
