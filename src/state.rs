use std::sync::Arc;

use crate::analysis::lookup::{AxisRange, PlottedPoint};
use crate::config::ExplorerConfig;
use crate::error::{QueryError, Result};
use crate::query::{Catalog, PickedObject, QueryContext};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything a front end keeps between queries, independent of rendering.
pub struct Session {
    /// Current catalog snapshot (None until a file is loaded).
    catalog: Option<Arc<Catalog>>,

    /// Binning, ranges, overlays and policy for the next query.
    pub context: QueryContext,

    /// Object highlighted in the views.
    pub selected: Option<PickedObject>,

    /// Status / error message shown to the user.
    pub status_message: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&ExplorerConfig::default())
    }
}

impl Session {
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            catalog: None,
            context: QueryContext::from_config(config),
            selected: None,
            status_message: None,
        }
    }

    /// Replace the catalog wholesale. Queries already holding the previous
    /// snapshot keep it; the selection is cleared.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.status_message = Some(format!(
            "Loaded {} objects, {} parameters",
            catalog.len(),
            catalog.parameters().len()
        ));
        self.catalog = Some(Arc::new(catalog));
        self.selected = None;
    }

    /// Shared handle to the current snapshot.
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        self.catalog.clone().ok_or(QueryError::NoDataset)
    }

    pub fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    /// Run a query against the current snapshot. A failure is also recorded
    /// as the status message.
    pub fn run<T>(&mut self, query: impl FnOnce(&Catalog, &QueryContext) -> Result<T>) -> Result<T> {
        let outcome = self
            .catalog()
            .and_then(|catalog| query(&catalog, &self.context));
        match &outcome {
            Ok(_) => self.status_message = None,
            Err(e) => {
                log::debug!("query failed: {e}");
                self.status_message = Some(e.to_string());
            }
        }
        outcome
    }

    /// Resolve a designator and make it the selection.
    pub fn select(&mut self, designator: &str) -> Result<PickedObject> {
        let picked = self.run(|catalog, _| {
            let id = catalog.resolve(designator)?;
            catalog
                .picked(id)
                .ok_or_else(|| QueryError::IdentityNotFound(designator.trim().to_string()))
        })?;
        self.selected = Some(picked.clone());
        Ok(picked)
    }

    /// Select the point under a click, if one is close enough. A miss keeps
    /// the current selection.
    pub fn pick(
        &mut self,
        points: &[PlottedPoint],
        click: (f64, f64),
        axes: (AxisRange, AxisRange),
    ) -> Option<PickedObject> {
        let catalog = self.catalog.clone()?;
        let picked = catalog.pick(points, click, axes, &self.context)?;
        self.status_message = Some(match picked.secondary_id {
            Some(number) => format!("Selected {} (#{number})", picked.name),
            None => format!("Selected {}", picked.name),
        });
        self.selected = Some(picked.clone());
        Some(picked)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}
