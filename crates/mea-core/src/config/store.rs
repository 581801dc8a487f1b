//! Loaded, validated configuration shared by every pipeline stage.

use std::path::Path;

use tracing::info;

use super::metrics_config::{self, MetricDefinition};
use super::plate_config::{PlateLayout, WellAssignment};
use crate::errors::ConfigError;
use crate::types::collections::FxHashMap;

/// Immutable configuration for one plate's pipeline run.
///
/// Loaded once at pipeline start and passed by reference to each stage;
/// nothing mutates it after load.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// Metric name -> resolved definition.
    pub metrics: FxHashMap<String, MetricDefinition>,
    /// The plate's layout: assignments, ignored wells, time points.
    pub layout: PlateLayout,
}

impl ConfigStore {
    /// Load metric definitions and a plate layout, validating both.
    pub fn load(metrics_path: &Path, layout_path: &Path) -> Result<Self, ConfigError> {
        let metrics = metrics_config::load_metrics(metrics_path)?;
        let layout = PlateLayout::load(layout_path)?;
        info!(
            plate = %layout.plate_id,
            metrics = metrics.len(),
            wells = layout.assignments.len(),
            timepoints = layout.timepoints.len(),
            "configuration loaded"
        );
        Ok(Self { metrics, layout })
    }

    /// Build a store from already-validated parts (used by tests).
    pub fn new(metrics: FxHashMap<String, MetricDefinition>, layout: PlateLayout) -> Self {
        Self { metrics, layout }
    }

    /// Definition for a metric name, if configured.
    pub fn metric(&self, name: &str) -> Option<&MetricDefinition> {
        self.metrics.get(name)
    }

    /// Condition assignment for a well on this plate, if any.
    pub fn assignment(&self, well: &str) -> Option<&WellAssignment> {
        self.layout.assignments.get(well)
    }
}
