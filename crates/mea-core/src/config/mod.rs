//! Configuration for the MEA pipeline.
//!
//! Three user-authored sources, all YAML, all loaded once and immutable:
//! - metrics config: per-metric category, missing-value rule, normalizability
//! - plate layout: well -> condition assignments and time-point ordering
//! - analysis config: policy knobs (outlier fences, test family, p-adjustment)

pub mod analysis_config;
pub mod metrics_config;
pub mod plate_config;
pub mod store;

pub use analysis_config::{
    AnalysisConfig, OutlierConfig, PAdjustMethod, StatsConfig, TestFamily, ValueSource,
};
pub use metrics_config::{MetricCategory, MetricDefinition, MissingValueRule};
pub use plate_config::{PlateLayout, TimepointSpec, WellAssignment};
pub use store::ConfigStore;
