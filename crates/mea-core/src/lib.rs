//! mea-core: Core types, errors, and configuration for the MEA analysis engine.
//!
//! This crate provides the foundation shared by every pipeline stage:
//! - Errors: one error enum per subsystem, aggregated into `PipelineError`
//! - Config: metric definitions, plate layouts, and analysis policy knobs
//! - Types: shared collection aliases
//!
//! Configuration is loaded once at pipeline start, validated, and immutable
//! thereafter. Stages receive it by reference; there is no global state.

pub mod config;
pub mod errors;
pub mod types;

pub use config::{
    AnalysisConfig, ConfigStore, MetricCategory, MetricDefinition, MissingValueRule,
    OutlierConfig, PAdjustMethod, PlateLayout, StatsConfig, TestFamily, TimepointSpec,
    ValueSource, WellAssignment,
};
pub use errors::{ConfigError, ParseError, PipelineError, TableError};
