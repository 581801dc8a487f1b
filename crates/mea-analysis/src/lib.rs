//! mea-analysis: The MEA timecourse consolidation and analysis engine.
//!
//! This crate provides the pipeline stages:
//! - Ingest: raw export discovery and "Well Averages" block parsing
//! - Table: master long-format table construction with missing-value rules
//! - QC: outlier flagging with Tukey fences (flag, never delete)
//! - Normalize: per-well baseline fold-change
//! - Stats: per-timepoint condition comparisons (omnibus + pairwise)
//! - Export: wide-table pivots and report writers for downstream consumers
//!
//! Data flows strictly forward; each stage returns a new table state and the
//! raw fields of a record are never mutated after construction. Plates are
//! fully independent and may be processed in parallel; groups within a plate
//! are not.

pub mod export;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod qc;
pub mod stats;
pub mod table;

pub use ingest::{discover_files, parse_well_averages, RawObservation};
pub use normalize::{BaselineExclusion, BaselineExclusionReason, BaselineNormalizer};
pub use pipeline::{run_plate, run_plates, PlateRun};
pub use qc::{outlier_report, OutlierDetector, OutlierHit};
pub use stats::{
    ComparisonOutcome, ConditionDescriptive, OmnibusResult, PairwiseResult, TestKind,
    TimepointComparator, TimepointComparison,
};
pub use table::{
    ExcludedObservation, ExclusionReason, MasterRecord, MasterTable, MasterTableBuilder,
};
