//! Master table construction.
//!
//! Merges all time-point observations for a plate into one long-format
//! table, joins condition assignments, and applies per-metric missing-value
//! rules. Records are append-only during construction; downstream stages
//! only annotate (outlier flag, normalized value), never mutate raw fields.

mod builder;
mod types;

pub use builder::MasterTableBuilder;
pub use types::{ExcludedObservation, ExclusionReason, MasterRecord, MasterTable};
