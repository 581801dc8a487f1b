//! Master table types.

use serde::{Deserialize, Serialize};

/// One row of the consolidated long-format table.
///
/// Exactly one record exists per (well, timepoint, metric) combination
/// present in the union of input files. Raw fields (`plate` through
/// `missing`) are never mutated after construction; `outlier` and
/// `normalized` are populated by the annotation stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRecord {
    pub plate: String,
    pub condition: String,
    pub well: String,
    pub timepoint: u32,
    pub metric: String,
    /// Numeric value; `None` is the explicit absence-marker for readings
    /// that are mathematically undefined (mark-undefined rule).
    pub value: Option<f64>,
    /// True when the raw cell was blank, regardless of which rule applied.
    pub missing: bool,
    /// Populated by the outlier detector. Purely descriptive; flagged rows
    /// stay in the table.
    pub outlier: bool,
    /// Fold-change relative to this well's baseline value, populated by the
    /// baseline normalizer. `None` is the explicit absence-marker.
    pub normalized: Option<f64>,
}

/// Why an observation was left out of the master table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The metric's exclude-row rule fired on an absent reading.
    ExcludeRowRule,
    /// The well is on the layout's ignore list.
    IgnoredWell,
}

/// Side-log entry for an excluded observation. Exclusions are never silent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedObservation {
    pub plate: String,
    pub well: String,
    pub timepoint: u32,
    pub metric: String,
    pub reason: ExclusionReason,
}

/// The consolidated table plus its exclusion side log.
///
/// Annotation stages return a new `MasterTable` rather than mutating in
/// place, preserving auditability of each stage's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterTable {
    pub records: Vec<MasterRecord>,
    pub exclusions: Vec<ExcludedObservation>,
}

impl MasterTable {
    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct time points present, ascending.
    pub fn timepoints(&self) -> Vec<u32> {
        let mut tps: Vec<u32> = self.records.iter().map(|r| r.timepoint).collect();
        tps.sort_unstable();
        tps.dedup();
        tps
    }

    /// Distinct metric names present, sorted.
    pub fn metrics(&self) -> Vec<String> {
        let mut metrics: Vec<String> = self.records.iter().map(|r| r.metric.clone()).collect();
        metrics.sort();
        metrics.dedup();
        metrics
    }

    /// Distinct well identifiers present, sorted.
    pub fn wells(&self) -> Vec<String> {
        let mut wells: Vec<String> = self.records.iter().map(|r| r.well.clone()).collect();
        wells.sort();
        wells.dedup();
        wells
    }
}
