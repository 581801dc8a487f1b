//! Normalization types.

use serde::{Deserialize, Serialize};

/// Why a (well, metric) series was excluded from normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineExclusionReason {
    /// No usable baseline reading (record absent, missing-flagged, or undefined).
    BaselineMissing,
    /// Baseline reading is exactly zero; division is meaningless.
    BaselineZero,
}

/// QC-table entry for one excluded (well, metric) series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineExclusion {
    pub plate: String,
    pub well: String,
    pub metric: String,
    pub baseline_value: Option<f64>,
    pub reason: BaselineExclusionReason,
}
