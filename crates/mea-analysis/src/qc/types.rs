//! QC types.

use serde::{Deserialize, Serialize};

/// One flagged row, for the audit report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierHit {
    pub plate: String,
    pub condition: String,
    pub well: String,
    pub timepoint: u32,
    pub metric: String,
    pub value: f64,
    /// How many numeric values the group had when the fences were computed.
    pub group_n: usize,
}
