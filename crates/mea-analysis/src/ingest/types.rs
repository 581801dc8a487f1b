//! Ingest types.

use serde::{Deserialize, Serialize};

/// One value as parsed from a single raw export file.
///
/// `value` is `None` when the instrument left the cell blank; the metric's
/// missing-value rule decides what that means during table construction.
/// Observations are consumed immediately by the table builder, not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    pub plate: String,
    pub well: String,
    pub timepoint: u32,
    pub metric: String,
    pub value: Option<f64>,
}
