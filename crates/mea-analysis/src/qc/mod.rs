//! Quality control: outlier flagging.
//!
//! Outliers are FLAGGED, never removed. Detection is cross-sectional,
//! within one (plate, condition, timepoint, metric) group; downstream
//! consumers decide whether to exclude flagged rows.

mod outliers;
mod types;

pub use outliers::{outlier_report, OutlierDetector};
pub use types::OutlierHit;
