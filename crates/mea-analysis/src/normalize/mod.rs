//! Baseline normalization.
//!
//! Fold-change relative to each well's own baseline-timepoint value.
//! Wells whose baseline is missing or zero are excluded from the normalized
//! series (explicit absence-markers); their raw values stay in the table.

mod baseline;
mod types;

pub use baseline::BaselineNormalizer;
pub use types::{BaselineExclusion, BaselineExclusionReason};
