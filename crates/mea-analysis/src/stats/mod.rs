//! Per-timepoint condition comparisons.
//!
//! Comparisons are BETWEEN conditions at a SINGLE time point, never pooled
//! across time points: repeated-measures structure is not modeled, and
//! pooling would violate independence assumptions. Each (timepoint, metric)
//! pair gets one omnibus test plus pairwise comparisons with a
//! multiple-comparison adjustment.

mod adjust;
mod effect;
mod inference;
mod timepoint;
mod types;

pub use adjust::p_adjust;
pub use effect::{cohens_d, rank_biserial};
pub use timepoint::TimepointComparator;
pub use types::{
    ComparisonOutcome, ConditionDescriptive, EffectKind, InsufficientData, OmnibusResult,
    PairwiseResult, TestKind, TimepointComparison,
};
