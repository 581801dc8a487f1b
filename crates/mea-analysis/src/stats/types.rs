//! Statistics result types.
//!
//! Insufficient data is a typed outcome, not an error: reports must show
//! absence explicitly rather than omitting a (timepoint, metric) silently.

use serde::{Deserialize, Serialize};

use mea_core::config::TestFamily;

/// Which statistical test produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    WelchTTest,
    OneWayAnova,
    MannWhitneyU,
    KruskalWallis,
}

/// Which effect size accompanies a pairwise result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    CohensD,
    RankBiserial,
}

/// Per-condition summary statistics at one (timepoint, metric).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionDescriptive {
    pub condition: String,
    pub n: usize,
    pub mean: f64,
    /// Standard error of the mean; absent for n < 2.
    pub sem: Option<f64>,
    pub median: f64,
    /// Sample standard deviation; absent for n < 2.
    pub std: Option<f64>,
}

/// The omnibus test across all conditions at one (timepoint, metric).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmnibusResult {
    pub test: TestKind,
    pub statistic: f64,
    pub p_value: f64,
    pub k_groups: usize,
}

/// One pairwise condition comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairwiseResult {
    pub condition_a: String,
    pub condition_b: String,
    pub n_a: usize,
    pub n_b: usize,
    pub test: TestKind,
    pub statistic: f64,
    pub p_value: f64,
    /// Adjusted for multiple comparisons across this (timepoint, metric).
    pub p_adjusted: f64,
    pub effect_kind: EffectKind,
    /// Absent when it cannot be computed (e.g. zero pooled variance).
    pub effect_size: Option<f64>,
}

/// Marker for a (timepoint, metric) pair with too little data to test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsufficientData {
    /// Conditions present at this (timepoint, metric).
    pub conditions_total: usize,
    /// Conditions meeting the minimum observation count.
    pub conditions_eligible: usize,
    pub min_n_per_group: usize,
}

/// Outcome for one (timepoint, metric) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Tested {
        descriptives: Vec<ConditionDescriptive>,
        omnibus: OmnibusResult,
        pairwise: Vec<PairwiseResult>,
    },
    InsufficientData(InsufficientData),
}

/// One result record: a single time point and metric, tested independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimepointComparison {
    pub plate: String,
    pub timepoint: u32,
    pub metric: String,
    /// The family actually used (resolved from config, including `auto`).
    pub test_family: TestFamily,
    #[serde(flatten)]
    pub outcome: ComparisonOutcome,
}
