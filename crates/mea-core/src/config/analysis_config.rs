//! Analysis policy knobs.
//!
//! The outlier fence multiplier, minimum group sizes, and the parametric vs.
//! non-parametric test choice are policy, not algorithm: they live here as
//! explicit configuration with documented defaults rather than constants
//! buried in the stages.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Statistical test family for condition comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestFamily {
    /// Welch t-test (2 groups) / one-way ANOVA (>= 3).
    Parametric,
    /// Mann-Whitney U (2 groups) / Kruskal-Wallis (>= 3).
    Nonparametric,
    /// Jarque-Bera normality screen per group; any failure falls back to
    /// the non-parametric family.
    Auto,
}

/// Multiple-comparison adjustment for pairwise p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PAdjustMethod {
    Bonferroni,
    Holm,
    FdrBh,
}

/// Which value column the comparator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Raw,
    Normalized,
}

/// Outlier flagging policy (Tukey fences).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// IQR multiplier `k` for the fences `[Q1 - k*IQR, Q3 + k*IQR]`.
    pub multiplier: f64,
    /// Groups with fewer numeric members than this are never flagged.
    pub min_group_n: usize,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.5,
            min_group_n: 3,
        }
    }
}

/// Timepoint comparison policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub test_family: TestFamily,
    pub p_adjust: PAdjustMethod,
    /// Minimum observations per condition for a comparison to run.
    pub min_n_per_group: usize,
    /// Drop outlier-flagged rows before testing. Off by default: flagging
    /// is descriptive and exclusion is the scientist's call.
    pub exclude_outliers: bool,
    pub value_source: ValueSource,
    /// Significance level for the `Auto` normality screen.
    pub normality_alpha: f64,
    /// Minimum group size for the normality screen to be trusted; smaller
    /// groups always fall back to non-parametric under `Auto`.
    pub normality_min_n: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            test_family: TestFamily::Nonparametric,
            p_adjust: PAdjustMethod::FdrBh,
            min_n_per_group: 2,
            exclude_outliers: false,
            value_source: ValueSource::Raw,
            normality_alpha: 0.05,
            normality_min_n: 8,
        }
    }
}

/// Top-level analysis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub outliers: OutlierConfig,
    pub stats: StatsConfig,
}

impl AnalysisConfig {
    /// Load from a YAML file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.outliers.multiplier > 0.0 && self.outliers.multiplier.is_finite()) {
            return Err(ConfigError::ValidationFailed {
                field: "outliers.multiplier".to_string(),
                message: "must be a positive finite number".to_string(),
            });
        }
        if self.outliers.min_group_n < 1 {
            return Err(ConfigError::ValidationFailed {
                field: "outliers.min_group_n".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.stats.min_n_per_group < 2 {
            return Err(ConfigError::ValidationFailed {
                field: "stats.min_n_per_group".to_string(),
                message: "must be at least 2".to_string(),
            });
        }
        if !(self.stats.normality_alpha > 0.0 && self.stats.normality_alpha < 1.0) {
            return Err(ConfigError::ValidationFailed {
                field: "stats.normality_alpha".to_string(),
                message: "must be between 0 and 1 exclusive".to_string(),
            });
        }
        Ok(())
    }
}
