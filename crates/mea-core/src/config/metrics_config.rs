//! Metric definitions: category, missing-value rule, normalizability.
//!
//! What "missing" means differs by metric category. A blank cell for a count
//! or rate metric means no events were detected (a real zero); for a duration
//! or derived metric it means the quantity is mathematically undefined.
//! The rule is resolved per metric at load time so downstream stages apply a
//! single table-driven dispatch instead of scattered branching.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::collections::FxHashMap;

/// Category of a metric, as exported by the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    /// Event counts (e.g., number of bursts).
    Count,
    /// Rates (e.g., weighted mean firing rate).
    Rate,
    /// Intervals and durations (e.g., mean burst duration).
    Duration,
    /// Ratios and indices (e.g., synchrony index).
    Derived,
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Count => "count",
            Self::Rate => "rate",
            Self::Duration => "duration",
            Self::Derived => "derived",
        };
        f.write_str(s)
    }
}

/// How an absent raw reading is handled for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValueRule {
    /// Absence means "no events": becomes numeric 0, missingness flag set.
    ZeroFill,
    /// Absence means "undefined": stays an explicit absence, flag set.
    MarkUndefined,
    /// The row is omitted from the master table and recorded in the side log.
    ExcludeRow,
}

/// Resolved definition for one metric. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub category: MetricCategory,
    pub rule: MissingValueRule,
    /// Whether baseline fold-change normalization applies to this metric.
    pub normalizable: bool,
}

/// On-disk shape of the metrics config file.
#[derive(Debug, Deserialize)]
struct MetricsFile {
    /// Per-category default missing-value rules.
    #[serde(default)]
    categories: HashMap<MetricCategory, CategoryDefaults>,
    metrics: Vec<MetricEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryDefaults {
    missing_value: Option<MissingValueRule>,
}

#[derive(Debug, Deserialize)]
struct MetricEntry {
    name: String,
    category: MetricCategory,
    /// Per-metric override of the category default.
    missing_value: Option<MissingValueRule>,
    #[serde(default = "default_normalizable")]
    normalizable: bool,
}

fn default_normalizable() -> bool {
    true
}

/// Load and resolve metric definitions from a YAML file.
///
/// Fails when a metric's category has no declared missing-value rule (neither
/// a per-metric override nor a category default) or a metric name is declared
/// twice. Unknown metrics encountered later in raw data are rejected by the
/// table builder, not silently ignored.
pub fn load_metrics(path: &Path) -> Result<FxHashMap<String, MetricDefinition>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;
    from_yaml(&content, &path.display().to_string())
}

/// Parse metric definitions from a YAML string (`label` names the source in errors).
pub fn from_yaml(
    yaml: &str,
    label: &str,
) -> Result<FxHashMap<String, MetricDefinition>, ConfigError> {
    let file: MetricsFile = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
        path: label.to_string(),
        message: e.to_string(),
    })?;

    let mut metrics = FxHashMap::default();
    for entry in file.metrics {
        let rule = entry
            .missing_value
            .or_else(|| {
                file.categories
                    .get(&entry.category)
                    .and_then(|c| c.missing_value)
            })
            .ok_or_else(|| ConfigError::MissingRule {
                category: entry.category.to_string(),
            })?;

        let def = MetricDefinition {
            name: entry.name.clone(),
            category: entry.category,
            rule,
            normalizable: entry.normalizable,
        };
        if metrics.insert(entry.name.clone(), def).is_some() {
            return Err(ConfigError::DuplicateMetric { metric: entry.name });
        }
    }

    Ok(metrics)
}
