//! IQR outlier detection with Tukey fences.
//!
//! Resistant to extreme values that inflate stddev. A value is flagged when
//! it falls outside `[Q1 - k*IQR, Q3 + k*IQR]`. Groups below the minimum
//! member count are never flagged: too little data to judge dispersion.

use tracing::debug;

use mea_core::config::OutlierConfig;
use mea_core::types::collections::FxHashMap;

use super::types::OutlierHit;
use crate::table::MasterTable;

/// Annotates master records with outlier flags.
pub struct OutlierDetector {
    config: OutlierConfig,
}

impl OutlierDetector {
    pub fn new(config: OutlierConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(OutlierConfig::default())
    }

    /// Return a new table with the outlier flag populated.
    ///
    /// Raw fields are untouched; flags are a pure function of the group
    /// values, so re-running on an annotated table reproduces identical
    /// flags, and changing one group never affects another.
    pub fn annotate(&self, table: &MasterTable) -> MasterTable {
        // Group numeric values by (plate, condition, timepoint, metric).
        let mut groups: FxHashMap<(String, String, u32, String), Vec<f64>> =
            FxHashMap::default();
        for r in &table.records {
            if let Some(v) = r.value {
                groups
                    .entry((
                        r.plate.clone(),
                        r.condition.clone(),
                        r.timepoint,
                        r.metric.clone(),
                    ))
                    .or_default()
                    .push(v);
            }
        }

        // Precompute fences per group.
        let mut fences: FxHashMap<&(String, String, u32, String), (f64, f64)> =
            FxHashMap::default();
        for (key, values) in &groups {
            if values.len() < self.config.min_group_n {
                continue;
            }
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let q1 = percentile(&sorted, 25.0);
            let q3 = percentile(&sorted, 75.0);
            let iqr = q3 - q1;
            // Degenerate dispersion (zero or non-finite IQR) never flags.
            if !(iqr.is_finite() && iqr > 0.0) {
                continue;
            }
            let lower = q1 - self.config.multiplier * iqr;
            let upper = q3 + self.config.multiplier * iqr;
            fences.insert(key, (lower, upper));
        }

        let mut out = table.clone();
        let mut flagged = 0usize;
        for r in &mut out.records {
            let flag = match r.value {
                Some(v) => {
                    let key = (
                        r.plate.clone(),
                        r.condition.clone(),
                        r.timepoint,
                        r.metric.clone(),
                    );
                    match fences.get(&key) {
                        Some(&(lower, upper)) => v < lower || v > upper,
                        None => false,
                    }
                }
                None => false,
            };
            if flag {
                flagged += 1;
            }
            r.outlier = flag;
        }

        debug!(groups = groups.len(), flagged, "outlier annotation complete");
        out
    }
}

/// User-facing table of flagged rows, sorted by (metric, condition, well, timepoint).
pub fn outlier_report(table: &MasterTable) -> Vec<OutlierHit> {
    let mut group_sizes: FxHashMap<(&str, &str, u32, &str), usize> = FxHashMap::default();
    for r in &table.records {
        if r.value.is_some() {
            *group_sizes
                .entry((&r.plate, &r.condition, r.timepoint, &r.metric))
                .or_default() += 1;
        }
    }

    let mut hits: Vec<OutlierHit> = table
        .records
        .iter()
        .filter(|r| r.outlier)
        .filter_map(|r| {
            let value = r.value?;
            let group_n = group_sizes
                .get(&(r.plate.as_str(), r.condition.as_str(), r.timepoint, r.metric.as_str()))
                .copied()
                .unwrap_or(0);
            Some(OutlierHit {
                plate: r.plate.clone(),
                condition: r.condition.clone(),
                well: r.well.clone(),
                timepoint: r.timepoint,
                metric: r.metric.clone(),
                value,
                group_n,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        (&a.metric, &a.condition, &a.well, a.timepoint)
            .cmp(&(&b.metric, &b.condition, &b.well, b.timepoint))
    });
    hits
}

/// Compute a percentile of sorted values using linear interpolation.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}
