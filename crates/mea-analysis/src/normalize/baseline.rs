//! Per-well baseline fold-change computation.

use tracing::{debug, warn};

use mea_core::config::MetricDefinition;
use mea_core::types::collections::FxHashMap;

use super::types::{BaselineExclusion, BaselineExclusionReason};
use crate::table::MasterTable;

/// Annotates master records with baseline-relative normalized values.
pub struct BaselineNormalizer {
    baseline_timepoint: u32,
}

impl BaselineNormalizer {
    pub fn new(baseline_timepoint: u32) -> Self {
        Self { baseline_timepoint }
    }

    /// Return a new table with normalized values populated, plus the QC
    /// table of excluded (well, metric) series.
    ///
    /// Per (well, metric): if the metric is not normalizable, every row gets
    /// the absence-marker and no exclusion entry. If the baseline record is
    /// absent, missing-flagged, undefined, or exactly zero, every row gets
    /// the absence-marker and one exclusion entry is recorded. The reason
    /// keys on the numeric value: any 0.0 baseline is logged as zero even
    /// when it came from zero-filling a blank cell; only a baseline with no
    /// numeric value at all is logged as missing. Otherwise `normalized =
    /// value / baseline`, so the baseline row's own normalized value is
    /// exactly 1. Raw values are never touched.
    pub fn normalize(
        &self,
        table: &MasterTable,
        metrics: &FxHashMap<String, MetricDefinition>,
    ) -> (MasterTable, Vec<BaselineExclusion>) {
        // Baseline reading per (well, metric): (value, missing flag).
        let mut baselines: FxHashMap<(&str, &str), (Option<f64>, bool)> = FxHashMap::default();
        for r in &table.records {
            if r.timepoint == self.baseline_timepoint {
                baselines.insert((r.well.as_str(), r.metric.as_str()), (r.value, r.missing));
            }
        }

        // Decide usability once per series so the exclusion log has one
        // entry per (well, metric), not one per row.
        let mut exclusions: Vec<BaselineExclusion> = Vec::new();
        let mut usable: FxHashMap<(String, String), Option<f64>> = FxHashMap::default();
        for r in &table.records {
            let key = (r.well.clone(), r.metric.clone());
            if usable.contains_key(&key) {
                continue;
            }
            let def = metrics.get(&r.metric);
            if !def.map(|d| d.normalizable).unwrap_or(false) {
                usable.insert(key, None);
                continue;
            }

            let entry = baselines.get(&(r.well.as_str(), r.metric.as_str())).copied();
            let (verdict, reason) = match entry {
                None | Some((None, _)) => (None, Some(BaselineExclusionReason::BaselineMissing)),
                Some((Some(v), _)) if v == 0.0 => {
                    (None, Some(BaselineExclusionReason::BaselineZero))
                }
                Some((Some(_), true)) => (None, Some(BaselineExclusionReason::BaselineMissing)),
                Some((Some(v), false)) => (Some(v), None),
            };

            if let Some(reason) = reason {
                warn!(
                    plate = %r.plate,
                    well = %r.well,
                    metric = %r.metric,
                    ?reason,
                    "well excluded from normalized series"
                );
                exclusions.push(BaselineExclusion {
                    plate: r.plate.clone(),
                    well: r.well.clone(),
                    metric: r.metric.clone(),
                    baseline_value: entry.and_then(|(v, _)| v),
                    reason,
                });
            }
            usable.insert(key, verdict);
        }

        let mut out = table.clone();
        for r in &mut out.records {
            let baseline = usable
                .get(&(r.well.clone(), r.metric.clone()))
                .copied()
                .flatten();
            r.normalized = match (baseline, r.value) {
                (Some(b), Some(v)) => Some(v / b),
                _ => None,
            };
        }

        exclusions.sort_by(|a, b| (&a.well, &a.metric).cmp(&(&b.well, &b.metric)));
        debug!(
            series_excluded = exclusions.len(),
            "baseline normalization complete"
        );
        (out, exclusions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MasterRecord;
    use mea_core::config::{MetricCategory, MetricDefinition, MissingValueRule};

    fn metric_defs() -> FxHashMap<String, MetricDefinition> {
        let mut metrics = FxHashMap::default();
        metrics.insert(
            "Rate".to_string(),
            MetricDefinition {
                name: "Rate".to_string(),
                category: MetricCategory::Rate,
                rule: MissingValueRule::ZeroFill,
                normalizable: true,
            },
        );
        metrics.insert(
            "Index".to_string(),
            MetricDefinition {
                name: "Index".to_string(),
                category: MetricCategory::Derived,
                rule: MissingValueRule::MarkUndefined,
                normalizable: false,
            },
        );
        metrics
    }

    fn record(
        well: &str,
        timepoint: u32,
        metric: &str,
        value: Option<f64>,
        missing: bool,
    ) -> MasterRecord {
        MasterRecord {
            plate: "P1".to_string(),
            condition: "Control".to_string(),
            well: well.to_string(),
            timepoint,
            metric: metric.to_string(),
            value,
            missing,
            outlier: false,
            normalized: None,
        }
    }

    fn normalized_for<'a>(table: &'a MasterTable, well: &str, timepoint: u32) -> Option<f64> {
        table
            .records
            .iter()
            .find(|r| r.well == well && r.timepoint == timepoint)
            .unwrap()
            .normalized
    }

    #[test]
    fn baseline_row_normalizes_to_one() {
        let table = MasterTable {
            records: vec![
                record("A1", 0, "Rate", Some(4.0), false),
                record("A1", 1, "Rate", Some(6.0), false),
            ],
            exclusions: Vec::new(),
        };
        let (out, exclusions) = BaselineNormalizer::new(0).normalize(&table, &metric_defs());

        assert_eq!(normalized_for(&out, "A1", 0), Some(1.0));
        assert_eq!(normalized_for(&out, "A1", 1), Some(1.5));
        assert!(exclusions.is_empty());
    }

    #[test]
    fn zero_baseline_excludes_whole_series() {
        let table = MasterTable {
            records: vec![
                record("A1", 0, "Rate", Some(0.0), false),
                record("A1", 1, "Rate", Some(6.0), false),
            ],
            exclusions: Vec::new(),
        };
        let (out, exclusions) = BaselineNormalizer::new(0).normalize(&table, &metric_defs());

        assert_eq!(normalized_for(&out, "A1", 0), None);
        assert_eq!(normalized_for(&out, "A1", 1), None);
        assert_eq!(exclusions.len(), 1);
        assert_eq!(exclusions[0].reason, BaselineExclusionReason::BaselineZero);
        assert_eq!(exclusions[0].baseline_value, Some(0.0));
    }

    #[test]
    fn zero_filled_baseline_excludes_series_as_zero() {
        // Zero-filled baseline: value Some(0.0) with missing=true. The
        // reason keys on the numeric value, so this is a zero, not missing.
        let table = MasterTable {
            records: vec![
                record("A1", 0, "Rate", Some(0.0), true),
                record("A1", 1, "Rate", Some(3.0), false),
            ],
            exclusions: Vec::new(),
        };
        let (out, exclusions) = BaselineNormalizer::new(0).normalize(&table, &metric_defs());

        assert_eq!(normalized_for(&out, "A1", 1), None);
        assert_eq!(exclusions[0].reason, BaselineExclusionReason::BaselineZero);
    }

    #[test]
    fn absent_baseline_record_excludes_whole_series() {
        let table = MasterTable {
            records: vec![record("A1", 1, "Rate", Some(3.0), false)],
            exclusions: Vec::new(),
        };
        let (out, exclusions) = BaselineNormalizer::new(0).normalize(&table, &metric_defs());

        assert_eq!(normalized_for(&out, "A1", 1), None);
        assert_eq!(
            exclusions[0].reason,
            BaselineExclusionReason::BaselineMissing
        );
    }

    #[test]
    fn non_normalizable_metric_gets_absence_without_exclusion_entry() {
        let table = MasterTable {
            records: vec![
                record("A1", 0, "Index", Some(0.8), false),
                record("A1", 1, "Index", Some(0.9), false),
            ],
            exclusions: Vec::new(),
        };
        let (out, exclusions) = BaselineNormalizer::new(0).normalize(&table, &metric_defs());

        assert_eq!(normalized_for(&out, "A1", 0), None);
        assert_eq!(normalized_for(&out, "A1", 1), None);
        assert!(exclusions.is_empty());
    }

    #[test]
    fn raw_values_are_untouched() {
        let table = MasterTable {
            records: vec![
                record("A1", 0, "Rate", Some(0.0), false),
                record("A1", 1, "Rate", Some(6.0), false),
            ],
            exclusions: Vec::new(),
        };
        let (out, _) = BaselineNormalizer::new(0).normalize(&table, &metric_defs());
        assert_eq!(out.records[0].value, Some(0.0));
        assert_eq!(out.records[1].value, Some(6.0));
    }

    #[test]
    fn undefined_non_baseline_value_stays_absent() {
        let table = MasterTable {
            records: vec![
                record("A1", 0, "Rate", Some(2.0), false),
                record("A1", 1, "Rate", None, true),
            ],
            exclusions: Vec::new(),
        };
        let (out, exclusions) = BaselineNormalizer::new(0).normalize(&table, &metric_defs());

        assert_eq!(normalized_for(&out, "A1", 0), Some(1.0));
        assert_eq!(normalized_for(&out, "A1", 1), None);
        // Baseline itself was fine, so no series-level exclusion.
        assert!(exclusions.is_empty());
    }
}
