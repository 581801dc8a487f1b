//! Condition comparisons at each (timepoint, metric).

use std::collections::BTreeMap;

use tracing::debug;

use mea_core::config::{StatsConfig, TestFamily, ValueSource};

use super::adjust::p_adjust;
use super::effect::{cohens_d, rank_biserial};
use super::inference::{
    jarque_bera, kruskal_wallis, mann_whitney_u, mean, median, one_way_anova, sample_variance,
    welch_t,
};
use super::types::{
    ComparisonOutcome, ConditionDescriptive, EffectKind, InsufficientData, OmnibusResult,
    PairwiseResult, TestKind, TimepointComparison,
};
use crate::table::MasterTable;

/// Runs one independent comparison per (timepoint, metric) pair.
pub struct TimepointComparator {
    config: StatsConfig,
}

impl TimepointComparator {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    /// Compare conditions at every (timepoint, metric) present in the table.
    ///
    /// Observations are never pooled across time points. A pair whose
    /// eligible condition count falls below two yields a typed
    /// `InsufficientData` outcome rather than being dropped, so downstream
    /// reports show the gap explicitly.
    pub fn compare(&self, table: &MasterTable) -> Vec<TimepointComparison> {
        // BTreeMaps keep the output deterministic: sorted by (plate,
        // timepoint, metric) and by condition name within each comparison.
        // The plate is part of the group key so a multi-plate table never
        // pools conditions across plates.
        let mut groups: BTreeMap<(String, u32, String), BTreeMap<String, Vec<f64>>> =
            BTreeMap::new();

        for r in &table.records {
            if self.config.exclude_outliers && r.outlier {
                continue;
            }
            let value = match self.config.value_source {
                ValueSource::Raw => r.value,
                ValueSource::Normalized => r.normalized,
            };
            let Some(v) = value else { continue };
            groups
                .entry((r.plate.clone(), r.timepoint, r.metric.clone()))
                .or_default()
                .entry(r.condition.clone())
                .or_default()
                .push(v);
        }

        let mut results = Vec::with_capacity(groups.len());
        for ((plate, timepoint, metric), by_condition) in groups {
            results.push(self.compare_one(&plate, timepoint, metric, by_condition));
        }
        debug!(comparisons = results.len(), "timepoint comparisons complete");
        results
    }

    fn compare_one(
        &self,
        plate: &str,
        timepoint: u32,
        metric: String,
        by_condition: BTreeMap<String, Vec<f64>>,
    ) -> TimepointComparison {
        let conditions_total = by_condition.len();
        let eligible: Vec<(String, Vec<f64>)> = by_condition
            .into_iter()
            .filter(|(_, values)| values.len() >= self.config.min_n_per_group)
            .collect();

        if eligible.len() < 2 {
            return TimepointComparison {
                plate: plate.to_string(),
                timepoint,
                metric,
                test_family: self.config.test_family,
                outcome: ComparisonOutcome::InsufficientData(InsufficientData {
                    conditions_total,
                    conditions_eligible: eligible.len(),
                    min_n_per_group: self.config.min_n_per_group,
                }),
            };
        }

        let family = self.resolve_family(&eligible);
        let parametric = matches!(family, TestFamily::Parametric);

        let descriptives: Vec<ConditionDescriptive> = eligible
            .iter()
            .map(|(condition, values)| {
                let n = values.len();
                let std = (n >= 2).then(|| sample_variance(values).sqrt());
                ConditionDescriptive {
                    condition: condition.clone(),
                    n,
                    mean: mean(values),
                    sem: std.map(|s| s / (n as f64).sqrt()),
                    median: median(values),
                    std,
                }
            })
            .collect();

        let slices: Vec<&[f64]> = eligible.iter().map(|(_, v)| v.as_slice()).collect();
        let omnibus = if eligible.len() == 2 {
            let (statistic, p_value) = if parametric {
                welch_t(slices[0], slices[1])
            } else {
                mann_whitney_u(slices[0], slices[1])
            };
            OmnibusResult {
                test: if parametric {
                    TestKind::WelchTTest
                } else {
                    TestKind::MannWhitneyU
                },
                statistic,
                p_value,
                k_groups: 2,
            }
        } else {
            let (statistic, p_value) = if parametric {
                one_way_anova(&slices)
            } else {
                kruskal_wallis(&slices)
            };
            OmnibusResult {
                test: if parametric {
                    TestKind::OneWayAnova
                } else {
                    TestKind::KruskalWallis
                },
                statistic,
                p_value,
                k_groups: eligible.len(),
            }
        };

        let mut pairwise: Vec<PairwiseResult> = Vec::new();
        for i in 0..eligible.len() {
            for j in (i + 1)..eligible.len() {
                let (name_a, a) = &eligible[i];
                let (name_b, b) = &eligible[j];
                let (test, statistic, p_value, effect_kind, effect_size) = if parametric {
                    let (t, p) = welch_t(a, b);
                    (TestKind::WelchTTest, t, p, EffectKind::CohensD, cohens_d(a, b))
                } else {
                    let (u, p) = mann_whitney_u(a, b);
                    (
                        TestKind::MannWhitneyU,
                        u,
                        p,
                        EffectKind::RankBiserial,
                        rank_biserial(u, a.len(), b.len()),
                    )
                };
                pairwise.push(PairwiseResult {
                    condition_a: name_a.clone(),
                    condition_b: name_b.clone(),
                    n_a: a.len(),
                    n_b: b.len(),
                    test,
                    statistic,
                    p_value,
                    p_adjusted: f64::NAN,
                    effect_kind,
                    effect_size,
                });
            }
        }

        let raw: Vec<f64> = pairwise.iter().map(|p| p.p_value).collect();
        let adjusted = p_adjust(&raw, self.config.p_adjust);
        for (pair, adj) in pairwise.iter_mut().zip(adjusted) {
            pair.p_adjusted = adj;
        }
        pairwise.sort_by(|a, b| {
            a.p_adjusted
                .partial_cmp(&b.p_adjusted)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        TimepointComparison {
            plate: plate.to_string(),
            timepoint,
            metric,
            test_family: family,
            outcome: ComparisonOutcome::Tested {
                descriptives,
                omnibus,
                pairwise,
            },
        }
    }

    /// Resolve `auto` to a concrete family via a Jarque-Bera screen: use
    /// parametric tests only when every group is large enough to screen and
    /// none rejects normality.
    fn resolve_family(&self, eligible: &[(String, Vec<f64>)]) -> TestFamily {
        match self.config.test_family {
            TestFamily::Parametric => TestFamily::Parametric,
            TestFamily::Nonparametric => TestFamily::Nonparametric,
            TestFamily::Auto => {
                let all_normal = eligible.iter().all(|(_, values)| {
                    values.len() >= self.config.normality_min_n
                        && jarque_bera(values).1 > self.config.normality_alpha
                });
                if all_normal {
                    TestFamily::Parametric
                } else {
                    TestFamily::Nonparametric
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MasterRecord;
    use mea_core::config::PAdjustMethod;

    fn record(
        condition: &str,
        well: &str,
        timepoint: u32,
        metric: &str,
        value: f64,
    ) -> MasterRecord {
        MasterRecord {
            plate: "P1".to_string(),
            condition: condition.to_string(),
            well: well.to_string(),
            timepoint,
            metric: metric.to_string(),
            value: Some(value),
            missing: false,
            outlier: false,
            normalized: None,
        }
    }

    fn config() -> StatsConfig {
        StatsConfig {
            test_family: TestFamily::Nonparametric,
            p_adjust: PAdjustMethod::FdrBh,
            min_n_per_group: 2,
            exclude_outliers: false,
            value_source: ValueSource::Raw,
            normality_alpha: 0.05,
            normality_min_n: 8,
        }
    }

    fn two_condition_table(timepoint: u32) -> Vec<MasterRecord> {
        let mut records = Vec::new();
        for (i, v) in [1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            records.push(record("Control", &format!("A{}", i + 1), timepoint, "Rate", *v));
        }
        for (i, v) in [10.0, 11.0, 12.0, 13.0].iter().enumerate() {
            records.push(record("Treated", &format!("B{}", i + 1), timepoint, "Rate", *v));
        }
        records
    }

    #[test]
    fn two_conditions_use_pairwise_test_as_omnibus() {
        let table = MasterTable {
            records: two_condition_table(0),
            exclusions: Vec::new(),
        };
        let results = TimepointComparator::new(config()).compare(&table);
        assert_eq!(results.len(), 1);

        match &results[0].outcome {
            ComparisonOutcome::Tested { omnibus, pairwise, .. } => {
                assert_eq!(omnibus.test, TestKind::MannWhitneyU);
                assert_eq!(omnibus.k_groups, 2);
                assert_eq!(pairwise.len(), 1);
                assert_eq!(pairwise[0].effect_kind, EffectKind::RankBiserial);
                // Single pairwise comparison: adjustment is a no-op.
                assert_eq!(pairwise[0].p_value, pairwise[0].p_adjusted);
            }
            other => panic!("expected tested outcome, got {other:?}"),
        }
    }

    #[test]
    fn timepoints_are_never_pooled() {
        // Same conditions at two time points yield two separate results,
        // each with the per-timepoint n, not the pooled n.
        let mut records = two_condition_table(0);
        records.extend(two_condition_table(48));
        let table = MasterTable {
            records,
            exclusions: Vec::new(),
        };
        let results = TimepointComparator::new(config()).compare(&table);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].timepoint, 0);
        assert_eq!(results[1].timepoint, 48);

        for result in &results {
            match &result.outcome {
                ComparisonOutcome::Tested { descriptives, .. } => {
                    for d in descriptives {
                        assert_eq!(d.n, 4);
                    }
                }
                other => panic!("expected tested outcome, got {other:?}"),
            }
        }
    }

    #[test]
    fn three_conditions_get_omnibus_and_all_pairs() {
        let mut records = two_condition_table(0);
        for (i, v) in [5.0, 6.0, 7.0].iter().enumerate() {
            records.push(record("Vehicle", &format!("C{}", i + 1), 0, "Rate", *v));
        }
        let table = MasterTable {
            records,
            exclusions: Vec::new(),
        };
        let results = TimepointComparator::new(config()).compare(&table);

        match &results[0].outcome {
            ComparisonOutcome::Tested { omnibus, pairwise, .. } => {
                assert_eq!(omnibus.test, TestKind::KruskalWallis);
                assert_eq!(omnibus.k_groups, 3);
                assert_eq!(pairwise.len(), 3);
                // Sorted by adjusted p.
                for pair in pairwise.windows(2) {
                    assert!(pair[0].p_adjusted <= pair[1].p_adjusted);
                }
            }
            other => panic!("expected tested outcome, got {other:?}"),
        }
    }

    #[test]
    fn single_eligible_condition_is_insufficient_data() {
        let records = vec![
            record("Control", "A1", 0, "Rate", 1.0),
            record("Control", "A2", 0, "Rate", 2.0),
            record("Treated", "B1", 0, "Rate", 9.0), // n=1, below minimum
        ];
        let table = MasterTable {
            records,
            exclusions: Vec::new(),
        };
        let results = TimepointComparator::new(config()).compare(&table);

        match &results[0].outcome {
            ComparisonOutcome::InsufficientData(info) => {
                assert_eq!(info.conditions_total, 2);
                assert_eq!(info.conditions_eligible, 1);
                assert_eq!(info.min_n_per_group, 2);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn undefined_values_are_dropped_from_groups() {
        let mut records = two_condition_table(0);
        records.push(MasterRecord {
            value: None,
            missing: true,
            ..record("Control", "A9", 0, "Rate", 0.0)
        });
        let table = MasterTable {
            records,
            exclusions: Vec::new(),
        };
        let results = TimepointComparator::new(config()).compare(&table);

        match &results[0].outcome {
            ComparisonOutcome::Tested { descriptives, .. } => {
                let control = descriptives.iter().find(|d| d.condition == "Control").unwrap();
                assert_eq!(control.n, 4);
            }
            other => panic!("expected tested outcome, got {other:?}"),
        }
    }

    #[test]
    fn exclude_outliers_drops_flagged_rows() {
        let mut records = two_condition_table(0);
        records[0].outlier = true;
        let table = MasterTable {
            records,
            exclusions: Vec::new(),
        };
        let mut cfg = config();
        cfg.exclude_outliers = true;
        let results = TimepointComparator::new(cfg).compare(&table);

        match &results[0].outcome {
            ComparisonOutcome::Tested { descriptives, .. } => {
                let control = descriptives.iter().find(|d| d.condition == "Control").unwrap();
                assert_eq!(control.n, 3);
            }
            other => panic!("expected tested outcome, got {other:?}"),
        }
    }

    #[test]
    fn normalized_source_reads_normalized_column() {
        let mut records = two_condition_table(0);
        for r in &mut records {
            r.normalized = r.value.map(|v| v * 2.0);
        }
        let table = MasterTable {
            records,
            exclusions: Vec::new(),
        };
        let mut cfg = config();
        cfg.value_source = ValueSource::Normalized;
        let results = TimepointComparator::new(cfg).compare(&table);

        match &results[0].outcome {
            ComparisonOutcome::Tested { descriptives, .. } => {
                let control = descriptives.iter().find(|d| d.condition == "Control").unwrap();
                assert!((control.mean - 5.0).abs() < 1e-12); // mean of [2,4,6,8]
            }
            other => panic!("expected tested outcome, got {other:?}"),
        }
    }

    #[test]
    fn auto_family_falls_back_to_nonparametric_on_small_groups() {
        let table = MasterTable {
            records: two_condition_table(0), // n=4 per group, below screen minimum
            exclusions: Vec::new(),
        };
        let mut cfg = config();
        cfg.test_family = TestFamily::Auto;
        let results = TimepointComparator::new(cfg).compare(&table);

        assert_eq!(results[0].test_family, TestFamily::Nonparametric);
    }

    #[test]
    fn plates_are_compared_independently() {
        // The same conditions on two plates yield two results, each carrying
        // its own plate id and per-plate group sizes.
        let mut records = two_condition_table(0);
        for r in two_condition_table(0) {
            records.push(MasterRecord {
                plate: "P2".to_string(),
                ..r
            });
        }
        let table = MasterTable {
            records,
            exclusions: Vec::new(),
        };
        let results = TimepointComparator::new(config()).compare(&table);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].plate, "P1");
        assert_eq!(results[1].plate, "P2");
        for result in &results {
            match &result.outcome {
                ComparisonOutcome::Tested { descriptives, .. } => {
                    for d in descriptives {
                        assert_eq!(d.n, 4);
                    }
                }
                other => panic!("expected tested outcome, got {other:?}"),
            }
        }
    }

    #[test]
    fn metrics_are_compared_independently() {
        let mut records = two_condition_table(0);
        for r in two_condition_table(0) {
            records.push(MasterRecord {
                metric: "Amplitude".to_string(),
                ..r
            });
        }
        let table = MasterTable {
            records,
            exclusions: Vec::new(),
        };
        let results = TimepointComparator::new(config()).compare(&table);
        assert_eq!(results.len(), 2);
        // Sorted by (timepoint, metric).
        assert_eq!(results[0].metric, "Amplitude");
        assert_eq!(results[1].metric, "Rate");
    }
}
