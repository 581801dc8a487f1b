//! Master table builder.
//!
//! Rule application is a single table-driven function: the metric's
//! missing-value rule is resolved once at config load, so construction is a
//! closed dispatch over rule variants, not branching scattered across stages.

use tracing::{info, warn};

use mea_core::config::{ConfigStore, MissingValueRule};
use mea_core::errors::{ConfigError, PipelineError, TableError};
use mea_core::types::collections::FxHashSet;

use super::types::{ExcludedObservation, ExclusionReason, MasterRecord, MasterTable};
use crate::ingest::RawObservation;

/// Builds the consolidated long-format table from raw observations.
pub struct MasterTableBuilder;

impl MasterTableBuilder {
    /// Merge observations from all time-point files into one master table.
    ///
    /// Every observation must resolve to a well assignment and a metric
    /// definition; anything else is a fatal configuration error. Every
    /// (well, timepoint, metric) triple appears exactly once in the output
    /// or in the exclusion side log. Triples never present in any input
    /// file are not synthesized.
    pub fn build(
        observations: Vec<RawObservation>,
        config: &ConfigStore,
    ) -> Result<MasterTable, PipelineError> {
        let mut records = Vec::with_capacity(observations.len());
        let mut exclusions = Vec::new();
        let mut seen: FxHashSet<(String, u32, String)> = FxHashSet::default();

        for obs in observations {
            if !seen.insert((obs.well.clone(), obs.timepoint, obs.metric.clone())) {
                return Err(TableError::DuplicateObservation {
                    plate: obs.plate,
                    well: obs.well,
                    timepoint: obs.timepoint,
                    metric: obs.metric,
                }
                .into());
            }

            if config.layout.ignore_wells.contains(&obs.well) {
                exclusions.push(ExcludedObservation {
                    plate: obs.plate,
                    well: obs.well,
                    timepoint: obs.timepoint,
                    metric: obs.metric,
                    reason: ExclusionReason::IgnoredWell,
                });
                continue;
            }

            let assignment =
                config
                    .assignment(&obs.well)
                    .ok_or_else(|| ConfigError::UnassignedWell {
                        plate: obs.plate.clone(),
                        well: obs.well.clone(),
                    })?;

            let metric_def =
                config
                    .metric(&obs.metric)
                    .ok_or_else(|| ConfigError::UnknownMetric {
                        plate: obs.plate.clone(),
                        metric: obs.metric.clone(),
                    })?;

            let (value, missing) = match (obs.value, metric_def.rule) {
                (Some(v), _) => (Some(v), false),
                (None, MissingValueRule::ZeroFill) => (Some(0.0), true),
                (None, MissingValueRule::MarkUndefined) => (None, true),
                (None, MissingValueRule::ExcludeRow) => {
                    warn!(
                        plate = %obs.plate,
                        well = %obs.well,
                        timepoint = obs.timepoint,
                        metric = %obs.metric,
                        "excluding uninterpretable reading (exclude-row rule)"
                    );
                    exclusions.push(ExcludedObservation {
                        plate: obs.plate,
                        well: obs.well,
                        timepoint: obs.timepoint,
                        metric: obs.metric,
                        reason: ExclusionReason::ExcludeRowRule,
                    });
                    continue;
                }
            };

            records.push(MasterRecord {
                plate: obs.plate,
                condition: assignment.condition.clone(),
                well: obs.well,
                timepoint: obs.timepoint,
                metric: obs.metric,
                value,
                missing,
                outlier: false,
                normalized: None,
            });
        }

        // Stable output ordering; insertion order is otherwise irrelevant.
        records.sort_by(|a, b| {
            (
                &a.plate,
                &a.condition,
                &a.well,
                a.timepoint,
                &a.metric,
            )
                .cmp(&(&b.plate, &b.condition, &b.well, b.timepoint, &b.metric))
        });

        info!(
            rows = records.len(),
            excluded = exclusions.len(),
            "master table built"
        );
        Ok(MasterTable {
            records,
            exclusions,
        })
    }
}
