//! Plate pipeline orchestration.
//!
//! One plate flows through fixed stages: discover raw exports, parse each
//! time point's "Well Averages" block, build the master table, flag
//! outliers, normalize to baseline, compare conditions per time point.
//! Plates are independent, so multiple plates fan out across a rayon pool;
//! within a plate the stages run strictly in order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, info_span};

use mea_core::config::{AnalysisConfig, ConfigStore, PlateLayout, ValueSource};
use mea_core::errors::PipelineError;

use crate::export;
use crate::ingest::{discover_files, parse_well_averages};
use crate::normalize::{BaselineExclusion, BaselineNormalizer};
use crate::qc::{outlier_report, OutlierDetector, OutlierHit};
use crate::stats::{TimepointComparator, TimepointComparison};
use crate::table::{MasterTable, MasterTableBuilder};

/// Everything one plate's pipeline run produced.
#[derive(Debug)]
pub struct PlateRun {
    pub plate_id: String,
    /// The layout the run was built from; exports need its time-point labels.
    pub layout: PlateLayout,
    /// Fully annotated master table (outlier flags and normalized values set).
    pub table: MasterTable,
    pub outliers: Vec<OutlierHit>,
    pub baseline_exclusions: Vec<BaselineExclusion>,
    pub comparisons: Vec<TimepointComparison>,
}

impl PlateRun {
    /// Write every output artifact under `out_dir`.
    pub fn write_outputs(&self, out_dir: &Path) -> Result<(), PipelineError> {
        std::fs::create_dir_all(out_dir)?;
        export::write_master_csv(&self.table, &out_dir.join("master_table.csv"))?;
        export::write_exclusions_csv(&self.table, &out_dir.join("exclusions.csv"))?;
        export::write_outliers_csv(&self.outliers, &out_dir.join("outliers.csv"))?;
        export::write_baseline_exclusions_csv(
            &self.baseline_exclusions,
            &out_dir.join("baseline_exclusions.csv"),
        )?;
        export::write_stats_json(&self.comparisons, &out_dir.join("stats.json"))?;
        export::write_wide_tables(
            &self.table,
            &self.layout,
            ValueSource::Raw,
            &out_dir.join("wide_raw"),
        )?;
        export::write_wide_tables(
            &self.table,
            &self.layout,
            ValueSource::Normalized,
            &out_dir.join("wide_normalized"),
        )?;
        Ok(())
    }
}

/// Run the full pipeline for one plate whose raw exports live in `data_dir`.
pub fn run_plate(
    store: &ConfigStore,
    analysis: &AnalysisConfig,
    data_dir: &Path,
) -> Result<PlateRun, PipelineError> {
    let span = info_span!("plate", plate = %store.layout.plate_id);
    let _guard = span.enter();

    let files = discover_files(data_dir, &store.layout)?;
    info!(files = files.len(), "raw exports discovered");

    let mut observations = Vec::new();
    for (spec, path) in &files {
        let parsed = parse_well_averages(path, &store.layout.plate_id, spec.index)?;
        info!(
            timepoint = spec.index,
            label = %spec.label,
            observations = parsed.len(),
            "time point parsed"
        );
        observations.extend(parsed);
    }

    let table = MasterTableBuilder::build(observations, store)?;
    info!(rows = table.len(), excluded = table.exclusions.len(), "master table built");

    let table = OutlierDetector::new(analysis.outliers.clone()).annotate(&table);
    let outliers = outlier_report(&table);
    info!(flagged = outliers.len(), "outliers flagged");

    let normalizer = BaselineNormalizer::new(store.layout.baseline().index);
    let (table, baseline_exclusions) = normalizer.normalize(&table, &store.metrics);

    let comparisons = TimepointComparator::new(analysis.stats.clone()).compare(&table);

    Ok(PlateRun {
        plate_id: store.layout.plate_id.clone(),
        layout: store.layout.clone(),
        table,
        outliers,
        baseline_exclusions,
        comparisons,
    })
}

/// Run several plates in parallel. Results come back in input order; each
/// plate fails independently.
pub fn run_plates(
    runs: &[(ConfigStore, PathBuf)],
    analysis: &AnalysisConfig,
) -> Vec<Result<PlateRun, PipelineError>> {
    runs.par_iter()
        .map(|(store, data_dir)| run_plate(store, analysis, data_dir))
        .collect()
}
