//! Long-table, audit-log, and statistics report writers.

use std::io::Write;
use std::path::Path;

use tracing::info;

use mea_core::errors::PipelineError;

use super::csv_field;
use crate::normalize::BaselineExclusion;
use crate::qc::OutlierHit;
use crate::stats::TimepointComparison;
use crate::table::MasterTable;

fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Write the master table as long-format CSV, one row per observation.
pub fn write_master_csv(table: &MasterTable, path: &Path) -> Result<(), PipelineError> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(
        file,
        "plate,condition,well,timepoint,metric,value,missing,outlier,normalized"
    )?;
    for r in &table.records {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{}",
            csv_field(&r.plate),
            csv_field(&r.condition),
            csv_field(&r.well),
            r.timepoint,
            csv_field(&r.metric),
            opt(r.value),
            r.missing,
            r.outlier,
            opt(r.normalized),
        )?;
    }
    file.flush()?;
    info!(rows = table.records.len(), path = %path.display(), "master table written");
    Ok(())
}

/// Write the table builder's exclusion side log.
pub fn write_exclusions_csv(table: &MasterTable, path: &Path) -> Result<(), PipelineError> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "plate,well,timepoint,metric,reason")?;
    for e in &table.exclusions {
        let reason = match e.reason {
            crate::table::ExclusionReason::ExcludeRowRule => "exclude_row_rule",
            crate::table::ExclusionReason::IgnoredWell => "ignored_well",
        };
        writeln!(
            file,
            "{},{},{},{},{}",
            csv_field(&e.plate),
            csv_field(&e.well),
            e.timepoint,
            csv_field(&e.metric),
            reason,
        )?;
    }
    file.flush()?;
    Ok(())
}

/// Write the baseline normalization QC table.
pub fn write_baseline_exclusions_csv(
    exclusions: &[BaselineExclusion],
    path: &Path,
) -> Result<(), PipelineError> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "plate,well,metric,baseline_value,reason")?;
    for e in exclusions {
        let reason = match e.reason {
            crate::normalize::BaselineExclusionReason::BaselineMissing => "baseline_missing",
            crate::normalize::BaselineExclusionReason::BaselineZero => "baseline_zero",
        };
        writeln!(
            file,
            "{},{},{},{},{}",
            csv_field(&e.plate),
            csv_field(&e.well),
            csv_field(&e.metric),
            opt(e.baseline_value),
            reason,
        )?;
    }
    file.flush()?;
    Ok(())
}

/// Write the outlier audit report.
pub fn write_outliers_csv(hits: &[OutlierHit], path: &Path) -> Result<(), PipelineError> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "plate,condition,well,timepoint,metric,value,group_n")?;
    for h in hits {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            csv_field(&h.plate),
            csv_field(&h.condition),
            csv_field(&h.well),
            h.timepoint,
            csv_field(&h.metric),
            h.value,
            h.group_n,
        )?;
    }
    file.flush()?;
    Ok(())
}

/// Write the full statistics report as pretty-printed JSON.
pub fn write_stats_json(
    comparisons: &[TimepointComparison],
    path: &Path,
) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(comparisons).map_err(std::io::Error::from)?;
    std::fs::write(path, json)?;
    info!(comparisons = comparisons.len(), path = %path.display(), "stats report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::BaselineExclusionReason;
    use crate::table::{ExcludedObservation, ExclusionReason, MasterRecord};

    fn sample_table() -> MasterTable {
        MasterTable {
            records: vec![MasterRecord {
                plate: "P1".to_string(),
                condition: "Control".to_string(),
                well: "A1".to_string(),
                timepoint: 0,
                metric: "Rate".to_string(),
                value: Some(1.5),
                missing: false,
                outlier: false,
                normalized: None,
            }],
            exclusions: vec![ExcludedObservation {
                plate: "P1".to_string(),
                well: "D6".to_string(),
                timepoint: 0,
                metric: "Rate".to_string(),
                reason: ExclusionReason::IgnoredWell,
            }],
        }
    }

    #[test]
    fn master_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.csv");
        write_master_csv(&sample_table(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("plate,condition,well"));
        assert_eq!(lines[1], "P1,Control,A1,0,Rate,1.5,false,false,");
    }

    #[test]
    fn exclusion_log_names_the_reason() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclusions.csv");
        write_exclusions_csv(&sample_table(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("P1,D6,0,Rate,ignored_well"));
    }

    #[test]
    fn baseline_exclusions_log_the_baseline_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline_exclusions.csv");
        write_baseline_exclusions_csv(
            &[BaselineExclusion {
                plate: "P1".to_string(),
                well: "A1".to_string(),
                metric: "Rate".to_string(),
                baseline_value: Some(0.0),
                reason: BaselineExclusionReason::BaselineZero,
            }],
            &path,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("P1,A1,Rate,0,baseline_zero"));
    }

    #[test]
    fn stats_json_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        write_stats_json(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(parsed.as_array().unwrap().is_empty());
    }
}
