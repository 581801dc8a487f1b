//! Wide per-metric pivot tables.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use mea_core::config::{PlateLayout, ValueSource};
use mea_core::errors::PipelineError;
use mea_core::types::collections::FxHashMap;

use super::{csv_field, safe_filename};
use crate::table::MasterTable;

/// Write one wide CSV per metric: rows are time points (labeled from the
/// layout), columns are wells. Returns the written paths.
///
/// Absent values (undefined readings, excluded normalized series) are
/// emitted as empty cells, never as zeros, so a spreadsheet shows the gap.
pub fn write_wide_tables(
    table: &MasterTable,
    layout: &PlateLayout,
    source: ValueSource,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    std::fs::create_dir_all(out_dir)?;

    let wells = table.wells();
    let timepoints = table.timepoints();
    let labels: FxHashMap<u32, &str> = layout
        .timepoints
        .iter()
        .map(|t| (t.index, t.label.as_str()))
        .collect();

    let suffix = match source {
        ValueSource::Raw => "raw",
        ValueSource::Normalized => "normalized",
    };

    let mut written = Vec::new();
    for metric in table.metrics() {
        // (timepoint, well) -> cell
        let mut cells: FxHashMap<(u32, &str), f64> = FxHashMap::default();
        for r in table.records.iter().filter(|r| r.metric == metric) {
            let value = match source {
                ValueSource::Raw => r.value,
                ValueSource::Normalized => r.normalized,
            };
            if let Some(v) = value {
                cells.insert((r.timepoint, r.well.as_str()), v);
            }
        }

        let path = out_dir.join(format!("{}_{}.csv", safe_filename(&metric), suffix));
        let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);

        write!(file, "Time Point")?;
        for well in &wells {
            write!(file, ",{}", csv_field(well))?;
        }
        writeln!(file)?;

        for &tp in &timepoints {
            let label = labels.get(&tp).copied().unwrap_or("");
            write!(file, "{}", csv_field(label))?;
            for well in &wells {
                match cells.get(&(tp, well.as_str())) {
                    Some(v) => write!(file, ",{v}")?,
                    None => write!(file, ",")?,
                }
            }
            writeln!(file)?;
        }
        file.flush()?;
        written.push(path);
    }

    info!(
        metrics = written.len(),
        source = suffix,
        dir = %out_dir.display(),
        "wide tables written"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MasterRecord;

    fn layout() -> PlateLayout {
        PlateLayout::from_yaml(
            r#"
experiment:
  plate_id: P1
conditions:
  Control: { wells: [A1, A2] }
time_points:
  - prefix: "0_"
    label: Baseline
    baseline: true
  - prefix: "48_"
    label: 48h
"#,
            "<test>",
        )
        .unwrap()
    }

    fn record(well: &str, timepoint: u32, value: Option<f64>) -> MasterRecord {
        MasterRecord {
            plate: "P1".to_string(),
            condition: "Control".to_string(),
            well: well.to_string(),
            timepoint,
            metric: "Mean Firing Rate (Hz)".to_string(),
            value,
            missing: value.is_none(),
            outlier: false,
            normalized: None,
        }
    }

    #[test]
    fn pivots_timepoints_by_wells_with_blank_gaps() {
        let table = MasterTable {
            records: vec![
                record("A1", 0, Some(1.5)),
                record("A2", 0, Some(2.0)),
                record("A1", 1, Some(3.0)),
                record("A2", 1, None),
            ],
            exclusions: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let paths =
            write_wide_tables(&table, &layout(), ValueSource::Raw, dir.path()).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("Mean_Firing_Rate_Hz_raw.csv"));

        let content = std::fs::read_to_string(&paths[0]).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Time Point,A1,A2");
        assert_eq!(lines[1], "Baseline,1.5,2");
        assert_eq!(lines[2], "48h,3,");
    }

    #[test]
    fn normalized_source_reads_normalized_column() {
        let mut r = record("A1", 0, Some(4.0));
        r.normalized = Some(1.0);
        let table = MasterTable {
            records: vec![r],
            exclusions: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let paths =
            write_wide_tables(&table, &layout(), ValueSource::Normalized, dir.path()).unwrap();
        let content = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(content.lines().nth(1).unwrap().ends_with(",1"));
    }
}
