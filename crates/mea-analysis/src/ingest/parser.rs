//! "Well Averages" block parser for raw instrument exports.
//!
//! Raw exports mix metadata rows with the actual per-well metric matrix.
//! Parsing rules:
//! - find the row whose first cell is exactly "Well Averages"; the remaining
//!   cells of that row are the well identifiers
//! - read metric rows until a fully blank line or the next major section
//!   (first cell "Measurement")
//! - skip the "Treatment/ID" row and section-header rows with no data cells
//!
//! Any malformation is fatal for the file: a partial parse could silently
//! corrupt downstream statistics, so rows are never skipped to recover.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use mea_core::errors::ParseError;

use super::types::RawObservation;

const BLOCK_HEADER: &str = "Well Averages";
const NEXT_SECTION: &str = "Measurement";
const TREATMENT_ROW: &str = "Treatment/ID";

/// Parse the well-averages block of one raw export into observations,
/// one per (well, metric) cell. Blank cells become absence-markers.
pub fn parse_well_averages(
    path: &Path,
    plate: &str,
    timepoint: u32,
) -> Result<Vec<RawObservation>, ParseError> {
    let label = path.display().to_string();
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: label.clone(),
        source,
    })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let mut line = line.map_err(|source| ParseError::Io {
            path: label.clone(),
            source,
        })?;
        // Instrument exports commonly carry a UTF-8 BOM.
        if i == 0 {
            line = line.trim_start_matches('\u{feff}').to_string();
        }
        rows.push(split_csv_line(&line));
    }

    // Locate the block header and read the well identifiers from it.
    let start = rows
        .iter()
        .position(|row| row.first().map(|c| c.trim()) == Some(BLOCK_HEADER))
        .ok_or_else(|| ParseError::BlockNotFound {
            path: label.clone(),
        })?;

    let wells: Vec<String> = rows[start][1..]
        .iter()
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect();
    if wells.is_empty() {
        return Err(ParseError::NoWells { path: label });
    }

    let mut observations = Vec::new();
    let mut metric_rows = 0usize;

    for (offset, row) in rows[start + 1..].iter().enumerate() {
        let line = start + 1 + offset + 1; // 1-based line number for errors

        if row.iter().all(|c| c.trim().is_empty()) {
            break; // block ends at the first truly blank line
        }
        let first = row.first().map(|c| c.trim()).unwrap_or("");
        if first == NEXT_SECTION {
            break;
        }
        if first == TREATMENT_ROW {
            continue;
        }
        // Section headers like "Activity Metrics" have no data cells.
        if row[1..].iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let metric = first.to_string();
        let cells = &row[1..];

        // More non-empty cells than wells means the matrix is misaligned.
        if cells.len() > wells.len()
            && cells[wells.len()..].iter().any(|c| !c.trim().is_empty())
        {
            return Err(ParseError::ColumnCount {
                path: label,
                line,
                metric,
                expected: wells.len(),
                got: cells.iter().filter(|c| !c.trim().is_empty()).count(),
            });
        }

        // Short rows are padded: trailing blank cells are absent readings.
        for (well_idx, well) in wells.iter().enumerate() {
            let cell = cells.get(well_idx).map(|c| c.trim()).unwrap_or("");
            let value = if cell.is_empty() {
                None
            } else {
                // "NaN"/"inf" parse as f64 but are not valid readings.
                let parsed = cell.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(
                    || ParseError::NonNumeric {
                        path: label.clone(),
                        line,
                        metric: metric.clone(),
                        well: well.clone(),
                        value: cell.to_string(),
                    },
                )?;
                Some(parsed)
            };
            observations.push(RawObservation {
                plate: plate.to_string(),
                well: well.clone(),
                timepoint,
                metric: metric.clone(),
                value,
            });
        }
        metric_rows += 1;
    }

    if metric_rows == 0 {
        return Err(ParseError::EmptyBlock { path: label });
    }

    debug!(
        file = %label,
        timepoint,
        wells = wells.len(),
        metrics = metric_rows,
        "parsed well-averages block"
    );
    Ok(observations)
}

/// Split one CSV line, honoring double-quoted cells (with `""` escapes).
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Investigator,Jane Doe,,,,,,
Recording Date,2026-01-15,,,,,,
,,,,,,,
Well Averages,A1,A2,A3,B1,B2,B3
Treatment/ID,,,,,,
Activity Metrics,,,,,,
Number of Spikes,1200,980,,1500,1430,1610
Weighted Mean Firing Rate (Hz),5.2,4.1,3.9,6.6,6.1,7.0
,,,,,,,
Measurement,ignored,,,,,,
";

    fn write_sample(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parses_block_and_marks_blank_cells_absent() {
        let f = write_sample(SAMPLE);
        let obs = parse_well_averages(f.path(), "P1", 0).unwrap();

        // 2 metric rows x 6 wells
        assert_eq!(obs.len(), 12);
        let spikes_a3 = obs
            .iter()
            .find(|o| o.metric == "Number of Spikes" && o.well == "A3")
            .unwrap();
        assert_eq!(spikes_a3.value, None);
        let rate_b3 = obs
            .iter()
            .find(|o| o.metric == "Weighted Mean Firing Rate (Hz)" && o.well == "B3")
            .unwrap();
        assert_eq!(rate_b3.value, Some(7.0));
        assert!(obs.iter().all(|o| o.plate == "P1" && o.timepoint == 0));
        // Treatment/ID and section header rows contribute nothing
        assert!(obs.iter().all(|o| o.metric != "Activity Metrics"));
    }

    #[test]
    fn missing_block_is_fatal_and_names_the_file() {
        let f = write_sample("Investigator,Jane Doe\nRecording Date,2026-01-15\n");
        let err = parse_well_averages(f.path(), "P1", 0).unwrap_err();
        match err {
            ParseError::BlockNotFound { path } => {
                assert!(path.contains(f.path().file_name().unwrap().to_str().unwrap()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_cell_is_fatal() {
        let bad = SAMPLE.replace("5.2,4.1", "5.2,N/A");
        let f = write_sample(&bad);
        let err = parse_well_averages(f.path(), "P1", 0).unwrap_err();
        match err {
            ParseError::NonNumeric {
                well, value, metric, ..
            } => {
                assert_eq!(well, "A2");
                assert_eq!(value, "N/A");
                assert_eq!(metric, "Weighted Mean Firing Rate (Hz)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_cell_is_fatal() {
        let bad = SAMPLE.replace("5.2,4.1", "5.2,NaN");
        let f = write_sample(&bad);
        let err = parse_well_averages(f.path(), "P1", 0).unwrap_err();
        assert!(matches!(err, ParseError::NonNumeric { ref value, .. } if value == "NaN"));
    }

    #[test]
    fn overlong_row_is_fatal() {
        let bad = SAMPLE.replace(
            "Number of Spikes,1200,980,,1500,1430,1610",
            "Number of Spikes,1200,980,,1500,1430,1610,42",
        );
        let f = write_sample(&bad);
        let err = parse_well_averages(f.path(), "P1", 0).unwrap_err();
        assert!(matches!(err, ParseError::ColumnCount { expected: 6, .. }));
    }

    #[test]
    fn block_without_metric_rows_is_fatal() {
        let f = write_sample("Well Averages,A1,A2\nTreatment/ID,,\n,,\n");
        let err = parse_well_averages(f.path(), "P1", 0).unwrap_err();
        assert!(matches!(err, ParseError::EmptyBlock { .. }));
    }

    #[test]
    fn quoted_metric_names_keep_their_commas() {
        let csv = "\
Well Averages,A1,A2
\"Burst Duration, Avg (sec)\",0.5,0.6
";
        let f = write_sample(csv);
        let obs = parse_well_averages(f.path(), "P1", 1).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].metric, "Burst Duration, Avg (sec)");
    }
}
