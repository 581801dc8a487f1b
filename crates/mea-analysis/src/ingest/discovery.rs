//! Raw export file discovery by time-point prefix.

use std::path::{Path, PathBuf};

use tracing::debug;

use mea_core::config::{PlateLayout, TimepointSpec};
use mea_core::errors::ConfigError;

/// Map each declared time-point prefix to exactly one `.csv` file in
/// `data_dir`, returned in declared time-point order.
///
/// A prefix with no matching file, or with more than one, is a fatal
/// configuration error: silently skipping a time point or guessing between
/// candidates would corrupt the baseline alignment downstream.
pub fn discover_files(
    data_dir: &Path,
    layout: &PlateLayout,
) -> Result<Vec<(TimepointSpec, PathBuf)>, ConfigError> {
    let entries: Vec<PathBuf> = std::fs::read_dir(data_dir)
        .map_err(|_| ConfigError::FileNotFound {
            path: data_dir.display().to_string(),
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();

    let mut matched = Vec::with_capacity(layout.timepoints.len());
    for spec in &layout.timepoints {
        let candidates: Vec<&PathBuf> = entries
            .iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(&spec.prefix))
                    .unwrap_or(false)
            })
            .collect();

        match candidates.as_slice() {
            [] => {
                return Err(ConfigError::FileForPrefixMissing {
                    plate: layout.plate_id.clone(),
                    prefix: spec.prefix.clone(),
                    dir: data_dir.display().to_string(),
                })
            }
            [single] => {
                debug!(
                    plate = %layout.plate_id,
                    prefix = %spec.prefix,
                    file = %single.display(),
                    "matched raw export"
                );
                matched.push((spec.clone(), (*single).clone()));
            }
            many => {
                return Err(ConfigError::AmbiguousPrefixMatch {
                    plate: layout.plate_id.clone(),
                    prefix: spec.prefix.clone(),
                    count: many.len(),
                })
            }
        }
    }

    Ok(matched)
}
