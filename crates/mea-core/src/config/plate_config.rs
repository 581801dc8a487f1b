//! Plate layout: well -> condition assignments and time-point ordering.
//!
//! The layout is user-authored YAML, one file per plate. Wells are validated
//! and normalized (trimmed, uppercased) at load; a well assigned to two
//! conditions is a configuration error, never a silent drop. Time points are
//! declared in recording order; the file-name prefix of each maps raw exports
//! to time-point indices, and exactly one must be flagged as baseline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::collections::{FxHashMap, FxHashSet};

/// One declared recording session for a plate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimepointSpec {
    /// Position in the declared ordering; the time-point id of every
    /// observation parsed from the matching file.
    pub index: u32,
    /// File-name prefix identifying this time point's raw export (e.g. "0_").
    pub prefix: String,
    /// Human-readable label for reports (e.g. "Baseline", "48h").
    pub label: String,
    /// Whether this is the baseline time point.
    pub baseline: bool,
}

/// Condition assignment for one well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellAssignment {
    pub plate: String,
    pub well: String,
    pub condition: String,
    /// Display color for downstream plotting, carried through unchanged.
    pub condition_color: Option<String>,
}

/// Validated layout for one plate.
#[derive(Debug, Clone)]
pub struct PlateLayout {
    pub plate_id: String,
    /// Directory holding this plate's raw exports, if declared.
    pub data_dir: Option<PathBuf>,
    /// Well id -> assignment. Exactly one entry per assigned well.
    pub assignments: FxHashMap<String, WellAssignment>,
    /// Wells dropped up front (bad electrodes etc.); every dropped
    /// observation is still logged by the table builder.
    pub ignore_wells: FxHashSet<String>,
    /// Declared time points, in recording order, indices 0..n.
    pub timepoints: Vec<TimepointSpec>,
}

// --- on-disk shape ---

#[derive(Debug, Deserialize)]
struct LayoutFile {
    experiment: ExperimentSection,
    conditions: BTreeMap<String, ConditionSpec>,
    #[serde(default)]
    ignore_wells: Vec<String>,
    time_points: Vec<TimepointEntry>,
}

#[derive(Debug, Deserialize)]
struct ExperimentSection {
    plate_id: String,
    data_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConditionSpec {
    color: Option<String>,
    wells: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TimepointEntry {
    prefix: String,
    label: String,
    #[serde(default)]
    baseline: bool,
}

impl PlateLayout {
    /// Load and validate a plate layout from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Parse and validate a layout from a YAML string (`label` names the source in errors).
    pub fn from_yaml(yaml: &str, label: &str) -> Result<Self, ConfigError> {
        let file: LayoutFile = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            path: label.to_string(),
            message: e.to_string(),
        })?;

        let plate_id = file.experiment.plate_id;

        let mut assignments: FxHashMap<String, WellAssignment> = FxHashMap::default();
        for (condition, spec) in &file.conditions {
            for raw_well in &spec.wells {
                let well = normalize_well(raw_well, &plate_id)?;
                if let Some(existing) = assignments.get(&well) {
                    return Err(ConfigError::DuplicateWell {
                        plate: plate_id.clone(),
                        well,
                        first: existing.condition.clone(),
                        second: condition.clone(),
                    });
                }
                assignments.insert(
                    well.clone(),
                    WellAssignment {
                        plate: plate_id.clone(),
                        well,
                        condition: condition.clone(),
                        condition_color: spec.color.clone(),
                    },
                );
            }
        }

        let mut ignore_wells = FxHashSet::default();
        for raw_well in &file.ignore_wells {
            ignore_wells.insert(normalize_well(raw_well, &plate_id)?);
        }

        let timepoints = validate_timepoints(file.time_points, &plate_id)?;

        Ok(Self {
            plate_id,
            data_dir: file.experiment.data_dir.map(PathBuf::from),
            assignments,
            ignore_wells,
            timepoints,
        })
    }

    /// The baseline time point. Validation guarantees it exists and is first.
    pub fn baseline(&self) -> &TimepointSpec {
        &self.timepoints[0]
    }
}

/// Trim, uppercase, and validate a well identifier (row letter + column number).
fn normalize_well(raw: &str, plate: &str) -> Result<String, ConfigError> {
    let well = raw.trim().to_uppercase();
    let mut chars = well.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && !well[1..].is_empty()
        && well[1..].chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(ConfigError::InvalidWell {
            plate: plate.to_string(),
            well: raw.trim().to_string(),
        });
    }
    Ok(well)
}

/// Assign indices and enforce the baseline invariants:
/// exactly one baseline flag, and it must be the earliest declared time point.
fn validate_timepoints(
    entries: Vec<TimepointEntry>,
    plate: &str,
) -> Result<Vec<TimepointSpec>, ConfigError> {
    if entries.is_empty() {
        return Err(ConfigError::NoTimepoints {
            plate: plate.to_string(),
        });
    }

    let mut seen_prefixes = FxHashSet::default();
    for entry in &entries {
        if !seen_prefixes.insert(entry.prefix.clone()) {
            return Err(ConfigError::DuplicatePrefix {
                plate: plate.to_string(),
                prefix: entry.prefix.clone(),
            });
        }
    }

    let baseline_count = entries.iter().filter(|t| t.baseline).count();
    match baseline_count {
        1 => {}
        0 => {
            return Err(ConfigError::NoBaseline {
                plate: plate.to_string(),
            })
        }
        n => {
            return Err(ConfigError::AmbiguousBaseline {
                plate: plate.to_string(),
                count: n,
            })
        }
    }
    if !entries[0].baseline {
        let prefix = entries
            .iter()
            .find(|t| t.baseline)
            .map(|t| t.prefix.clone())
            .unwrap_or_default();
        return Err(ConfigError::BaselineNotEarliest {
            plate: plate.to_string(),
            prefix,
        });
    }

    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(i, t)| TimepointSpec {
            index: i as u32,
            prefix: t.prefix,
            label: t.label,
            baseline: t.baseline,
        })
        .collect())
}
