//! Configuration errors.
//!
//! All of these are fatal before any data is processed: downstream
//! correctness depends on a complete, unambiguous configuration.

/// Errors raised while loading or validating configuration, or when raw
/// data references configuration that does not exist.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Metric '{metric}' is declared more than once in the metrics config")]
    DuplicateMetric { metric: String },

    #[error("Metric category '{category}' has no declared missing-value rule")]
    MissingRule { category: String },

    #[error("Plate {plate}: unknown metric '{metric}' in raw data (not in metrics config)")]
    UnknownMetric { plate: String, metric: String },

    #[error("Plate {plate}: well {well} assigned to both '{first}' and '{second}'")]
    DuplicateWell {
        plate: String,
        well: String,
        first: String,
        second: String,
    },

    #[error("Plate {plate}: invalid well identifier '{well}'")]
    InvalidWell { plate: String, well: String },

    #[error("Plate {plate}: well {well} appears in raw data but has no condition assignment")]
    UnassignedWell { plate: String, well: String },

    #[error("Plate {plate}: layout declares no time points")]
    NoTimepoints { plate: String },

    #[error("Plate {plate}: no time point is flagged as baseline")]
    NoBaseline { plate: String },

    #[error("Plate {plate}: {count} time points flagged as baseline, expected exactly one")]
    AmbiguousBaseline { plate: String, count: usize },

    #[error("Plate {plate}: baseline prefix '{prefix}' is not the earliest declared time point")]
    BaselineNotEarliest { plate: String, prefix: String },

    #[error("Plate {plate}: time point prefix '{prefix}' is declared more than once")]
    DuplicatePrefix { plate: String, prefix: String },

    #[error("Plate {plate}: no file matching prefix '{prefix}' in {dir}")]
    FileForPrefixMissing {
        plate: String,
        prefix: String,
        dir: String,
    },

    #[error("Plate {plate}: {count} files match prefix '{prefix}', expected exactly one")]
    AmbiguousPrefixMatch {
        plate: String,
        prefix: String,
        count: usize,
    },

    #[error("Invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}
