//! Raw export parsing errors.
//!
//! A malformed file is fatal for its plate: a partial parse could silently
//! corrupt every downstream statistic, so rows are never skipped to recover.

/// Errors raised while parsing a raw instrument export.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: 'Well Averages' block not found")]
    BlockNotFound { path: String },

    #[error("{path}: 'Well Averages' header row contains no well identifiers")]
    NoWells { path: String },

    #[error("{path}: 'Well Averages' block contains no metric rows")]
    EmptyBlock { path: String },

    #[error("{path} line {line}: metric '{metric}' has {got} value cells, expected at most {expected}")]
    ColumnCount {
        path: String,
        line: usize,
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("{path} line {line}: non-numeric value '{value}' for metric '{metric}', well {well}")]
    NonNumeric {
        path: String,
        line: usize,
        metric: String,
        well: String,
        value: String,
    },
}
