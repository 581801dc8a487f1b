//! Master table construction errors.

/// Errors raised while building the master table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(
        "Plate {plate}: duplicate observation for well {well}, time point {timepoint}, \
         metric '{metric}' (two input files map to the same time point?)"
    )]
    DuplicateObservation {
        plate: String,
        well: String,
        timepoint: u32,
        metric: String,
    },
}
