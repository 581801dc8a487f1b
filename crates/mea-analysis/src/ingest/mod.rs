//! Raw export ingestion.
//!
//! One raw export file corresponds to one time point. Discovery maps the
//! layout's declared file-name prefixes to files; the parser extracts the
//! per-well metric block from the instrument's heterogeneous CSV layout.

mod discovery;
mod parser;
mod types;

pub use discovery::discover_files;
pub use parser::parse_well_averages;
pub use types::RawObservation;
