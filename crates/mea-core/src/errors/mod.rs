//! Error handling for the MEA pipeline.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.
//!
//! Every user-visible failure names the offending plate, file, well, or
//! metric; a bare failure code is never surfaced.

pub mod config_error;
pub mod parse_error;
pub mod pipeline_error;
pub mod table_error;

pub use config_error::ConfigError;
pub use parse_error::ParseError;
pub use pipeline_error::PipelineError;
pub use table_error::TableError;
