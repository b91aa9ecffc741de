//! Parameter logging and export.

pub mod exporter_csv;
pub mod log;
pub mod types;

pub use log::ParameterLog;
pub use types::{ExportError, LogRow};
