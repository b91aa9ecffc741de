//! Parameter log row and export error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All intermediate quantities of one processed tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub athlete_id: u64,
    /// World time in milliseconds
    pub time: i64,
    pub delta_time_ms: f64,
    pub power: f64,
    pub distance: f64,
    pub altitude: f64,
    pub gradient_percent: f64,
    pub gradient_percent_average: f64,
    /// Feed-supplied grade
    pub grade: f64,
    pub draft: f64,
    pub speed_kph: f64,
    pub height: f64,
    pub rider_weight: f64,
    pub bike_weight: f64,
    pub crr: f64,
    /// Raw CdA, `None` when it could not be computed
    pub cda: Option<f64>,
    pub cda_average: Option<f64>,
    pub selected_bike: String,
    pub cda_average_window_size_ms: u64,
}

/// Errors during parameter log export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing recorded yet
    #[error("Log has no data to export")]
    NoData,

    /// Failed to write export data
    #[error("Failed to write data: {0}")]
    WriteFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
