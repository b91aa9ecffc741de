//! CSV export of the parameter log.

use crate::recording::log::ParameterLog;
use crate::recording::types::{ExportError, LogRow};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column header of the exported log.
pub const CSV_HEADER: &str = "athleteId, time, deltaTimeMs, power, distance, altitude, gradientPercent, gradientPercentAverage, grade, draft, speedKph, height, riderWeight, bikeWeight, crr, cda, cdaAverage, selectedBike, cdaAverageWindowSizeMs";

/// Export the parameter log to CSV.
pub fn export_csv(log: &ParameterLog) -> Result<String, ExportError> {
    if log.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut output = Vec::new();

    writeln!(output, "{}", CSV_HEADER).map_err(|e| ExportError::WriteFailed(e.to_string()))?;

    for row in log.rows() {
        write_row(&mut output, row).map_err(|e| ExportError::WriteFailed(e.to_string()))?;
    }

    String::from_utf8(output).map_err(|e| ExportError::WriteFailed(e.to_string()))
}

fn write_row(output: &mut Vec<u8>, row: &LogRow) -> std::io::Result<()> {
    writeln!(
        output,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        row.athlete_id,
        row.time,
        row.delta_time_ms,
        row.power,
        row.distance,
        row.altitude,
        row.gradient_percent,
        row.gradient_percent_average,
        row.grade,
        row.draft,
        row.speed_kph,
        row.height,
        row.rider_weight,
        row.bike_weight,
        row.crr,
        row.cda.map_or(String::new(), |v| v.to_string()),
        row.cda_average.map_or(String::new(), |v| v.to_string()),
        quote_field(&row.selected_bike),
        row.cda_average_window_size_ms,
    )
}

/// Quote a text field if it contains a delimiter, quote or newline.
fn quote_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Export the parameter log to CSV and write it to a file.
pub fn export_csv_to_file(log: &ParameterLog, path: &Path) -> Result<(), ExportError> {
    let content = export_csv(log)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a default filename for a log export.
pub fn generate_csv_filename(at: DateTime<Local>) -> String {
    format!("AeroWatch_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Export destination for `target`: a directory gets a timestamped filename.
pub fn resolve_export_path(target: &Path, at: DateTime<Local>) -> PathBuf {
    if target.is_dir() {
        target.join(generate_csv_filename(at))
    } else {
        target.to_path_buf()
    }
}
