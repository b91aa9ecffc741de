//! Unit tests for parameter log export.

use aerowatch::recording::exporter_csv::{export_csv, CSV_HEADER};
use aerowatch::recording::{ExportError, LogRow, ParameterLog};

fn row(time: i64) -> LogRow {
    LogRow {
        athlete_id: 7,
        time,
        delta_time_ms: 250.0,
        power: 210.0,
        speed_kph: 31.5,
        crr: 0.004,
        cda: Some(0.25),
        cda_average: Some(0.26),
        selected_bike: "Zwift Concept Z1 (Tron)".to_string(),
        cda_average_window_size_ms: 3000,
        ..Default::default()
    }
}

#[test]
fn test_header_columns() {
    let columns: Vec<&str> = CSV_HEADER.split(", ").collect();
    assert_eq!(columns.len(), 19);
    assert_eq!(columns[0], "athleteId");
    assert_eq!(columns[18], "cdaAverageWindowSizeMs");
}

#[test]
fn test_log_cap_limits_export() {
    let mut log = ParameterLog::new(5);
    for i in 0..20 {
        log.push(row(i * 250));
    }
    let csv = export_csv(&log).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 6);
    // Oldest retained row is the 16th pushed
    assert!(lines[1].starts_with("7,3750,"));
}

#[test]
fn test_empty_log_is_error() {
    assert!(matches!(export_csv(&ParameterLog::new(5)), Err(ExportError::NoData)));
}
