//! Integration tests for replaying a stream and exporting the parameter log.

use aerowatch::recording::exporter_csv::{export_csv, export_csv_to_file, CSV_HEADER};
use aerowatch::storage::config::AnalyticsConfig;
use aerowatch::telemetry::types::{AthleteProfile, Sample};
use aerowatch::world::surface::SurfaceTable;
use aerowatch::{AnalyticsEngine, TickReport};
use std::sync::Arc;

fn climb(count: i64) -> Vec<Sample> {
    (0..count)
        .map(|i| Sample {
            athlete_id: 3,
            world_time_ms: 10_000 + i * 500,
            elapsed_time_s: Some(30.0 + i as f64 * 0.5),
            power_w: 280.0,
            speed_kmh: 18.0,
            // 18 km/h for 0.5 s is 2.5 m, 0.1 m rise per tick: 4%
            altitude_m: 100.0 + i as f64 * 0.1,
            course_id: 13,
            road_id: 4,
            road_completion: 500_000,
            ..Default::default()
        })
        .collect()
}

fn replay(samples: &[Sample], config: AnalyticsConfig) -> (AnalyticsEngine, Vec<TickReport>) {
    let mut engine =
        AnalyticsEngine::with_defaults(config, Arc::new(SurfaceTable::builtin().unwrap()));
    let athlete = AthleteProfile {
        weight_kg: 70.0,
        height_m: 1.78,
    };
    let reports = samples
        .iter()
        .map(|s| engine.process(s, &athlete).clone())
        .collect();
    (engine, reports)
}

#[test]
fn test_climb_grade_and_surface() {
    let (_, reports) = replay(&climb(20), AnalyticsConfig::default());
    let last = reports.last().unwrap();

    assert!((last.grade_percent - 4.0).abs() < 1e-6);
    assert!((last.grade_percent_average - 4.0).abs() < 1e-6);
    assert_eq!(last.surface.as_deref(), Some("gravel"));
    assert!(last.cda_average.is_some());
}

#[test]
fn test_log_rows_match_reports() {
    let (engine, reports) = replay(&climb(12), AnalyticsConfig::default());
    let rows: Vec<_> = engine.log().rows().collect();
    assert_eq!(rows.len(), reports.len());

    for (row, report) in rows.iter().zip(&reports) {
        assert_eq!(row.time, report.world_time_ms);
        assert_eq!(row.gradient_percent, report.grade_percent);
        assert_eq!(row.crr, report.crr);
        assert_eq!(row.cda, report.cda);
        assert_eq!(row.rider_weight, 70.0);
        assert_eq!(row.height, 1.78);
        assert_eq!(row.cda_average_window_size_ms, 3000);
    }
}

#[test]
fn test_export_replayed_log() {
    let mut config = AnalyticsConfig::default();
    config.log.max_rows = 8;
    let (engine, _) = replay(&climb(12), config);

    let csv = export_csv(engine.log()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(lines.count(), 8);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("AeroWatch_test.csv");
    export_csv_to_file(engine.log(), &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), csv);
}

#[test]
fn test_reports_serialize_to_json() {
    let (_, reports) = replay(&climb(3), AnalyticsConfig::default());
    let json = serde_json::to_value(&reports[2]).unwrap();
    assert_eq!(json["athlete_id"], 3);
    assert_eq!(json["out_of_order"], false);
    assert_eq!(json["pull_draft"]["state"], "pulling");
}
