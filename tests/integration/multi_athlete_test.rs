//! Integration tests for tracking several athletes at once.

use aerowatch::equipment::BikeCatalog;
use aerowatch::metrics::pull_draft::RiderState;
use aerowatch::storage::config::AnalyticsConfig;
use aerowatch::telemetry::types::{AthleteProfile, Sample, TelemetryTick};
use aerowatch::world::surface::SurfaceTable;
use aerowatch::EngineSet;
use std::sync::Arc;

fn engine_set() -> EngineSet {
    EngineSet::new(
        AnalyticsConfig::default(),
        Arc::new(BikeCatalog::builtin()),
        Arc::new(SurfaceTable::builtin().unwrap()),
    )
}

fn sample(athlete_id: u64, world_time_ms: i64, draft: f64) -> Sample {
    Sample {
        athlete_id,
        world_time_ms,
        elapsed_time_s: Some(1.0 + world_time_ms as f64 / 1000.0),
        power_w: 250.0,
        speed_kmh: 40.0,
        altitude_m: 5.0,
        draft,
        ..Default::default()
    }
}

#[test]
fn test_interleaved_athletes_stay_independent() {
    let mut set = engine_set();
    let profile = AthleteProfile::default();

    for i in 0..60 {
        set.process(&sample(1, i * 250, 0.0), &profile);
        set.process(&sample(2, i * 250, 60.0), &profile);
    }

    let first = set.get(1).unwrap().last_report();
    let second = set.get(2).unwrap().last_report();
    assert_eq!(first.pull_draft.state, Some(RiderState::Pulling));
    assert_eq!(second.pull_draft.state, Some(RiderState::Drafting));
    assert!((first.pull_draft.pull_total.duration_s - 59.0 * 0.25).abs() < 1e-9);
    assert_eq!(first.pull_draft.draft_total.duration_s, 0.0);
    assert!((second.pull_draft.draft_total.duration_s - 59.0 * 0.25).abs() < 1e-9);

    // Interleaving never triggers an athlete reset inside an engine
    assert_eq!(first.delta_time_ms, 250.0);
    assert_eq!(set.get(1).unwrap().log().len(), 60);
}

#[test]
fn test_reconfigure_reaches_every_engine() {
    let mut set = engine_set();
    let profile = AthleteProfile::default();
    set.process(&sample(1, 0, 0.0), &profile);
    set.process(&sample(2, 0, 0.0), &profile);

    let mut config = AnalyticsConfig::default();
    config.pull_draft.pull_power_threshold_w = 300.0;
    set.reconfigure(config);

    for id in [1, 2] {
        let engine = set.get(id).unwrap();
        assert_eq!(engine.config().pull_draft.pull_power_threshold_w, 300.0);
    }

    // Engines created later pick up the new configuration too
    set.process(&sample(3, 0, 0.0), &profile);
    assert_eq!(set.get(3).unwrap().config().pull_draft.pull_power_threshold_w, 300.0);
    assert_eq!(set.len(), 3);
}

#[test]
fn test_ticks_parse_from_feed_json() {
    let line = r#"{"sample": {"athleteId": 9, "worldTime": 1500, "time": 12.5,
        "power": 230, "speed": 33.2, "altitude": 14.1, "draft": 0,
        "courseId": 6, "roadId": 5, "roadCompletion": 150000, "reverse": false},
        "athlete": {"weight": 68.5, "height": 1.75}}"#;
    let tick: TelemetryTick = serde_json::from_str(line).unwrap();
    assert_eq!(tick.sample.athlete_id, 9);
    assert_eq!(tick.sample.world_time_ms, 1500);
    assert_eq!(tick.athlete.weight_kg, 68.5);

    let mut set = engine_set();
    let report = set.process(&tick.sample, &tick.athlete);
    assert_eq!(report.surface.as_deref(), Some("wood"));
    assert_eq!(report.rider_weight_kg, 68.5);
}

#[test]
fn test_remove_athlete() {
    let mut set = engine_set();
    set.process(&sample(4, 0, 0.0), &AthleteProfile::default());
    assert!(set.remove(4).is_some());
    assert!(set.is_empty());
}
