//! Unit tests for gradient estimation.

use aerowatch::metrics::gradient::{distance_travelled_m, GradientEstimator, DEFAULT_GRADIENT_WINDOW};
use std::time::Duration;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Known quantity: distance is `speed_kmh * elapsed_ms / 3600`, which comes
/// out in meters. Any change to this formula shifts every grade value.
#[test]
fn test_distance_known_quantity() {
    assert!((distance_travelled_m(36.0, ms(1000)) - 10.0).abs() < 1e-12);
    assert!((distance_travelled_m(30.0, ms(250)) - 30.0 * 250.0 / 3600.0).abs() < 1e-12);
    assert_eq!(distance_travelled_m(30.0, Duration::ZERO), 0.0);
}

#[test]
fn test_descent_is_negative() {
    let mut estimator = GradientEstimator::new(DEFAULT_GRADIENT_WINDOW, 200);
    estimator.update(50.0, 18.0, Duration::ZERO);
    // 18 km/h over 2 s is 10 m, 0.3 m drop
    let reading = estimator.update(49.7, 18.0, ms(2000));
    assert!((reading.instantaneous + 3.0).abs() < 1e-9);
}

#[test]
fn test_duplicate_tick_holds_grade() {
    let mut estimator = GradientEstimator::new(DEFAULT_GRADIENT_WINDOW, 200);
    estimator.update(100.0, 36.0, Duration::ZERO);
    let climbing = estimator.update(100.4, 36.0, ms(1000));

    let duplicate = estimator.update(100.4, 36.0, Duration::ZERO);
    assert_eq!(duplicate.instantaneous, climbing.instantaneous);
}

#[test]
fn test_reconfigure_changes_window() {
    let mut estimator = GradientEstimator::new(ms(500), 200);
    estimator.update(100.0, 36.0, Duration::ZERO);
    estimator.update(100.5, 36.0, ms(1000)); // 5%
    let narrow = estimator.update(100.5, 36.0, ms(1000)); // 0%
    assert_eq!(narrow.smoothed, 0.0);

    estimator.reconfigure(ms(2000), 200);
    let wide = estimator.update(100.5, 36.0, ms(1000)); // 0%
    // 0% over the newest 2000 ms
    assert_eq!(wide.smoothed, 0.0);
    assert_eq!(estimator.grade_percent(), 0.0);
}
