//! Unit tests for effective CdA estimation.

use aerowatch::metrics::cda::{
    effective_cda, CdaEstimator, CdaInputs, CdaTick, AIR_DENSITY, DEFAULT_CDA_WINDOW, GRAVITY,
};
use std::time::Duration;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn steady_tick(power_w: f64, speed_kmh: f64, elapsed: Duration) -> CdaTick {
    CdaTick {
        rider_weight_kg: 75.0,
        bike_weight_kg: 6.33,
        power_w,
        speed_kmh,
        elapsed,
        grade_percent: 0.0,
        crr: 0.004,
    }
}

#[test]
fn test_all_power_to_drag_on_frictionless_flat() {
    let v: f64 = 10.0;
    let cda = effective_cda(&CdaInputs {
        rider_weight_kg: 70.0,
        bike_weight_kg: 8.0,
        power_w: 300.0,
        speed_kmh: v * 3.6,
        previous_speed_kmh: v * 3.6,
        elapsed: ms(1000),
        grade_percent: 0.0,
        crr: 0.0,
    })
    .unwrap();
    // P = 0.5 * rho * CdA * v^3
    let expected = 2.0 * 300.0 / (AIR_DENSITY * v.powi(3));
    assert!((cda - expected).abs() < 1e-12);
}

#[test]
fn test_gravity_term_on_climb() {
    let inputs = CdaInputs {
        rider_weight_kg: 75.0,
        bike_weight_kg: 7.0,
        power_w: 250.0,
        speed_kmh: 18.0,
        previous_speed_kmh: 18.0,
        elapsed: ms(1000),
        grade_percent: 5.0,
        crr: 0.004,
    };
    let cda = effective_cda(&inputs).unwrap();

    let v = 5.0;
    let incline = (0.05f64).atan();
    let mass = 82.0;
    let resistance = mass * GRAVITY * incline.sin() + 0.004 * incline.cos() * mass * GRAVITY;
    let expected = 2.0 * (250.0 / v - resistance) / (AIR_DENSITY * v * v);
    assert!((cda - expected).abs() < 1e-12);
}

#[test]
fn test_negative_speed_is_unavailable() {
    let inputs = CdaInputs {
        speed_kmh: -5.0,
        ..Default::default()
    };
    assert_eq!(effective_cda(&inputs), None);
}

#[test]
fn test_first_tick_has_no_acceleration() {
    let mut estimator = CdaEstimator::new(DEFAULT_CDA_WINDOW, 200);
    let reading = estimator.update(steady_tick(200.0, 30.0, Duration::ZERO));

    let expected = effective_cda(&CdaInputs {
        rider_weight_kg: 75.0,
        bike_weight_kg: 6.33,
        power_w: 200.0,
        speed_kmh: 30.0,
        previous_speed_kmh: 30.0,
        elapsed: Duration::ZERO,
        grade_percent: 0.0,
        crr: 0.004,
    });
    assert_eq!(reading.instantaneous, expected);
    assert_eq!(reading.smoothed, expected);
}

#[test]
fn test_gap_uses_previous_power() {
    let mut estimator = CdaEstimator::new(DEFAULT_CDA_WINDOW, 200);
    estimator.update(steady_tick(200.0, 30.0, Duration::ZERO));

    let after_gap = estimator.update(steady_tick(400.0, 30.0, ms(1000)));
    assert_eq!(after_gap.power_used_w, 200.0);

    let regular = estimator.update(steady_tick(400.0, 30.0, ms(250)));
    assert_eq!(regular.power_used_w, 400.0);
}

#[test]
fn test_steady_ride_converges() {
    let mut estimator = CdaEstimator::new(DEFAULT_CDA_WINDOW, 200);
    let mut last = None;
    for i in 0..40 {
        let elapsed = if i == 0 { Duration::ZERO } else { ms(250) };
        last = estimator.update(steady_tick(200.0, 30.0, elapsed)).smoothed;
    }
    let smoothed = last.unwrap();
    let instantaneous = effective_cda(&CdaInputs {
        rider_weight_kg: 75.0,
        bike_weight_kg: 6.33,
        power_w: 200.0,
        speed_kmh: 30.0,
        previous_speed_kmh: 30.0,
        elapsed: ms(250),
        grade_percent: 0.0,
        crr: 0.004,
    })
    .unwrap();
    assert!(smoothed > 0.0);
    assert!((smoothed - instantaneous).abs() < 1e-9);
}

#[test]
fn test_display_value_is_scaled() {
    let mut estimator = CdaEstimator::new(DEFAULT_CDA_WINDOW, 200);
    let reading = estimator.update(steady_tick(200.0, 30.0, Duration::ZERO));
    let smoothed = reading.smoothed.unwrap();
    assert!((reading.display_value().unwrap() - smoothed * 100.0).abs() < 1e-12);
}

#[test]
fn test_reset_clears_smoothed() {
    let mut estimator = CdaEstimator::new(DEFAULT_CDA_WINDOW, 200);
    estimator.update(steady_tick(200.0, 30.0, Duration::ZERO));
    estimator.reset();
    assert_eq!(estimator.smoothed(), None);
}
