//! Road gradient from consecutive altitude and speed samples.

use crate::metrics::smoothing::WindowedHistory;
use std::time::Duration;

/// Default smoothing window for the displayed gradient.
pub const DEFAULT_GRADIENT_WINDOW: Duration = Duration::from_millis(500);

/// Gradient values produced for one tick, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GradientReading {
    /// Instantaneous grade for this tick
    pub instantaneous: f64,
    /// Instantaneous grade of the preceding tick
    pub previous: f64,
    /// Time-window average of the instantaneous grade
    pub smoothed: f64,
}

/// Estimates road grade from altitude change over distance travelled.
///
/// Distance is derived from speed and elapsed time. When the rider does not
/// move the last grade is held rather than dropping to zero.
#[derive(Debug, Clone)]
pub struct GradientEstimator {
    /// Altitude at the previous tick
    previous_altitude_m: Option<f64>,
    /// Latest instantaneous grade
    grade_percent: f64,
    /// Instantaneous grade of the tick before the latest one
    previous_grade_percent: f64,
    /// Grade history for smoothing
    history: WindowedHistory,
    /// Smoothing window
    window: Duration,
}

impl GradientEstimator {
    /// Create an estimator with the given smoothing window and history capacity.
    pub fn new(window: Duration, history_length: usize) -> Self {
        Self {
            previous_altitude_m: None,
            grade_percent: 0.0,
            previous_grade_percent: 0.0,
            history: WindowedHistory::new(history_length),
            window,
        }
    }

    /// Feed one tick and return the updated grade.
    ///
    /// `elapsed` is the time since the previous tick (zero on the first one).
    pub fn update(&mut self, altitude_m: f64, speed_kmh: f64, elapsed: Duration) -> GradientReading {
        self.previous_grade_percent = self.grade_percent;

        match self.previous_altitude_m {
            None => self.grade_percent = 0.0,
            Some(previous_altitude) => {
                let distance_m = distance_travelled_m(speed_kmh, elapsed);
                if distance_m > 0.0 {
                    self.grade_percent = 100.0 * (altitude_m - previous_altitude) / distance_m;
                }
            }
        }
        self.previous_altitude_m = Some(altitude_m);

        self.history.push(self.grade_percent, elapsed);
        let smoothed = self.history.average(self.window).unwrap_or(self.grade_percent);

        GradientReading {
            instantaneous: self.grade_percent,
            previous: self.previous_grade_percent,
            smoothed,
        }
    }

    /// Change the smoothing window and history capacity.
    pub fn reconfigure(&mut self, window: Duration, history_length: usize) {
        self.window = window;
        self.history.set_capacity(history_length);
    }

    /// Latest instantaneous grade in percent.
    pub fn grade_percent(&self) -> f64 {
        self.grade_percent
    }

    /// Forget all previous ticks.
    pub fn reset(&mut self) {
        self.previous_altitude_m = None;
        self.grade_percent = 0.0;
        self.previous_grade_percent = 0.0;
        self.history.clear();
    }
}

/// Distance covered at `speed_kmh` over `elapsed`, computed as
/// `speed_kmh * elapsed_ms / 3600`.
///
/// km/h times milliseconds divided by 3600 is meters, so the millisecond
/// delta needs no further scaling here.
pub fn distance_travelled_m(speed_kmh: f64, elapsed: Duration) -> f64 {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    speed_kmh * elapsed_ms / 3600.0
}
