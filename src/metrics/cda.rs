//! Effective CdA from a quasi-static power balance.
//!
//! Power at the wheel is split into acceleration, rolling, gravity and
//! aerodynamic terms; whatever force the first three do not explain is
//! attributed to aerodynamic drag and converted back into a drag area.
//! Wind speed is taken as zero and drivetrain losses are ignored.

use crate::metrics::smoothing::WindowedHistory;
use std::time::Duration;

/// Air density in kg/m³.
pub const AIR_DENSITY: f64 = 1.204700132;
/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.81;
/// Default CdA smoothing window.
pub const DEFAULT_CDA_WINDOW: Duration = Duration::from_millis(3000);
/// Ticks further apart than this take the previous tick's power.
pub const STALE_POWER_GAP: Duration = Duration::from_millis(300);

/// Inputs of a single effective-CdA evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CdaInputs {
    /// Rider weight in kg
    pub rider_weight_kg: f64,
    /// Bike weight in kg
    pub bike_weight_kg: f64,
    /// Power in watts
    pub power_w: f64,
    /// Speed at this tick in km/h
    pub speed_kmh: f64,
    /// Speed at the previous tick in km/h
    pub previous_speed_kmh: f64,
    /// Time since the previous tick
    pub elapsed: Duration,
    /// Road grade in percent
    pub grade_percent: f64,
    /// Rolling-resistance coefficient
    pub crr: f64,
}

/// Instantaneous effective CdA in m².
///
/// Returns `None` when the speed is not positive or the result is not
/// finite. A zero `elapsed` contributes no acceleration force.
pub fn effective_cda(inputs: &CdaInputs) -> Option<f64> {
    let speed = inputs.speed_kmh / 3.6;
    if speed.is_nan() || speed <= 0.0 {
        return None;
    }
    let previous_speed = inputs.previous_speed_kmh / 3.6;
    let mass = inputs.rider_weight_kg + inputs.bike_weight_kg;

    let incline = (inputs.grade_percent / 100.0).atan();
    let gravity_force = mass * GRAVITY * incline.sin();
    let rolling_force = inputs.crr * incline.cos() * mass * GRAVITY;

    let elapsed_s = inputs.elapsed.as_secs_f64();
    let acceleration = if elapsed_s > 0.0 {
        (speed - previous_speed) / elapsed_s
    } else {
        0.0
    };
    let acceleration_force = acceleration * mass;

    let aero_force = inputs.power_w / speed - (acceleration_force + rolling_force + gravity_force);
    let cda = 2.0 * aero_force / (AIR_DENSITY * speed * speed);

    cda.is_finite().then_some(cda)
}

/// CdA values produced for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CdaReading {
    /// Raw CdA for this tick, `None` if it could not be computed
    pub instantaneous: Option<f64>,
    /// Time-window average, `None` until the first computable tick
    pub smoothed: Option<f64>,
    /// Power value that went into the calculation
    pub power_used_w: f64,
}

impl CdaReading {
    /// Smoothed CdA scaled by 100 for display.
    pub fn display_value(&self) -> Option<f64> {
        self.smoothed.map(|cda| cda * 100.0)
    }
}

/// Per-tick state needed by the estimator besides the sample itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CdaTick {
    pub rider_weight_kg: f64,
    pub bike_weight_kg: f64,
    pub power_w: f64,
    pub speed_kmh: f64,
    pub elapsed: Duration,
    /// Grade of the preceding tick
    pub grade_percent: f64,
    pub crr: f64,
}

/// Smoothed effective-CdA estimator.
#[derive(Debug, Clone)]
pub struct CdaEstimator {
    /// Speed at the previous tick
    previous_speed_kmh: Option<f64>,
    /// Power at the previous tick
    previous_power_w: Option<f64>,
    /// Raw CdA history
    history: WindowedHistory,
    /// Smoothing window
    window: Duration,
    /// Last smoothed value, carried over ticks that cannot be computed
    last_smoothed: Option<f64>,
}

impl CdaEstimator {
    /// Create an estimator with the given smoothing window and history capacity.
    pub fn new(window: Duration, history_length: usize) -> Self {
        Self {
            previous_speed_kmh: None,
            previous_power_w: None,
            history: WindowedHistory::new(history_length),
            window,
            last_smoothed: None,
        }
    }

    /// Feed one tick and return the updated CdA.
    ///
    /// The grade passed in is expected to be the preceding tick's raw grade,
    /// so it lines up with the speed change the current power produced.
    pub fn update(&mut self, tick: CdaTick) -> CdaReading {
        let previous_speed = self.previous_speed_kmh.unwrap_or(tick.speed_kmh);
        let previous_power = self.previous_power_w.unwrap_or(tick.power_w);
        let power_used_w = select_power(tick.power_w, previous_power, tick.elapsed);

        let instantaneous = effective_cda(&CdaInputs {
            rider_weight_kg: tick.rider_weight_kg,
            bike_weight_kg: tick.bike_weight_kg,
            power_w: power_used_w,
            speed_kmh: tick.speed_kmh,
            previous_speed_kmh: previous_speed,
            elapsed: tick.elapsed,
            grade_percent: tick.grade_percent,
            crr: tick.crr,
        });

        if let Some(cda) = instantaneous {
            self.history.push(cda, tick.elapsed);
            self.last_smoothed = self.history.average(self.window);
        }

        self.previous_speed_kmh = Some(tick.speed_kmh);
        self.previous_power_w = Some(tick.power_w);

        CdaReading {
            instantaneous,
            smoothed: self.last_smoothed,
            power_used_w,
        }
    }

    /// Change the smoothing window and history capacity.
    pub fn reconfigure(&mut self, window: Duration, history_length: usize) {
        self.window = window;
        self.history.set_capacity(history_length);
    }

    /// Last smoothed CdA.
    pub fn smoothed(&self) -> Option<f64> {
        self.last_smoothed
    }

    /// Forget all previous ticks.
    pub fn reset(&mut self) {
        self.previous_speed_kmh = None;
        self.previous_power_w = None;
        self.history.clear();
        self.last_smoothed = None;
    }
}

/// Current power, or the previous tick's power across a telemetry gap.
fn select_power(current_w: f64, previous_w: f64, elapsed: Duration) -> f64 {
    if elapsed > STALE_POWER_GAP {
        previous_w
    } else {
        current_w
    }
}
