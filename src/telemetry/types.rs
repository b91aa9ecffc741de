//! Per-tick telemetry sample and athlete profile.
//!
//! Field names follow the live feed (camelCase), with aliases for the short
//! names some feeds use (`worldTime`, `speed`, `power`, ...).

use serde::{Deserialize, Serialize};

/// Road completion is reported as fixed-point progress in `0..=ROAD_COMPLETION_SCALE`.
pub const ROAD_COMPLETION_SCALE: u32 = 1_000_000;

/// One telemetry tick describing the rider's instantaneous state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sample {
    /// Athlete the sample belongs to
    pub athlete_id: u64,
    /// Monotonic stream clock in milliseconds
    #[serde(alias = "worldTime")]
    pub world_time_ms: i64,
    /// Elapsed ride time in seconds, if the feed reports it; zero or a
    /// backwards jump signals a reset
    #[serde(alias = "time")]
    pub elapsed_time_s: Option<f64>,
    /// Power in watts
    #[serde(alias = "power")]
    pub power_w: f64,
    /// Speed in km/h
    #[serde(alias = "speed")]
    pub speed_kmh: f64,
    /// Altitude in meters
    #[serde(alias = "altitude")]
    pub altitude_m: f64,
    /// Feed-supplied grade, informational only
    pub grade: f64,
    /// Draft indicator; zero means unshielded
    pub draft: f64,
    /// Distance in meters
    #[serde(alias = "distance")]
    pub distance_m: f64,
    /// Course identifier
    pub course_id: i64,
    /// Road identifier within the course
    pub road_id: i64,
    /// Fixed-point progress along the road (0..1e6)
    pub road_completion: u32,
    /// Travelling the road in reverse
    pub reverse: bool,
}

impl Sample {
    /// Whether the rider is unshielded from other riders' draft.
    pub fn is_unshielded(&self) -> bool {
        self.draft == 0.0
    }

    /// Road completion normalized to `[0, 1]` in the direction of travel.
    pub fn normalized_road_progress(&self) -> f64 {
        let completion = self.road_completion.min(ROAD_COMPLETION_SCALE);
        let directed = if self.reverse {
            ROAD_COMPLETION_SCALE - completion
        } else {
            completion
        };
        directed as f64 / ROAD_COMPLETION_SCALE as f64
    }
}

/// Athlete physical profile, supplied alongside every sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteProfile {
    /// Rider weight in kilograms
    #[serde(alias = "weight")]
    pub weight_kg: f64,
    /// Rider height in meters
    #[serde(alias = "height", default)]
    pub height_m: f64,
}

impl Default for AthleteProfile {
    fn default() -> Self {
        Self {
            weight_kg: 75.0,
            height_m: 1.8,
        }
    }
}

/// A sample paired with the athlete profile it was reported with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryTick {
    pub sample: Sample,
    #[serde(default)]
    pub athlete: AthleteProfile,
}
