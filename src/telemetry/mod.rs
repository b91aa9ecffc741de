//! Live telemetry input types.

pub mod types;

pub use types::{AthleteProfile, Sample, TelemetryTick};
