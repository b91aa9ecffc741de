//! AeroWatch - live cycling telemetry analytics
//!
//! Derives road gradient, surface rolling resistance, effective CdA and
//! pull/draft statistics from a stream of per-athlete telemetry samples,
//! and keeps a bounded parameter log that can be exported to CSV.

pub mod equipment;
pub mod metrics;
pub mod recording;
pub mod storage;
pub mod telemetry;
pub mod world;

// Re-export commonly used types
pub use equipment::{BikeCatalog, BikeProfile};
pub use metrics::engine::{AnalyticsEngine, EngineSet, TickReport};
pub use recording::log::ParameterLog;
pub use storage::config::AnalyticsConfig;
pub use telemetry::types::{AthleteProfile, Sample, TelemetryTick};
pub use world::surface::SurfaceTable;
