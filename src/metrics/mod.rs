//! Metrics module for derived riding parameters.

pub mod cda;
pub mod engine;
pub mod gradient;
pub mod pull_draft;
pub mod smoothing;

pub use cda::{CdaEstimator, CdaReading};
pub use engine::{AnalyticsEngine, EngineSet, TickReport};
pub use gradient::{GradientEstimator, GradientReading};
pub use pull_draft::{PullDraftSettings, PullDraftSnapshot, PullDraftTracker, RiderState, Segment};
pub use smoothing::{BoundedHistory, WindowedHistory};
