//! Storage module for configuration.

pub mod config;

pub use config::{AnalyticsConfig, ConfigError};
