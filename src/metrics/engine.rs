//! Per-athlete analytics engine.
//!
//! Runs every sample through the gradient estimator, the surface lookup,
//! the CdA estimator and the pull/draft tracker, in that order, and returns
//! a report of all derived values. One engine tracks one athlete; use
//! [`EngineSet`] to follow several athletes at once.

use crate::equipment::{BikeCatalog, BikeProfile, CrrSource};
use crate::metrics::cda::{CdaEstimator, CdaReading, CdaTick};
use crate::metrics::gradient::{GradientEstimator, GradientReading};
use crate::metrics::pull_draft::{PullDraftSnapshot, PullDraftTracker};
use crate::recording::log::ParameterLog;
use crate::recording::types::LogRow;
use crate::storage::config::AnalyticsConfig;
use crate::telemetry::types::{AthleteProfile, Sample};
use crate::world::surface::SurfaceTable;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Everything derived from one sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TickReport {
    pub athlete_id: u64,
    pub world_time_ms: i64,
    /// Time since the previous accepted sample
    pub delta_time_ms: f64,
    /// Instantaneous grade in percent
    pub grade_percent: f64,
    /// Smoothed grade in percent
    pub grade_percent_average: f64,
    /// Surface name, `None` if the road is not in the surface table
    pub surface: Option<String>,
    /// Rolling-resistance coefficient used
    pub crr: f64,
    /// Raw CdA for this tick, `None` if it could not be computed
    pub cda: Option<f64>,
    /// Smoothed CdA
    pub cda_average: Option<f64>,
    /// Smoothed CdA × 100 for display
    pub cda_display: Option<f64>,
    /// Pull/draft state after this tick
    pub pull_draft: PullDraftSnapshot,
    /// Rider weight, for W/kg display
    pub rider_weight_kg: f64,
    /// The sample went back in time and was not processed
    pub out_of_order: bool,
}

/// Time reference of the previous accepted sample.
#[derive(Debug, Clone, Copy)]
struct LastTick {
    athlete_id: u64,
    world_time_ms: i64,
}

/// Analytics pipeline for a single athlete.
#[derive(Debug)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    bike: BikeProfile,
    catalog: Arc<BikeCatalog>,
    surfaces: Arc<SurfaceTable>,
    gradient: GradientEstimator,
    cda: CdaEstimator,
    pull_draft: PullDraftTracker,
    log: ParameterLog,
    last_tick: Option<LastTick>,
    last_report: TickReport,
}

impl AnalyticsEngine {
    /// Create an engine from a configuration snapshot and the static reference data.
    pub fn new(config: AnalyticsConfig, catalog: Arc<BikeCatalog>, surfaces: Arc<SurfaceTable>) -> Self {
        let bike = catalog.select(&config.bike).clone();
        let cda_settings = &config.cda;
        Self {
            gradient: GradientEstimator::new(
                config.gradient.average_window(),
                cda_settings.history_length,
            ),
            cda: CdaEstimator::new(cda_settings.average_window(), cda_settings.history_length),
            pull_draft: PullDraftTracker::new(config.pull_draft),
            log: ParameterLog::new(config.log.max_rows),
            last_tick: None,
            last_report: TickReport::default(),
            bike,
            catalog,
            surfaces,
            config,
        }
    }

    /// Engine with the built-in bike catalog and the given surface table.
    pub fn with_defaults(config: AnalyticsConfig, surfaces: Arc<SurfaceTable>) -> Self {
        Self::new(config, Arc::new(BikeCatalog::builtin()), surfaces)
    }

    /// Replace the configuration. Takes effect from the next sample.
    pub fn reconfigure(&mut self, config: AnalyticsConfig) {
        if config == self.config {
            return;
        }
        self.bike = self.catalog.select(&config.bike).clone();
        self.gradient
            .reconfigure(config.gradient.average_window(), config.cda.history_length);
        self.cda
            .reconfigure(config.cda.average_window(), config.cda.history_length);
        self.pull_draft.reconfigure(config.pull_draft);
        self.log.set_max_rows(config.log.max_rows);
        tracing::debug!("Reconfigured engine, bike '{}'", self.bike.name);
        self.config = config;
    }

    /// Use a bike that is not in the catalog.
    pub fn set_bike(&mut self, bike: BikeProfile) {
        tracing::debug!("Bike set to '{}'", bike.name);
        self.config.bike = bike.name.clone();
        self.bike = bike;
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Bike used for the CdA calculation.
    pub fn bike(&self) -> &BikeProfile {
        &self.bike
    }

    /// Process one sample.
    pub fn process(&mut self, sample: &Sample, athlete: &AthleteProfile) -> &TickReport {
        if let Some(last) = self.last_tick {
            if last.athlete_id != sample.athlete_id {
                tracing::info!(
                    "Athlete changed from {} to {}, resetting",
                    last.athlete_id,
                    sample.athlete_id
                );
                self.reset_state();
            } else if sample.world_time_ms < last.world_time_ms {
                tracing::warn!(
                    "Dropping out-of-order sample for athlete {}: {} < {}",
                    sample.athlete_id,
                    sample.world_time_ms,
                    last.world_time_ms
                );
                self.last_report.out_of_order = true;
                return &self.last_report;
            }
        }

        let elapsed = self
            .last_tick
            .map(|last| Duration::from_millis((sample.world_time_ms - last.world_time_ms) as u64))
            .unwrap_or(Duration::ZERO);

        let grade: GradientReading =
            self.gradient
                .update(sample.altitude_m, sample.speed_kmh, elapsed);

        let resolution = self
            .surfaces
            .resolve_sample(sample, self.bike.tyre_type());
        let surface = resolution.surface.map(str::to_string);
        let crr = match self.bike.crr {
            CrrSource::Tyre(_) => resolution.crr,
            CrrSource::Fixed(crr) => crr,
        };

        let bike_weight_kg = self.bike.weight_kg + self.config.cda.extra_bike_weight_kg;
        let cda: CdaReading = self.cda.update(CdaTick {
            rider_weight_kg: athlete.weight_kg,
            bike_weight_kg,
            power_w: sample.power_w,
            speed_kmh: sample.speed_kmh,
            elapsed,
            grade_percent: grade.previous,
            crr,
        });

        self.pull_draft.update(sample);

        let delta_time_ms = elapsed.as_secs_f64() * 1000.0;
        if self.config.log.enabled {
            let row = LogRow {
                athlete_id: sample.athlete_id,
                time: sample.world_time_ms,
                delta_time_ms,
                power: sample.power_w,
                distance: sample.distance_m,
                altitude: sample.altitude_m,
                gradient_percent: grade.instantaneous,
                gradient_percent_average: grade.smoothed,
                grade: sample.grade,
                draft: sample.draft,
                speed_kph: sample.speed_kmh,
                height: athlete.height_m,
                rider_weight: athlete.weight_kg,
                bike_weight: bike_weight_kg,
                crr,
                cda: cda.instantaneous,
                cda_average: cda.smoothed,
                selected_bike: self.bike.name.clone(),
                cda_average_window_size_ms: self.config.cda.average_window_ms,
            };
            tracing::trace!(?row, "tick");
            self.log.push(row);
        }

        self.last_tick = Some(LastTick {
            athlete_id: sample.athlete_id,
            world_time_ms: sample.world_time_ms,
        });

        self.last_report = TickReport {
            athlete_id: sample.athlete_id,
            world_time_ms: sample.world_time_ms,
            delta_time_ms,
            grade_percent: grade.instantaneous,
            grade_percent_average: grade.smoothed,
            surface,
            crr,
            cda: cda.instantaneous,
            cda_average: cda.smoothed,
            cda_display: cda.display_value(),
            pull_draft: self.pull_draft.snapshot(),
            rider_weight_kg: athlete.weight_kg,
            out_of_order: false,
        };
        &self.last_report
    }

    /// Clear all running state. The parameter log is kept.
    pub fn reset(&mut self) {
        tracing::info!("Manual reset");
        self.reset_state();
        self.last_report = TickReport::default();
    }

    fn reset_state(&mut self) {
        self.gradient.reset();
        self.cda.reset();
        self.pull_draft.reset();
        self.last_tick = None;
    }

    /// Report of the latest processed sample.
    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Pull/draft tracker state.
    pub fn pull_draft(&self) -> &PullDraftTracker {
        &self.pull_draft
    }

    /// Parameter log of processed ticks.
    pub fn log(&self) -> &ParameterLog {
        &self.log
    }
}

/// Independent engines keyed by athlete id.
#[derive(Debug)]
pub struct EngineSet {
    config: AnalyticsConfig,
    catalog: Arc<BikeCatalog>,
    surfaces: Arc<SurfaceTable>,
    engines: HashMap<u64, AnalyticsEngine>,
}

impl EngineSet {
    /// Create an empty set; engines are created as athletes appear.
    pub fn new(config: AnalyticsConfig, catalog: Arc<BikeCatalog>, surfaces: Arc<SurfaceTable>) -> Self {
        Self {
            config,
            catalog,
            surfaces,
            engines: HashMap::new(),
        }
    }

    /// Route a sample to its athlete's engine, creating it on first sight.
    pub fn process(&mut self, sample: &Sample, athlete: &AthleteProfile) -> &TickReport {
        let engine = self.engines.entry(sample.athlete_id).or_insert_with(|| {
            tracing::info!("Tracking athlete {}", sample.athlete_id);
            AnalyticsEngine::new(
                self.config.clone(),
                Arc::clone(&self.catalog),
                Arc::clone(&self.surfaces),
            )
        });
        engine.process(sample, athlete)
    }

    /// Apply a new configuration to every engine.
    pub fn reconfigure(&mut self, config: AnalyticsConfig) {
        for engine in self.engines.values_mut() {
            engine.reconfigure(config.clone());
        }
        self.config = config;
    }

    /// Engine of one athlete, if it has been seen.
    pub fn get(&self, athlete_id: u64) -> Option<&AnalyticsEngine> {
        self.engines.get(&athlete_id)
    }

    /// Stop tracking an athlete.
    pub fn remove(&mut self, athlete_id: u64) -> Option<AnalyticsEngine> {
        self.engines.remove(&athlete_id)
    }

    /// Ids of all tracked athletes, in no particular order.
    pub fn athlete_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.engines.keys().copied()
    }

    /// Get the number of tracked athletes.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Check if no athlete is tracked.
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
