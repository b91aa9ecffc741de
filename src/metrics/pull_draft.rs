//! Pull/draft duration tracking.
//!
//! Every tick is classified as pulling (unshielded and at or above the power
//! threshold) or drafting. Time and energy accumulate into the running
//! segment while the classification holds. When it flips, a segment longer
//! than the minimum duration is committed to the history of the state that
//! ended. A shorter one is treated as classification noise: the latest
//! committed segment of the new state is taken back off its history and
//! merged into the running segment, so brief draft-flag flickers never show
//! up as history entries.

use crate::metrics::smoothing::BoundedHistory;
use crate::telemetry::types::Sample;
use serde::{Deserialize, Serialize};

/// Ticks at or below this speed do not accumulate time.
pub const MIN_MOVING_SPEED_KMH: f64 = 1.0;

/// Rider classification for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiderState {
    /// Leading, unshielded, at or above the power threshold
    Pulling,
    /// Shielded or below the power threshold
    Drafting,
}

impl RiderState {
    fn from_pulling(is_pulling: bool) -> Self {
        if is_pulling {
            RiderState::Pulling
        } else {
            RiderState::Drafting
        }
    }
}

impl std::fmt::Display for RiderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiderState::Pulling => write!(f, "Pulling"),
            RiderState::Drafting => write!(f, "Drafting"),
        }
    }
}

/// A stretch of riding in one state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    /// Duration in seconds
    pub duration_s: f64,
    /// Sum of power × dt, in joules
    pub energy_j: f64,
}

impl Segment {
    /// Average power in watts, `None` for an empty segment.
    pub fn avg_power_w(&self) -> Option<f64> {
        if self.duration_s > 0.0 {
            Some(self.energy_j / self.duration_s)
        } else {
            None
        }
    }

    /// Average power per kilogram of rider weight.
    pub fn avg_watts_per_kg(&self, weight_kg: f64) -> Option<f64> {
        if weight_kg > 0.0 {
            self.avg_power_w().map(|watts| watts / weight_kg)
        } else {
            None
        }
    }

    fn add(&mut self, other: &Segment) {
        self.duration_s += other.duration_s;
        self.energy_j += other.energy_j;
    }

    fn subtract(&mut self, other: &Segment) {
        self.duration_s -= other.duration_s;
        self.energy_j -= other.energy_j;
    }
}

/// Classification and noise-filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullDraftSettings {
    /// Minimum power in watts to count as pulling
    pub pull_power_threshold_w: f64,
    /// Segments no longer than this (seconds) are merged away as noise
    pub min_duration_s: f64,
    /// Completed segments retained per state
    pub history_length: usize,
}

impl Default for PullDraftSettings {
    fn default() -> Self {
        Self {
            pull_power_threshold_w: 0.0,
            min_duration_s: 7.0,
            history_length: 20,
        }
    }
}

/// Read-only view of the tracker after a tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PullDraftSnapshot {
    /// Current classification, `None` before the first tick
    pub state: Option<RiderState>,
    /// In-progress segment
    pub running: Segment,
    /// Session total while pulling, including the running segment
    pub pull_total: Segment,
    /// Session total while drafting, including the running segment
    pub draft_total: Segment,
    /// Completed pulls, most recent last
    pub pulls: Vec<Segment>,
    /// Completed drafts, most recent last
    pub drafts: Vec<Segment>,
}

/// Two-state pull/draft tracker with flicker suppression.
#[derive(Debug, Clone)]
pub struct PullDraftTracker {
    settings: PullDraftSettings,
    /// Duration and energy of the in-progress segment
    running: Segment,
    /// Classification of the latest tick
    current: Option<RiderState>,
    /// Classification of the tick before
    previous: Option<RiderState>,
    pulls: BoundedHistory<Segment>,
    drafts: BoundedHistory<Segment>,
    /// Committed totals; unaffected by history eviction
    pull_committed: Segment,
    draft_committed: Segment,
    /// World time of the previous tick in seconds
    last_time_s: Option<f64>,
    /// Elapsed ride time of the previous tick
    last_elapsed_s: Option<f64>,
    /// Athlete of the previous tick
    athlete_id: Option<u64>,
}

impl PullDraftTracker {
    /// Create a tracker with the given settings.
    pub fn new(settings: PullDraftSettings) -> Self {
        Self {
            settings,
            running: Segment::default(),
            current: None,
            previous: None,
            pulls: BoundedHistory::new(settings.history_length),
            drafts: BoundedHistory::new(settings.history_length),
            pull_committed: Segment::default(),
            draft_committed: Segment::default(),
            last_time_s: None,
            last_elapsed_s: None,
            athlete_id: None,
        }
    }

    /// Replace the settings. Applies from the next tick.
    pub fn reconfigure(&mut self, settings: PullDraftSettings) {
        self.pulls.set_capacity(settings.history_length);
        self.drafts.set_capacity(settings.history_length);
        self.settings = settings;
    }

    /// Current settings.
    pub fn settings(&self) -> &PullDraftSettings {
        &self.settings
    }

    /// Whether a sample counts as pulling under the current settings.
    pub fn is_pulling(&self, sample: &Sample) -> bool {
        sample.is_unshielded() && sample.power_w >= self.settings.pull_power_threshold_w
    }

    /// Process one sample.
    pub fn update(&mut self, sample: &Sample) -> RiderState {
        if self.needs_reset(sample) {
            if self.athlete_id.is_some() {
                tracing::info!(
                    "Resetting pull/draft tracking for athlete {}",
                    sample.athlete_id
                );
            }
            self.reset();
        }
        self.athlete_id = Some(sample.athlete_id);
        if sample.elapsed_time_s.is_some() {
            self.last_elapsed_s = sample.elapsed_time_s;
        }

        let time_s = sample.world_time_ms as f64 / 1000.0;
        let elapsed_s = self.last_time_s.map(|last| time_s - last);
        let state = RiderState::from_pulling(self.is_pulling(sample));

        if Some(state) == self.previous {
            if let Some(dt) = elapsed_s {
                if dt >= 0.0 && sample.speed_kmh > MIN_MOVING_SPEED_KMH {
                    self.running.duration_s += dt;
                    self.running.energy_j += sample.power_w * dt;
                }
            }
        } else {
            self.transition(state);
        }

        self.current = Some(state);
        self.previous = Some(state);
        self.last_time_s = Some(match self.last_time_s {
            Some(last) => last.max(time_s),
            None => time_s,
        });
        state
    }

    /// Handle a flip into `state`.
    fn transition(&mut self, state: RiderState) {
        match self.previous {
            Some(ended) if self.running.duration_s > self.settings.min_duration_s => {
                let segment = self.running;
                tracing::debug!(
                    "{} segment committed: {:.1}s, {:?} W avg",
                    ended,
                    segment.duration_s,
                    segment.avg_power_w()
                );
                self.commit(ended, segment);
                self.running = Segment::default();
            }
            _ => {
                if let Some(resumed) = self.pop_latest(state) {
                    tracing::debug!(
                        "Short segment of {:.1}s merged back into previous {} segment",
                        self.running.duration_s,
                        state
                    );
                    self.running.add(&resumed);
                }
            }
        }
    }

    fn needs_reset(&self, sample: &Sample) -> bool {
        let athlete_changed = self
            .athlete_id
            .is_some_and(|id| id != sample.athlete_id);
        let clock_reset = sample.elapsed_time_s.is_some_and(|elapsed| {
            elapsed <= 0.0 || self.last_elapsed_s.is_some_and(|last| elapsed < last)
        });
        athlete_changed || clock_reset
    }

    fn commit(&mut self, state: RiderState, segment: Segment) {
        match state {
            RiderState::Pulling => {
                self.pulls.push(segment);
                self.pull_committed.add(&segment);
            }
            RiderState::Drafting => {
                self.drafts.push(segment);
                self.draft_committed.add(&segment);
            }
        }
    }

    fn pop_latest(&mut self, state: RiderState) -> Option<Segment> {
        let (history, committed) = match state {
            RiderState::Pulling => (&mut self.pulls, &mut self.pull_committed),
            RiderState::Drafting => (&mut self.drafts, &mut self.draft_committed),
        };
        let segment = history.pop_latest()?;
        committed.subtract(&segment);
        Some(segment)
    }

    /// Clear all segments and running totals.
    pub fn reset(&mut self) {
        self.running = Segment::default();
        self.current = None;
        self.previous = None;
        self.pulls.clear();
        self.drafts.clear();
        self.pull_committed = Segment::default();
        self.draft_committed = Segment::default();
        self.last_time_s = None;
        self.last_elapsed_s = None;
        self.athlete_id = None;
    }

    /// Current classification, `None` before the first tick.
    pub fn state(&self) -> Option<RiderState> {
        self.current
    }

    /// In-progress segment.
    pub fn running(&self) -> Segment {
        self.running
    }

    /// Completed segments of one state, most recent last.
    pub fn history(&self, state: RiderState) -> impl Iterator<Item = &Segment> {
        match state {
            RiderState::Pulling => self.pulls.iter(),
            RiderState::Drafting => self.drafts.iter(),
        }
    }

    /// Session total for one state, including the running segment.
    pub fn total(&self, state: RiderState) -> Segment {
        let mut total = match state {
            RiderState::Pulling => self.pull_committed,
            RiderState::Drafting => self.draft_committed,
        };
        if self.current == Some(state) {
            total.add(&self.running);
        }
        total
    }

    /// Snapshot of the tracker state.
    pub fn snapshot(&self) -> PullDraftSnapshot {
        PullDraftSnapshot {
            state: self.current,
            running: self.running,
            pull_total: self.total(RiderState::Pulling),
            draft_total: self.total(RiderState::Drafting),
            pulls: self.pulls.iter().copied().collect(),
            drafts: self.drafts.iter().copied().collect(),
        }
    }
}

impl Default for PullDraftTracker {
    fn default() -> Self {
        Self::new(PullDraftSettings::default())
    }
}

/// Format seconds as `m:ss`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
