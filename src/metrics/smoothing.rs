//! Bounded histories and time-weighted smoothing.
//!
//! Telemetry ticks do not arrive at a fixed rate, so averages here are
//! weighted by how long each value was valid rather than by sample count.

use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-capacity history that evicts its oldest entry once full.
///
/// Entries are stored oldest-first; the newest entry is always at the tail.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    /// Ring buffer of retained entries
    buffer: VecDeque<T>,
    /// Maximum number of retained entries
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    /// Create an empty history holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one so the latest value is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest entry if the history is full.
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.buffer.len() >= self.capacity {
            self.buffer.pop_front()
        } else {
            None
        };
        self.buffer.push_back(value);
        evicted
    }

    /// Remove and return the newest entry.
    pub fn pop_latest(&mut self) -> Option<T> {
        self.buffer.pop_back()
    }

    /// The newest entry.
    pub fn latest(&self) -> Option<&T> {
        self.buffer.back()
    }

    /// Iterate from newest to oldest.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter().rev()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Change the capacity, dropping the oldest entries if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// Get the maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of entries in the history.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// One entry of a windowed history: a value and how long it was valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedValue {
    pub value: f64,
    pub elapsed: Duration,
}

/// Value/elapsed-time history used for trailing time-window averages.
///
/// Storing both halves of the pair in one entry keeps the value and delta
/// sequences the same length by construction.
#[derive(Debug, Clone)]
pub struct WindowedHistory {
    entries: BoundedHistory<TimedValue>,
}

impl WindowedHistory {
    /// Create an empty history with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BoundedHistory::new(capacity),
        }
    }

    /// Record a value that was valid for `elapsed`.
    pub fn push(&mut self, value: f64, elapsed: Duration) {
        self.entries.push(TimedValue { value, elapsed });
    }

    /// The most recent raw value.
    pub fn latest(&self) -> Option<f64> {
        self.entries.latest().map(|entry| entry.value)
    }

    /// Trailing average over `window`. See [`time_window_average`].
    pub fn average(&self, window: Duration) -> Option<f64> {
        time_window_average(self.entries.iter_newest_first().copied(), window)
    }

    /// Change the capacity, keeping the newest entries.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.entries.set_capacity(capacity);
    }

    /// Get the number of entries in the history.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &TimedValue> {
        self.entries.iter()
    }
}

/// Time-weighted trailing average.
///
/// Walks `newest_first` accumulating elapsed time and `value * elapsed`
/// until the accumulated time reaches `window` or the entries run out, then
/// returns `sum(value * dt) / sum(dt)`.
///
/// If no time was accumulated (zero window, or only zero-length entries) the
/// newest raw value is returned instead. Returns `None` only for an empty
/// history.
pub fn time_window_average<I>(newest_first: I, window: Duration) -> Option<f64>
where
    I: IntoIterator<Item = TimedValue>,
{
    let window_ms = window.as_secs_f64() * 1000.0;
    let mut entries = newest_first.into_iter();
    let newest = entries.next()?;

    let mut accum_ms = 0.0;
    let mut accum_weighted = 0.0;
    let mut next = Some(newest);

    while let Some(entry) = next {
        if accum_ms >= window_ms {
            break;
        }
        let dt_ms = entry.elapsed.as_secs_f64() * 1000.0;
        accum_ms += dt_ms;
        accum_weighted += entry.value * dt_ms;
        next = entries.next();
    }

    if accum_ms > 0.0 {
        Some(accum_weighted / accum_ms)
    } else {
        Some(newest.value)
    }
}
