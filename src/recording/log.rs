//! Capped in-memory parameter log.

use crate::metrics::smoothing::BoundedHistory;
use crate::recording::types::LogRow;

/// Default number of rows retained.
pub const DEFAULT_MAX_ROWS: usize = 3000;

/// Rolling log of per-tick parameters; the oldest rows are dropped once full.
#[derive(Debug, Clone)]
pub struct ParameterLog {
    rows: BoundedHistory<LogRow>,
}

impl Default for ParameterLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROWS)
    }
}

impl ParameterLog {
    /// Create an empty log holding at most `max_rows` rows.
    pub fn new(max_rows: usize) -> Self {
        Self {
            rows: BoundedHistory::new(max_rows),
        }
    }

    /// Append a row, dropping the oldest one if the log is full.
    pub fn push(&mut self, row: LogRow) {
        self.rows.push(row);
    }

    /// Rows from oldest to newest.
    pub fn rows(&self) -> impl Iterator<Item = &LogRow> {
        self.rows.iter()
    }

    /// Most recent row.
    pub fn latest(&self) -> Option<&LogRow> {
        self.rows.latest()
    }

    /// Change the row cap, keeping the newest rows.
    pub fn set_max_rows(&mut self, max_rows: usize) {
        self.rows.set_capacity(max_rows);
    }

    /// Get the row cap.
    pub fn max_rows(&self) -> usize {
        self.rows.capacity()
    }

    /// Get the number of rows in the log.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove all rows.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
