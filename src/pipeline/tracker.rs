//! Progress tracker: processed count, percentage and a mean-duration ETA.

use crate::types::ProgressSnapshot;

/// ETA is `mean(observed durations) × remaining`, unweighted. Not thread-safe by itself;
/// the pipeline calls it from its single completion loop.
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    processed: usize,
    durations_millis: Vec<u64>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            durations_millis: Vec::with_capacity(total),
        }
    }

    /// Record one counted completion and return the new snapshot.
    pub fn on_completion(&mut self, duration_millis: u64) -> ProgressSnapshot {
        debug_assert!(self.processed < self.total, "more completions than items");
        self.processed = (self.processed + 1).min(self.total);
        self.durations_millis.push(duration_millis);
        self.snapshot()
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let percentage = if self.total == 0 {
            100.0
        } else {
            self.processed as f64 / self.total as f64 * 100.0
        };
        ProgressSnapshot {
            processed: self.processed,
            total: self.total,
            percentage,
            eta_millis: self.eta_millis(),
        }
    }

    fn eta_millis(&self) -> u64 {
        if self.durations_millis.is_empty() {
            return 0;
        }
        let sum: u128 = self.durations_millis.iter().map(|&d| u128::from(d)).sum();
        let mean = sum as f64 / self.durations_millis.len() as f64;
        let remaining = self.total - self.processed;
        (mean * remaining as f64).round() as u64
    }
}
