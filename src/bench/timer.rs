use super::Strategy;
use crate::error::Error;
use serde::Serialize;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Lower bound on the measured interval, keeps throughput finite.
const MIN_ELAPSED_SECS: f64 = 1e-9;

/// A unit of concurrent work (one record or one batch) that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFailure {
    /// Index of the first record in the unit.
    pub first_index: u64,
    pub record_count: u64,
    pub attempts: u32,
    pub error: Error,
}

/// What the dispatch phase of a strategy produced.
#[derive(Debug, Default)]
pub(crate) struct DispatchOutcome {
    pub dispatched_units: u64,
    pub completed_units: u64,
    pub failures: Vec<UnitFailure>,
}

/// Start of a measured interval. Consumed by [`RunTimer::finish`].
#[derive(Debug)]
pub struct RunTimer {
    started_at: SystemTime,
    start: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self {
            started_at: SystemTime::now(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub(crate) fn finish(
        self,
        strategy: Strategy,
        record_count: u64,
        outcome: DispatchOutcome,
    ) -> BenchmarkRun {
        let elapsed = self.start.elapsed();
        BenchmarkRun {
            strategy,
            record_count,
            started_at: self.started_at,
            finished_at: self.started_at + elapsed,
            elapsed,
            dispatched_units: outcome.dispatched_units,
            completed_units: outcome.completed_units,
            failures: outcome.failures,
        }
    }
}

/// Result of one harness invocation.
///
/// `record_count` counts dispatched records. Records of failed units are
/// included, so throughput is an upper bound when `failures` is non-empty.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    pub strategy: Strategy,
    pub record_count: u64,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
    pub elapsed: Duration,
    pub dispatched_units: u64,
    pub completed_units: u64,
    pub failures: Vec<UnitFailure>,
}

impl BenchmarkRun {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64().max(MIN_ELAPSED_SECS)
    }

    /// Records per second over the measured interval.
    pub fn throughput(&self) -> f64 {
        self.record_count as f64 / self.elapsed_secs()
    }

    pub fn failed_units(&self) -> usize {
        self.failures.len()
    }

    pub fn failed_records(&self) -> u64 {
        self.failures.iter().map(|f| f.record_count).sum()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            strategy: self.strategy,
            record_count: self.record_count,
            started_at_ms: epoch_millis(self.started_at),
            finished_at_ms: epoch_millis(self.finished_at),
            elapsed_ms: self.elapsed.as_secs_f64() * 1000.0,
            throughput: self.throughput(),
            dispatched_units: self.dispatched_units,
            completed_units: self.completed_units,
            failed_units: self.failed_units(),
            failures: self
                .failures
                .iter()
                .map(|f| FailureSummary {
                    first_index: f.first_index,
                    record_count: f.record_count,
                    attempts: f.attempts,
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    pub first_index: u64,
    pub record_count: u64,
    pub attempts: u32,
    pub error: String,
}

/// Serializable view of a [`BenchmarkRun`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub strategy: Strategy,
    pub record_count: u64,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub elapsed_ms: f64,
    pub throughput: f64,
    pub dispatched_units: u64,
    pub completed_units: u64,
    pub failed_units: usize,
    pub failures: Vec<FailureSummary>,
}

fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
