//! Write throughput harness.
//!
//! Three strategies over the same synthetic records:
//! - `Serial`: one write call per record, each awaited before the next.
//! - `Concurrent`: one write call per record, fanned out over a bounded pool.
//! - `Batched`: records grouped into fixed-size chunks, one batched write call
//!   per chunk, chunks fanned out over the pool.
//!
//! Concurrent failures never stop sibling units. They travel back over a
//! channel and are drained once every unit has finished.

pub mod record;
pub mod retry;
pub mod session;
pub mod timer;

pub use record::{record_key, SyntheticRecord, FIELD_COUNT};
pub use retry::RetryPolicy;
pub use session::BenchmarkSession;
pub use timer::{BenchmarkRun, FailureSummary, RunSummary, RunTimer, UnitFailure};

use crate::config::DEFAULT_BATCH_SIZE;
use crate::error::{Error, Result};
use crate::store::{Put, Table};
use bytes::Bytes;
use crossbeam::channel::{self, Sender};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use timer::DispatchOutcome;
use tracing::{info, warn};

/// Exclusive upper bound on record indices; keeps keys at their fixed width.
pub const MAX_RECORD_INDEX: u64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Serial,
    Concurrent,
    Batched,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Serial, Strategy::Concurrent, Strategy::Batched];
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "serial" => Ok(Strategy::Serial),
            "concurrent" => Ok(Strategy::Concurrent),
            "batched" => Ok(Strategy::Batched),
            _ => Err(format!(
                "Invalid strategy: {}. Use serial, concurrent or batched.",
                s
            )),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Serial => "serial",
            Strategy::Concurrent => "concurrent",
            Strategy::Batched => "batched",
        };
        f.write_str(name)
    }
}

/// Half-open range `[start, end)` of record indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    start: u64,
    end: u64,
}

impl IndexRange {
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidArgument(format!(
                "index range start {} is greater than end {}",
                start, end
            )));
        }
        if end > MAX_RECORD_INDEX {
            return Err(Error::InvalidArgument(format!(
                "index range end {} exceeds {}",
                end, MAX_RECORD_INDEX
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn iter(&self) -> Range<u64> {
        self.start..self.end
    }

    pub fn overlaps(&self, other: &IndexRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Contiguous, disjoint sub-ranges of at most `size` indices, in order.
    pub fn chunks(&self, size: u64) -> impl Iterator<Item = IndexRange> {
        let size = size.max(1);
        let end = self.end;
        (self.start..self.end)
            .step_by(size as usize)
            .map(move |start| IndexRange {
                start,
                end: start.saturating_add(size).min(end),
            })
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Worker threads for the concurrent strategies.
    pub concurrency: usize,
    /// Records per batched write call.
    pub batch_size: usize,
    /// Column family the synthetic records are written to.
    pub family: String,
    pub retry: RetryPolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            batch_size: DEFAULT_BATCH_SIZE,
            family: "info".into(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Drives synthetic inserts into one table and times them.
pub struct WriteBenchmarkHarness {
    table: Arc<dyn Table>,
    config: HarnessConfig,
    family: Bytes,
    pool: rayon::ThreadPool,
}

impl WriteBenchmarkHarness {
    pub fn new(table: Arc<dyn Table>, config: HarnessConfig) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(Error::InvalidArgument("concurrency must be at least 1".into()));
        }
        if config.batch_size == 0 {
            return Err(Error::InvalidArgument("batch size must be at least 1".into()));
        }
        if config.family.is_empty() {
            return Err(Error::InvalidArgument("column family must not be empty".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.concurrency)
            .thread_name(|i| format!("bench-writer-{}", i))
            .build()
            .map_err(|e| Error::Generic(format!("failed to build writer pool: {}", e)))?;

        Ok(Self {
            table,
            family: Bytes::from(config.family.clone()),
            config,
            pool,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Write every record in `range` with `strategy`.
    ///
    /// Serial runs stop at the first failed write and return it. Concurrent
    /// runs always complete; failed units are listed on the returned run.
    pub fn run(&self, strategy: Strategy, range: IndexRange) -> Result<BenchmarkRun> {
        if range.is_empty() {
            return Err(Error::InvalidArgument(
                "index range must contain at least one record".into(),
            ));
        }
        info!(
            %strategy,
            table = self.table.name(),
            start = range.start(),
            end = range.end(),
            "Starting write benchmark"
        );

        let timer = RunTimer::start();
        let outcome = match strategy {
            Strategy::Serial => self.dispatch_serial(range)?,
            Strategy::Concurrent => self.dispatch_per_record(range),
            Strategy::Batched => self.dispatch_batched(range),
        };
        let run = timer.finish(strategy, range.len(), outcome);

        for failure in &run.failures {
            warn!(
                %strategy,
                first_index = failure.first_index,
                records = failure.record_count,
                attempts = failure.attempts,
                error = %failure.error,
                "Write unit failed"
            );
        }
        info!(
            %strategy,
            records = run.record_count,
            elapsed_ms = run.elapsed.as_millis() as u64,
            throughput = run.throughput(),
            failed_units = run.failed_units(),
            "Write benchmark finished"
        );
        Ok(run)
    }

    fn put_for(&self, index: u64) -> Put {
        SyntheticRecord::new(index).into_put(&self.family)
    }

    fn dispatch_serial(&self, range: IndexRange) -> Result<DispatchOutcome> {
        let mut outcome = DispatchOutcome::default();
        for index in range.iter() {
            let put = self.put_for(index);
            outcome.dispatched_units += 1;
            self.config.retry.execute(|| self.table.put(&put))?;
            outcome.completed_units += 1;
        }
        Ok(outcome)
    }

    fn dispatch_per_record(&self, range: IndexRange) -> DispatchOutcome {
        self.fan_out(range.iter(), range.len(), |index| {
            let put = self.put_for(index);
            let (result, attempts) = self.config.retry.execute_counted(|| self.table.put(&put));
            (IndexRange { start: index, end: index + 1 }, result, attempts)
        })
    }

    fn dispatch_batched(&self, range: IndexRange) -> DispatchOutcome {
        let chunks: Vec<IndexRange> = range.chunks(self.config.batch_size as u64).collect();
        let dispatched_units = chunks.len() as u64;
        self.fan_out(chunks, dispatched_units, |chunk| {
            let puts: Vec<Put> = chunk.iter().map(|index| self.put_for(index)).collect();
            let (result, attempts) = self
                .config
                .retry
                .execute_counted(|| self.table.put_batch(&puts));
            (chunk, result, attempts)
        })
    }

    /// Run `unit` for every item on the pool and wait for all of them.
    /// Items are produced lazily, never collected up front.
    fn fan_out<I, F>(&self, units: I, dispatched_units: u64, unit: F) -> DispatchOutcome
    where
        I: IntoParallelIterator + Send,
        F: Fn(I::Item) -> (IndexRange, Result<()>, u32) + Sync,
    {
        let completed = AtomicU64::new(0);
        let (tx, rx) = channel::unbounded::<UnitFailure>();

        self.pool.install(|| {
            units
                .into_par_iter()
                .for_each_with(tx, |tx: &mut Sender<UnitFailure>, item| {
                    let (span, result, attempts) = unit(item);
                    match result {
                        Ok(()) => {
                            completed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(error) => {
                            // receiver outlives the pool scope
                            let _ = tx.send(UnitFailure {
                                first_index: span.start,
                                record_count: span.len(),
                                attempts,
                                error,
                            });
                        }
                    }
                });
        });

        let mut failures: Vec<UnitFailure> = rx.try_iter().collect();
        failures.sort_by_key(|f| f.first_index);
        DispatchOutcome {
            dispatched_units,
            completed_units: completed.into_inner(),
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::store::{
        ColumnFamilyDescriptor, FailurePlan, MemoryStore, StoreClient, TableDescriptor,
    };
    use std::collections::HashSet;

    fn setup(plan: FailurePlan) -> (MemoryStore, Arc<dyn Table>) {
        let store = MemoryStore::with_failures(plan).with_journal();
        let conn = store.connect(&StoreConfig::default()).unwrap();
        conn.admin()
            .unwrap()
            .create_table(
                &TableDescriptor::new("benchmark").add_family(ColumnFamilyDescriptor::new("info")),
                None,
            )
            .unwrap();
        let table = conn.table("benchmark").unwrap();
        (store, table)
    }

    fn harness(table: Arc<dyn Table>, concurrency: usize, batch_size: usize) -> WriteBenchmarkHarness {
        WriteBenchmarkHarness::new(
            table,
            HarnessConfig {
                concurrency,
                batch_size,
                ..HarnessConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_strategy_parsing() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!("BATCHED".parse::<Strategy>().unwrap(), Strategy::Batched);
        assert!("parallel".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_index_range_validation() {
        assert!(IndexRange::new(5, 4).is_err());
        assert!(IndexRange::new(0, MAX_RECORD_INDEX + 1).is_err());
        assert!(IndexRange::new(3, 3).unwrap().is_empty());
        let a = IndexRange::new(0, 100).unwrap();
        assert!(a.overlaps(&IndexRange::new(99, 200).unwrap()));
        assert!(!a.overlaps(&IndexRange::new(100, 200).unwrap()));
    }

    #[test]
    fn test_chunks_are_disjoint_and_cover() {
        let range = IndexRange::new(10, 35).unwrap();
        let chunks: Vec<IndexRange> = range.chunks(10).collect();
        let bounds: Vec<(u64, u64)> = chunks.iter().map(|c| (c.start(), c.end())).collect();
        assert_eq!(bounds, vec![(10, 20), (20, 30), (30, 35)]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (_store, table) = setup(FailurePlan::new());
        let zero_threads = HarnessConfig {
            concurrency: 0,
            ..HarnessConfig::default()
        };
        assert!(WriteBenchmarkHarness::new(table.clone(), zero_threads).is_err());
        let zero_batch = HarnessConfig {
            batch_size: 0,
            ..HarnessConfig::default()
        };
        assert!(WriteBenchmarkHarness::new(table, zero_batch).is_err());
    }

    #[test]
    fn test_empty_range_rejected() {
        let (_store, table) = setup(FailurePlan::new());
        let harness = harness(table, 2, 10);
        for strategy in Strategy::ALL {
            let err = harness
                .run(strategy, IndexRange::new(7, 7).unwrap())
                .unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_serial_writes_in_ascending_order() {
        let (store, table) = setup(FailurePlan::new());
        let run = harness(table, 1, 10)
            .run(Strategy::Serial, IndexRange::new(100, 150).unwrap())
            .unwrap();

        assert_eq!(run.record_count, 50);
        let journal = store.journal();
        assert_eq!(journal.len(), 50);
        for (offset, call) in journal.iter().enumerate() {
            assert!(!call.batched);
            assert_eq!(call.rows.len(), 1);
            assert_eq!(call.rows[0].as_ref(), record_key(100 + offset as u64).as_bytes());
        }
        assert_eq!(store.row_count("benchmark").unwrap(), 50);
    }

    #[test]
    fn test_serial_failure_is_fatal() {
        let (store, table) = setup(FailurePlan::new().fail_row(record_key(5)));
        let err = harness(table, 1, 10)
            .run(Strategy::Serial, IndexRange::new(0, 10).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::WriteFailure { .. }));
        // writes after the failing one never happen
        assert_eq!(store.journal().len(), 6);
        assert_eq!(store.row_count("benchmark").unwrap(), 5);
    }

    #[test]
    fn test_concurrent_writes_every_record_once() {
        let (store, table) = setup(FailurePlan::new());
        let run = harness(table, 4, 10)
            .run(Strategy::Concurrent, IndexRange::new(0, 500).unwrap())
            .unwrap();

        assert_eq!(run.dispatched_units, 500);
        assert_eq!(run.completed_units, 500);
        let journal = store.journal();
        assert_eq!(journal.len(), 500);
        let rows: HashSet<_> = journal.iter().map(|c| c.rows[0].clone()).collect();
        assert_eq!(rows.len(), 500);
    }

    #[test]
    fn test_per_record_units_follow_range_without_buffering() {
        let (store, table) = setup(FailurePlan::new());
        let range = IndexRange::new(MAX_RECORD_INDEX - 300, MAX_RECORD_INDEX).unwrap();
        let run = harness(table, 3, 10)
            .run(Strategy::Concurrent, range)
            .unwrap();

        assert_eq!(run.dispatched_units, 300);
        assert_eq!(run.completed_units, 300);
        let rows: HashSet<_> = store.journal().iter().map(|c| c.rows[0].clone()).collect();
        let expected: HashSet<_> = range.iter().map(|i| Bytes::from(record_key(i))).collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_batched_call_counts() {
        let (store, table) = setup(FailurePlan::new());
        let run = harness(table, 4, 100)
            .run(Strategy::Batched, IndexRange::new(2_000, 3_000).unwrap())
            .unwrap();

        assert_eq!(run.record_count, 1_000);
        assert_eq!(run.dispatched_units, 10);
        let journal = store.journal();
        assert_eq!(journal.len(), 10);
        let mut seen = HashSet::new();
        for call in &journal {
            assert!(call.batched);
            assert_eq!(call.rows.len(), 100);
            for row in &call.rows {
                assert!(seen.insert(row.clone()), "row written by two batches");
            }
        }
        assert_eq!(store.row_count("benchmark").unwrap(), 1_000);
    }

    #[test]
    fn test_single_failure_isolated_in_concurrent_strategies() {
        for strategy in [Strategy::Concurrent, Strategy::Batched] {
            let (store, table) = setup(FailurePlan::new().fail_row(record_key(250)));
            let run = harness(table, 4, 50)
                .run(strategy, IndexRange::new(0, 1_000).unwrap())
                .unwrap();

            assert_eq!(run.failed_units(), 1, "{}", strategy);
            let failure = &run.failures[0];
            match strategy {
                Strategy::Concurrent => {
                    assert_eq!(failure.first_index, 250);
                    assert_eq!(failure.record_count, 1);
                    assert_eq!(store.row_count("benchmark").unwrap(), 999);
                }
                _ => {
                    assert_eq!(failure.first_index, 250);
                    assert_eq!(failure.record_count, 50);
                    assert_eq!(store.row_count("benchmark").unwrap(), 950);
                }
            }
            // throughput still counts every dispatched record
            assert_eq!(run.record_count, 1_000);
            assert_eq!(run.completed_units + 1, run.dispatched_units);
        }
    }

    #[test]
    fn test_retry_recovers_transient_failure() {
        let (store, table) = setup(FailurePlan::new().fail_row_times(record_key(3), 2));
        let harness = WriteBenchmarkHarness::new(
            table,
            HarnessConfig {
                concurrency: 2,
                batch_size: 5,
                retry: RetryPolicy {
                    max_attempts: 3,
                    initial_delay: std::time::Duration::from_millis(1),
                    jitter: false,
                    ..RetryPolicy::default()
                },
                ..HarnessConfig::default()
            },
        )
        .unwrap();
        let run = harness
            .run(Strategy::Batched, IndexRange::new(0, 10).unwrap())
            .unwrap();
        assert!(run.failures.is_empty());
        assert_eq!(store.row_count("benchmark").unwrap(), 10);
        assert_eq!(store.journal().len(), 4);
    }

    #[test]
    fn test_throughput_matches_elapsed() {
        let (_store, table) = setup(FailurePlan::new());
        let harness = harness(table, 2, 25);
        for strategy in Strategy::ALL {
            let run = harness
                .run(strategy, IndexRange::new(0, 200).unwrap())
                .unwrap();
            assert!(run.throughput() > 0.0);
            let expected = 200.0 / run.elapsed_secs();
            assert!((run.throughput() - expected).abs() <= expected * 1e-9);
        }
    }
}
