#![allow(dead_code)]

use region_bench::bench::{record_key, HarnessConfig, RetryPolicy, WriteBenchmarkHarness};
use region_bench::config::StoreConfig;
use region_bench::splitter::BoundaryKey;
use region_bench::store::{ColumnFamilyDescriptor, MemoryStore, StoreClient, TableDescriptor};
use std::time::Duration;

pub const TEST_TABLE: &str = "benchmark";
pub const TEST_FAMILY: &str = "info";

// Small enough for every test to run all three strategies quickly
pub const FAST_TEST_SIZE: u64 = 200;
pub const MEDIUM_TEST_SIZE: u64 = 2_000;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("region_bench=debug")
        .try_init();
}

/// Create the test table, pre-split at `split_keys` when given.
pub fn create_table(store: &MemoryStore, split_keys: Option<&[BoundaryKey]>) {
    let connection = store
        .connect(&StoreConfig::default())
        .expect("Failed to connect to in-memory store");
    let admin = connection.admin().expect("Failed to open admin");
    admin
        .create_table(
            &TableDescriptor::new(TEST_TABLE).add_family(ColumnFamilyDescriptor::new(TEST_FAMILY)),
            split_keys,
        )
        .expect("Failed to create test table");
}

pub fn harness_config(threads: usize, batch_size: usize, attempts: u32) -> HarnessConfig {
    HarnessConfig {
        concurrency: threads,
        batch_size,
        family: TEST_FAMILY.to_string(),
        retry: RetryPolicy {
            initial_delay: Duration::from_millis(1),
            jitter: false,
            ..RetryPolicy::with_attempts(attempts)
        },
    }
}

/// A harness writing into a freshly created table on `store`.
pub fn create_harness(store: &MemoryStore, config: HarnessConfig) -> WriteBenchmarkHarness {
    create_table(store, None);
    let connection = store
        .connect(&StoreConfig::default())
        .expect("Failed to connect to in-memory store");
    let table = connection.table(TEST_TABLE).expect("Failed to open test table");
    WriteBenchmarkHarness::new(table, config).expect("Failed to build harness")
}

/// Row keys the store saw for `start..end`, in key order.
pub fn expected_keys(start: u64, end: u64) -> Vec<String> {
    (start..end).map(record_key).collect()
}
