mod common;

use common::*;
use region_bench::bench::{BenchmarkSession, IndexRange, Strategy, FIELD_COUNT};
use region_bench::config::{ConfigBuilder, PreSplit, RECORD_KEY_WIDTH};
use region_bench::store::{FailurePlan, MemoryStore};
use region_bench::{Error, RangeSplitter, SplitAlgorithm};
use std::collections::HashSet;

#[test]
fn test_all_strategies_store_identical_rows() {
    init_test_logging();
    let mut stored = Vec::new();

    for strategy in Strategy::ALL {
        let store = MemoryStore::new();
        let harness = create_harness(&store, harness_config(4, 32, 1));
        let run = harness
            .run(strategy, IndexRange::new(0, MEDIUM_TEST_SIZE).unwrap())
            .unwrap();
        assert!(run.failures.is_empty(), "{}", strategy);
        assert_eq!(run.record_count, MEDIUM_TEST_SIZE);
        assert_eq!(store.row_count(TEST_TABLE).unwrap() as u64, MEDIUM_TEST_SIZE);

        let keys: Vec<String> = expected_keys(0, MEDIUM_TEST_SIZE);
        for key in &keys {
            let cells = store.row(TEST_TABLE, key.as_bytes()).unwrap().unwrap();
            assert_eq!(cells.len(), FIELD_COUNT);
            assert!(cells.iter().all(|cell| cell.family.as_ref() == TEST_FAMILY.as_bytes()));
        }
        stored.push(keys);
    }
    assert!(stored.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_each_record_written_by_exactly_one_call() {
    for strategy in Strategy::ALL {
        let store = MemoryStore::new().with_journal();
        let harness = create_harness(&store, harness_config(8, 7, 1));
        harness
            .run(strategy, IndexRange::new(13, 13 + FAST_TEST_SIZE).unwrap())
            .unwrap();

        let mut seen = HashSet::new();
        for call in store.journal() {
            assert!(call.succeeded);
            assert_eq!(call.batched, strategy == Strategy::Batched);
            for row in call.rows {
                assert!(seen.insert(row), "{}: row written twice", strategy);
            }
        }
        let expected: HashSet<_> = expected_keys(13, 13 + FAST_TEST_SIZE)
            .into_iter()
            .map(bytes::Bytes::from)
            .collect();
        assert_eq!(seen, expected, "{}", strategy);
    }
}

#[test]
fn test_repeated_runs_retain_no_call_history() {
    let store = MemoryStore::new();
    let harness = create_harness(&store, harness_config(4, 50, 1));
    for _ in 0..5 {
        let run = harness
            .run(Strategy::Concurrent, IndexRange::new(0, MEDIUM_TEST_SIZE).unwrap())
            .unwrap();
        assert!(run.failures.is_empty());
        assert!(store.journal().is_empty());
    }
    assert_eq!(store.row_count(TEST_TABLE).unwrap() as u64, MEDIUM_TEST_SIZE);
}

#[test]
fn test_batch_sizes_follow_configuration() {
    let store = MemoryStore::new().with_journal();
    let harness = create_harness(&store, harness_config(3, 64, 1));
    let run = harness
        .run(Strategy::Batched, IndexRange::new(0, 1_000).unwrap())
        .unwrap();

    // 15 full batches plus one of 40
    assert_eq!(run.dispatched_units, 16);
    let mut sizes: Vec<usize> = store.journal().iter().map(|c| c.rows.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes[0], 40);
    assert!(sizes[1..].iter().all(|&n| n == 64));
}

#[test]
fn test_failed_batch_does_not_stop_the_run() {
    let store = MemoryStore::with_failures(
        FailurePlan::new()
            .fail_row(record_key_of(10))
            .fail_row(record_key_of(150)),
    );
    let harness = create_harness(&store, harness_config(4, 50, 1));
    let run = harness
        .run(Strategy::Batched, IndexRange::new(0, FAST_TEST_SIZE).unwrap())
        .unwrap();

    let failed: Vec<u64> = run.failures.iter().map(|f| f.first_index).collect();
    assert_eq!(failed, vec![0, 150]);
    assert!(run.failures.iter().all(|f| f.error.is_recoverable()));
    assert_eq!(run.completed_units, 2);
    assert_eq!(store.row_count(TEST_TABLE).unwrap(), 100);
    assert!(store.row(TEST_TABLE, record_key_of(10).as_bytes()).unwrap().is_none());
    assert!(store.row(TEST_TABLE, record_key_of(99).as_bytes()).unwrap().is_some());
}

#[test]
fn test_retry_attempts_reported_on_persistent_failure() {
    let store =
        MemoryStore::with_failures(FailurePlan::new().fail_row(record_key_of(7))).with_journal();
    let harness = create_harness(&store, harness_config(2, 10, 3));
    let run = harness
        .run(Strategy::Concurrent, IndexRange::new(0, 20).unwrap())
        .unwrap();

    assert_eq!(run.failed_units(), 1);
    assert_eq!(run.failures[0].attempts, 3);
    let attempts_on_seven = store
        .journal()
        .iter()
        .filter(|c| c.rows[0].as_ref() == record_key_of(7).as_bytes())
        .count();
    assert_eq!(attempts_on_seven, 3);
}

#[test]
fn test_serial_failure_surfaces_error() {
    let store = MemoryStore::with_failures(FailurePlan::new().fail_row(record_key_of(3)));
    let harness = create_harness(&store, harness_config(1, 10, 1));
    let err = harness
        .run(Strategy::Serial, IndexRange::new(0, 10).unwrap())
        .unwrap_err();
    match err {
        Error::WriteFailure { target, .. } => assert_eq!(target, record_key_of(3)),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_session_over_pre_split_table() {
    init_test_logging();
    let store = MemoryStore::new();
    let total = 3 * 4_000;
    let config = ConfigBuilder::new()
        .concurrency(4)
        .batch_size(250)
        .pre_split(PreSplit {
            start: "0".into(),
            end: (total - 1).to_string(),
            regions: 6,
            width: Some(RECORD_KEY_WIDTH),
        })
        .build();

    let session = BenchmarkSession::open(&store, &config).unwrap();
    for (slot, strategy) in Strategy::ALL.iter().enumerate() {
        let start = slot as u64 * 4_000;
        let run = session
            .run(*strategy, IndexRange::new(start, start + 4_000).unwrap())
            .unwrap();
        assert!(run.throughput() > 0.0);
    }
    assert!(session.close().is_empty());

    let writes: Vec<u64> = store
        .region_writes(TEST_TABLE)
        .unwrap()
        .into_iter()
        .map(|(_, n)| n)
        .collect();
    assert_eq!(writes, vec![2_000; 6]);
    assert_eq!(store.row_count(TEST_TABLE).unwrap(), total as usize);
}

#[test]
fn test_pre_split_keys_match_splitter_output() {
    let store = MemoryStore::new();
    let splitter = RangeSplitter::default().with_encoding(region_bench::BoundaryEncoding::FixedWidth(8));
    let keys = splitter.split(4).unwrap();
    create_table(&store, Some(&keys));

    let regions = store.region_writes(TEST_TABLE).unwrap();
    assert_eq!(regions.len(), 4);
    assert_eq!(regions[1].0.to_string(), "[00002500, 00005000)");
}

fn record_key_of(index: u64) -> String {
    region_bench::bench::record_key(index)
}
