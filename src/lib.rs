//! Region pre-splitting and write-throughput benchmarking for sorted
//! key-value stores.
//!
//! [`splitter`] computes region boundaries for a pre-split table;
//! [`bench`] drives synthetic inserts against a [`store::Table`] with one of
//! three strategies and reports throughput.

pub mod bench;
pub mod config;
pub mod error;
pub mod logging;
pub mod splitter;
pub mod store;

pub use bench::{
    BenchmarkRun, BenchmarkSession, HarnessConfig, IndexRange, RetryPolicy, Strategy,
    SyntheticRecord, WriteBenchmarkHarness,
};
pub use config::{BenchConfig, ConfigBuilder};
pub use error::{Error, Result};
pub use splitter::{
    compute_boundaries, BoundaryEncoding, BoundaryKey, KeyInterval, RangeSplitter, Region,
    SplitAlgorithm,
};
pub use store::{Admin, Connection, MemoryStore, StoreClient, Table};
