//! Benchmark configuration.
//!
//! Loaded from a JSON file, overridden from `REGION_BENCH_*` environment
//! variables, then from command line flags.

use crate::bench::{HarnessConfig, RetryPolicy};
use crate::error::{Error, Result};
use crate::splitter::{BoundaryEncoding, KeyInterval, RangeSplitter};
use crate::store::CompressionType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Reference chunk size for the batched strategy.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Width of synthetic record keys.
pub const RECORD_KEY_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Coordination quorum of the store cluster, `host:port[,host:port]`.
    pub quorum: String,
    pub connect_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            quorum: "localhost:2181".into(),
            connect_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreSplit {
    pub start: String,
    pub end: String,
    pub regions: i64,
    /// Zero-pad boundaries to this many digits.
    #[serde(default)]
    pub width: Option<usize>,
}

impl PreSplit {
    pub fn splitter(&self) -> Result<RangeSplitter> {
        let encoding = match self.width {
            Some(width) => BoundaryEncoding::FixedWidth(width),
            None => BoundaryEncoding::Canonical,
        };
        Ok(RangeSplitter::new(KeyInterval::parse(&self.start, &self.end)?).with_encoding(encoding))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub name: String,
    pub family: String,
    pub compression: CompressionType,
    pub create_if_missing: bool,
    pub pre_split: Option<PreSplit>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "benchmark".into(),
            family: "info".into(),
            compression: CompressionType::None,
            create_if_missing: true,
            pre_split: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// Worker threads for the concurrent strategies. `None` uses the
    /// available parallelism of the host.
    pub concurrency: Option<usize>,
    pub batch_size: usize,
    /// Attempts per unit of work; 1 disables retries.
    pub max_attempts: u32,
    pub retry_initial_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            concurrency: None,
            batch_size: DEFAULT_BATCH_SIZE,
            max_attempts: 1,
            retry_initial_delay_ms: 100,
            retry_max_delay_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub store: StoreConfig,
    pub table: TableConfig,
    pub harness: HarnessSettings,
    pub logging: LoggingConfig,
}

impl BenchConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(format!("JSON parse error: {}", e)))
    }

    /// Apply `REGION_BENCH_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(concurrency) = var("REGION_BENCH_CONCURRENCY") {
            self.harness.concurrency = Some(
                concurrency
                    .parse()
                    .map_err(|_| Error::Config("Invalid concurrency".into()))?,
            );
        }
        if let Some(batch_size) = var("REGION_BENCH_BATCH_SIZE") {
            self.harness.batch_size = batch_size
                .parse()
                .map_err(|_| Error::Config("Invalid batch size".into()))?;
        }
        if let Some(table) = var("REGION_BENCH_TABLE") {
            self.table.name = table;
        }
        if let Some(level) = var("REGION_BENCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.table.name.is_empty() {
            return Err(Error::Config("Table name must not be empty".into()));
        }
        if self.table.family.is_empty() {
            return Err(Error::Config("Column family must not be empty".into()));
        }
        if self.harness.batch_size == 0 {
            return Err(Error::Config("Batch size must be at least 1".into()));
        }
        if self.harness.concurrency == Some(0) {
            return Err(Error::Config("Concurrency must be at least 1".into()));
        }
        if self.harness.max_attempts == 0 {
            return Err(Error::Config("At least one write attempt is required".into()));
        }
        if let Some(pre_split) = &self.table.pre_split {
            if pre_split.regions < 1 {
                return Err(Error::Config("Pre-split region count must be positive".into()));
            }
            pre_split.splitter()?;
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(Error::Config(format!(
                "Unknown log level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }

    pub fn harness_config(&self) -> HarnessConfig {
        let mut config = HarnessConfig {
            batch_size: self.harness.batch_size,
            family: self.table.family.clone(),
            retry: RetryPolicy {
                max_attempts: self.harness.max_attempts,
                initial_delay: Duration::from_millis(self.harness.retry_initial_delay_ms),
                max_delay: Duration::from_millis(self.harness.retry_max_delay_ms),
                ..RetryPolicy::default()
            },
            ..HarnessConfig::default()
        };
        if let Some(concurrency) = self.harness.concurrency {
            config.concurrency = concurrency;
        }
        config
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for [`BenchConfig`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: BenchConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.config.table.name = name.into();
        self
    }

    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.config.table.family = family.into();
        self
    }

    pub fn compression(mut self, compression: CompressionType) -> Self {
        self.config.table.compression = compression;
        self
    }

    pub fn pre_split(mut self, pre_split: PreSplit) -> Self {
        self.config.table.pre_split = Some(pre_split);
        self
    }

    pub fn concurrency(mut self, threads: usize) -> Self {
        self.config.harness.concurrency = Some(threads);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.harness.batch_size = size;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.harness.max_attempts = attempts;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> BenchConfig {
        self.config
    }
}
