//! Client-side contract of the store under benchmark.
//!
//! The harness only ever talks to these traits. [`MemoryStore`] is the
//! in-process implementation used by the CLI, the benches and the tests.

pub mod memory;
pub mod router;

pub use memory::{FailurePlan, MemoryStore, WriteCall};
pub use router::RegionRouter;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::splitter::BoundaryKey;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Entry point of a store client library.
pub trait StoreClient: Send + Sync {
    fn connect(&self, config: &StoreConfig) -> Result<Box<dyn Connection>>;
}

/// An open connection. Shared read-only by every writer of a run.
pub trait Connection: Send + Sync {
    fn table(&self, name: &str) -> Result<Arc<dyn Table>>;

    fn admin(&self) -> Result<Box<dyn Admin>>;

    fn close(&self) -> Result<()>;
}

/// Write side of a table handle.
pub trait Table: Send + Sync {
    fn name(&self) -> &str;

    /// Single-row write. Upserts by row key.
    fn put(&self, put: &Put) -> Result<()>;

    /// Multi-row write carried by one call.
    fn put_batch(&self, puts: &[Put]) -> Result<()>;

    fn close(&self) -> Result<()>;
}

/// Table lifecycle operations.
pub trait Admin: Send {
    fn table_exists(&self, name: &str) -> Result<bool>;

    /// Create a table, pre-split at `split_keys` when given.
    fn create_table(
        &self,
        descriptor: &TableDescriptor,
        split_keys: Option<&[BoundaryKey]>,
    ) -> Result<()>;

    fn disable_table(&self, name: &str) -> Result<()>;

    /// Drop a table. The table must be disabled first.
    fn delete_table(&self, name: &str) -> Result<()>;

    fn close(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub family: Bytes,
    pub qualifier: Bytes,
    pub value: Bytes,
}

/// All cells written to one row by a single mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Put {
    row: Bytes,
    cells: Vec<Cell>,
}

impl Put {
    pub fn new(row: impl Into<Bytes>) -> Self {
        Self {
            row: row.into(),
            cells: Vec::new(),
        }
    }

    pub fn add_column(
        &mut self,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> &mut Self {
        self.cells.push(Cell {
            family: family.into(),
            qualifier: qualifier.into(),
            value: value.into(),
        });
        self
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Column family compression setting. The codec itself belongs to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    #[default]
    None,
    Gz,
    Lz4,
    Snappy,
    Zstd,
}

impl FromStr for CompressionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(CompressionType::None),
            "gz" | "gzip" => Ok(CompressionType::Gz),
            "lz4" => Ok(CompressionType::Lz4),
            "snappy" => Ok(CompressionType::Snappy),
            "zstd" => Ok(CompressionType::Zstd),
            _ => Err(format!(
                "Invalid compression: {}. Use none, gz, lz4, snappy or zstd.",
                s
            )),
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionType::None => "none",
            CompressionType::Gz => "gz",
            CompressionType::Lz4 => "lz4",
            CompressionType::Snappy => "snappy",
            CompressionType::Zstd => "zstd",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamilyDescriptor {
    pub name: String,
    #[serde(default)]
    pub compression: CompressionType,
}

impl ColumnFamilyDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            compression: CompressionType::None,
        }
    }

    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub families: Vec<ColumnFamilyDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            families: Vec::new(),
        }
    }

    pub fn add_family(mut self, family: ColumnFamilyDescriptor) -> Self {
        self.families.push(family);
        self
    }

    pub fn has_family(&self, name: &[u8]) -> bool {
        self.families.iter().any(|f| f.name.as_bytes() == name)
    }
}
