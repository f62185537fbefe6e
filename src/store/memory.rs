use super::{Admin, Cell, Connection, Put, RegionRouter, StoreClient, Table, TableDescriptor};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::splitter::{is_strictly_increasing, BoundaryKey, Region};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// One write call as seen by the store, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCall {
    pub table: String,
    pub rows: Vec<Bytes>,
    pub batched: bool,
    pub succeeded: bool,
}

/// Faults to inject into write calls.
#[derive(Debug, Clone, Default)]
pub struct FailurePlan {
    /// Every call carrying one of these rows fails.
    failing_rows: HashSet<Bytes>,
    /// Calls carrying one of these rows fail until the budget is spent.
    transient_rows: HashMap<Bytes, u32>,
    /// Message for the next `connect`, which then fails.
    connect_failure: Option<String>,
    /// Message for the next connection `close`, which then fails.
    close_failure: Option<String>,
}

impl FailurePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_row(mut self, row: impl Into<Bytes>) -> Self {
        self.failing_rows.insert(row.into());
        self
    }

    pub fn fail_row_times(mut self, row: impl Into<Bytes>, times: u32) -> Self {
        self.transient_rows.insert(row.into(), times);
        self
    }

    pub fn fail_connect(mut self, message: impl Into<String>) -> Self {
        self.connect_failure = Some(message.into());
        self
    }

    pub fn fail_close(mut self, message: impl Into<String>) -> Self {
        self.close_failure = Some(message.into());
        self
    }

    fn check<'a>(&mut self, rows: impl Iterator<Item = &'a Bytes>) -> Option<Bytes> {
        for row in rows {
            if self.failing_rows.contains(row) {
                return Some(row.clone());
            }
            if let Some(remaining) = self.transient_rows.get_mut(row) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Some(row.clone());
                }
            }
        }
        None
    }
}

struct TableData {
    descriptor: TableDescriptor,
    enabled: AtomicBool,
    rows: RwLock<BTreeMap<Bytes, Vec<Cell>>>,
    router: RegionRouter,
    region_writes: Vec<AtomicU64>,
}

impl TableData {
    fn new(descriptor: TableDescriptor, router: RegionRouter) -> Self {
        let region_writes = (0..router.region_count()).map(|_| AtomicU64::new(0)).collect();
        Self {
            descriptor,
            enabled: AtomicBool::new(true),
            rows: RwLock::new(BTreeMap::new()),
            router,
            region_writes,
        }
    }

    fn upsert(&self, put: &Put) {
        let region = self.router.route(put.row());
        self.region_writes[region].fetch_add(1, Ordering::Relaxed);
        self.rows
            .write()
            .insert(put.row().clone(), put.cells().to_vec());
    }
}

#[derive(Default)]
struct StoreState {
    tables: RwLock<HashMap<String, Arc<TableData>>>,
    failures: Mutex<FailurePlan>,
    /// Set once a plan is installed; writes skip the failure lock otherwise.
    failures_armed: AtomicBool,
    journal: Mutex<Vec<WriteCall>>,
    record_journal: AtomicBool,
    open_admins: AtomicUsize,
}

impl StoreState {
    fn lookup(&self, name: &str) -> Result<Arc<TableData>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }
}

/// In-process store: an upsert-by-key sorted map per table, split into
/// regions at the table's pre-split keys.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failures(plan: FailurePlan) -> Self {
        let store = Self::default();
        store.set_failures(plan);
        store
    }

    /// Record every write call from now on. Off by default: the journal
    /// keeps a copy of each row key it sees.
    pub fn with_journal(self) -> Self {
        self.state.record_journal.store(true, Ordering::Release);
        self
    }

    pub fn set_failures(&self, plan: FailurePlan) {
        *self.state.failures.lock() = plan;
        self.state.failures_armed.store(true, Ordering::Release);
    }

    /// Write calls received while recording was on, in arrival order.
    pub fn journal(&self) -> Vec<WriteCall> {
        self.state.journal.lock().clone()
    }

    pub fn clear_journal(&self) {
        self.state.journal.lock().clear();
    }

    /// Admin handles obtained and not yet closed.
    pub fn open_admins(&self) -> usize {
        self.state.open_admins.load(Ordering::Acquire)
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        Ok(self.state.lookup(table)?.rows.read().len())
    }

    pub fn row(&self, table: &str, row: &[u8]) -> Result<Option<Vec<Cell>>> {
        Ok(self.state.lookup(table)?.rows.read().get(row).cloned())
    }

    pub fn descriptor(&self, table: &str) -> Result<TableDescriptor> {
        Ok(self.state.lookup(table)?.descriptor.clone())
    }

    /// Regions of `table` with the number of rows written into each.
    pub fn region_writes(&self, table: &str) -> Result<Vec<(Region, u64)>> {
        let data = self.state.lookup(table)?;
        Ok(data
            .router
            .regions()
            .into_iter()
            .zip(data.region_writes.iter().map(|c| c.load(Ordering::Relaxed)))
            .collect())
    }
}

impl StoreClient for MemoryStore {
    fn connect(&self, config: &StoreConfig) -> Result<Box<dyn Connection>> {
        if let Some(message) = self.state.failures.lock().connect_failure.take() {
            return Err(Error::ConnectionFailure(message));
        }
        debug!(quorum = %config.quorum, "Connected to in-memory store");
        Ok(Box::new(MemoryConnection {
            state: self.state.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MemoryConnection {
    state: Arc<StoreState>,
    closed: AtomicBool,
}

impl MemoryConnection {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::ConnectionFailure("connection is closed".into()));
        }
        Ok(())
    }
}

impl Connection for MemoryConnection {
    fn table(&self, name: &str) -> Result<Arc<dyn Table>> {
        self.ensure_open()?;
        let data = self.state.lookup(name)?;
        Ok(Arc::new(MemoryTable {
            name: name.to_string(),
            data,
            state: self.state.clone(),
            closed: AtomicBool::new(false),
        }))
    }

    fn admin(&self) -> Result<Box<dyn Admin>> {
        self.ensure_open()?;
        self.state.open_admins.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(MemoryAdmin {
            state: self.state.clone(),
            closed: AtomicBool::new(false),
        }))
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(Error::ConnectionFailure("connection already closed".into()));
        }
        if let Some(message) = self.state.failures.lock().close_failure.take() {
            return Err(Error::ConnectionFailure(message));
        }
        Ok(())
    }
}

struct MemoryTable {
    name: String,
    data: Arc<TableData>,
    state: Arc<StoreState>,
    closed: AtomicBool,
}

impl MemoryTable {
    fn write(&self, puts: &[Put], batched: bool) -> Result<()> {
        let outcome = self.apply(puts);
        if !self.state.record_journal.load(Ordering::Acquire) {
            return outcome;
        }
        let rows: Vec<Bytes> = puts.iter().map(|p| p.row().clone()).collect();
        self.state.journal.lock().push(WriteCall {
            table: self.name.clone(),
            rows,
            batched,
            succeeded: outcome.is_ok(),
        });
        outcome
    }

    fn apply(&self, puts: &[Put]) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::ConnectionFailure(format!(
                "table handle {} is closed",
                self.name
            )));
        }
        if !self.data.enabled.load(Ordering::Acquire) {
            return Err(Error::TableState {
                table: self.name.clone(),
                state: "disabled".into(),
            });
        }
        for put in puts {
            if let Some(cell) = put
                .cells()
                .iter()
                .find(|c| !self.data.descriptor.has_family(&c.family))
            {
                return Err(Error::write_failure(
                    String::from_utf8_lossy(put.row()),
                    format!(
                        "unknown column family {}",
                        String::from_utf8_lossy(&cell.family)
                    ),
                ));
            }
        }
        if self.state.failures_armed.load(Ordering::Acquire) {
            if let Some(row) = self.state.failures.lock().check(puts.iter().map(Put::row)) {
                return Err(Error::write_failure(
                    String::from_utf8_lossy(&row),
                    "injected failure",
                ));
            }
        }
        for put in puts {
            self.data.upsert(put);
        }
        Ok(())
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, put: &Put) -> Result<()> {
        self.write(std::slice::from_ref(put), false)
    }

    fn put_batch(&self, puts: &[Put]) -> Result<()> {
        self.write(puts, true)
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

struct MemoryAdmin {
    state: Arc<StoreState>,
    closed: AtomicBool,
}

impl Admin for MemoryAdmin {
    fn table_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state.tables.read().contains_key(name))
    }

    fn create_table(
        &self,
        descriptor: &TableDescriptor,
        split_keys: Option<&[BoundaryKey]>,
    ) -> Result<()> {
        if descriptor.families.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "table {} needs at least one column family",
                descriptor.name
            )));
        }
        let split_keys = split_keys.unwrap_or_default();
        if !is_strictly_increasing(split_keys) {
            return Err(Error::InvalidArgument(
                "split keys must be unique and strictly increasing".into(),
            ));
        }

        let mut tables = self.state.tables.write();
        if tables.contains_key(&descriptor.name) {
            return Err(Error::TableExists(descriptor.name.clone()));
        }
        let router = RegionRouter::new(split_keys.to_vec());
        info!(
            table = %descriptor.name,
            regions = router.region_count(),
            "Created table"
        );
        tables.insert(
            descriptor.name.clone(),
            Arc::new(TableData::new(descriptor.clone(), router)),
        );
        Ok(())
    }

    fn disable_table(&self, name: &str) -> Result<()> {
        let data = self.state.lookup(name)?;
        if !data.enabled.swap(false, Ordering::AcqRel) {
            return Err(Error::TableState {
                table: name.to_string(),
                state: "already disabled".into(),
            });
        }
        debug!(table = %name, "Disabled table");
        Ok(())
    }

    fn delete_table(&self, name: &str) -> Result<()> {
        let mut tables = self.state.tables.write();
        let data = tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        if data.enabled.load(Ordering::Acquire) {
            return Err(Error::TableState {
                table: name.to_string(),
                state: "enabled; disable it before deleting".into(),
            });
        }
        tables.remove(name);
        info!(table = %name, "Deleted table");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.state.open_admins.fetch_sub(1, Ordering::AcqRel);
        }
        Ok(())
    }
}
