use super::{BenchmarkRun, IndexRange, Strategy, WriteBenchmarkHarness};
use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::splitter::{BoundaryKey, SplitAlgorithm};
use crate::store::{
    Admin, ColumnFamilyDescriptor, Connection, StoreClient, Table, TableDescriptor,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Connection, table handle and harness for a sequence of runs.
///
/// Setup (connect, existence check, optional pre-split create) happens in
/// [`open`](Self::open) and teardown in [`close`](Self::close), both outside
/// the measured interval of every run.
pub struct BenchmarkSession {
    connection: Box<dyn Connection>,
    table: Arc<dyn Table>,
    harness: WriteBenchmarkHarness,
}

impl std::fmt::Debug for BenchmarkSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkSession").finish_non_exhaustive()
    }
}

impl BenchmarkSession {
    pub fn open(client: &dyn StoreClient, config: &BenchConfig) -> Result<Self> {
        config.validate()?;
        let connection = client.connect(&config.store)?;
        let prepared = prepare_table(connection.as_ref(), config).and_then(|table| {
            let harness = WriteBenchmarkHarness::new(table.clone(), config.harness_config())?;
            Ok((table, harness))
        });
        match prepared {
            Ok((table, harness)) => Ok(Self {
                connection,
                table,
                harness,
            }),
            Err(e) => {
                if let Err(close_err) = connection.close() {
                    warn!(error = %close_err, "Failed to close connection after setup error");
                }
                Err(e)
            }
        }
    }

    pub fn table(&self) -> &Arc<dyn Table> {
        &self.table
    }

    pub fn harness(&self) -> &WriteBenchmarkHarness {
        &self.harness
    }

    pub fn run(&self, strategy: Strategy, range: IndexRange) -> Result<BenchmarkRun> {
        self.harness.run(strategy, range)
    }

    /// Close the table and the connection. Problems are logged and returned,
    /// they never invalidate runs already reported.
    pub fn close(self) -> Vec<Error> {
        let mut errors = Vec::new();
        if let Err(e) = self.table.close() {
            warn!(error = %e, "Failed to close table");
            errors.push(e);
        }
        if let Err(e) = self.connection.close() {
            warn!(error = %e, "Failed to close connection");
            errors.push(e);
        }
        errors
    }
}

/// Make sure the configured table exists, creating it (pre-split when
/// configured) if allowed, and open it.
pub fn prepare_table(connection: &dyn Connection, config: &BenchConfig) -> Result<Arc<dyn Table>> {
    let name = &config.table.name;
    let admin = connection.admin()?;
    if let Err(e) = ensure_table(admin.as_ref(), config) {
        if let Err(close_err) = admin.close() {
            warn!(error = %close_err, "Failed to close admin after setup error");
        }
        return Err(e);
    }
    admin.close()?;
    connection.table(name)
}

fn ensure_table(admin: &dyn Admin, config: &BenchConfig) -> Result<()> {
    let name = &config.table.name;
    if admin.table_exists(name)? {
        return Ok(());
    }
    if !config.table.create_if_missing {
        return Err(Error::TableNotFound(name.clone()));
    }
    info!(table = %name, "Table does not exist, creating it");
    let descriptor = TableDescriptor::new(name.clone()).add_family(
        ColumnFamilyDescriptor::new(config.table.family.clone())
            .with_compression(config.table.compression),
    );
    let split_keys = pre_split_keys(config)?;
    admin.create_table(&descriptor, split_keys.as_deref())
}

fn pre_split_keys(config: &BenchConfig) -> Result<Option<Vec<BoundaryKey>>> {
    match &config.table.pre_split {
        Some(pre_split) => {
            let keys = pre_split.splitter()?.split(pre_split.regions)?;
            Ok(Some(keys))
        }
        None => Ok(None),
    }
}
