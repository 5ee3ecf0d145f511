use crate::{Database, MemoryConnection, Table};
use ferry_core::{Context, Driver, Error, GenericSqlWriter, Result};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};
use url::Url;

pub(crate) type SharedDatabase = Arc<tokio::sync::Mutex<Database>>;

#[derive(Default, Debug)]
pub(crate) struct Counters {
    pub(crate) connections: AtomicUsize,
    pub(crate) statements: AtomicUsize,
    pub(crate) bulk_copies: AtomicUsize,
    pub(crate) commits: AtomicUsize,
    pub(crate) rollbacks: AtomicUsize,
}

#[derive(Default, Debug)]
struct Inner {
    databases: Mutex<HashMap<String, SharedDatabase>>,
    counters: Counters,
    fail_commits: AtomicBool,
    delay_millis: AtomicU64,
}

/// In-process driver, databases live as long as the driver (and its clones).
///
/// Connections are opened with `memory://<database>` URLs. Besides the driver
/// traits it exposes call counters and failure injection for tests.
#[derive(Default, Clone, Debug)]
pub struct MemoryDriver {
    inner: Arc<Inner>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) the database `name`.
    pub fn create_database(&self, name: &str) {
        self.databases()
            .insert(name.to_lowercase(), Default::default());
    }

    pub async fn create_table(&self, database: &str, name: &str, table: Table) -> Result<()> {
        self.database(database)?
            .lock()
            .await
            .create_table(name, table);
        Ok(())
    }

    /// Committed state of a table.
    pub async fn table(&self, database: &str, name: &str) -> Result<Table> {
        self.database(database)?
            .lock()
            .await
            .table(name)
            .cloned()
            .ok_or_else(|| Error::msg(format!("Table `{}` does not exist", name)))
    }

    pub fn connections(&self) -> usize {
        self.inner.counters.connections.load(Ordering::Relaxed)
    }

    pub fn statements(&self) -> usize {
        self.inner.counters.statements.load(Ordering::Relaxed)
    }

    pub fn bulk_copies(&self) -> usize {
        self.inner.counters.bulk_copies.load(Ordering::Relaxed)
    }

    pub fn commits(&self) -> usize {
        self.inner.counters.commits.load(Ordering::Relaxed)
    }

    pub fn rollbacks(&self) -> usize {
        self.inner.counters.rollbacks.load(Ordering::Relaxed)
    }

    /// Make every commit fail (the transaction is discarded).
    pub fn fail_commits(&self, enabled: bool) {
        self.inner.fail_commits.store(enabled, Ordering::Relaxed);
    }

    /// Delay applied before every statement and bulk copy.
    pub fn set_delay(&self, delay: Duration) {
        self.inner
            .delay_millis
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    pub(crate) fn counters(&self) -> &Counters {
        &self.inner.counters
    }

    pub(crate) fn commits_fail(&self) -> bool {
        self.inner.fail_commits.load(Ordering::Relaxed)
    }

    pub(crate) async fn pause(&self) {
        let millis = self.inner.delay_millis.load(Ordering::Relaxed);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    fn databases(&self) -> std::sync::MutexGuard<'_, HashMap<String, SharedDatabase>> {
        self.inner
            .databases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn database(&self, name: &str) -> Result<SharedDatabase> {
        self.databases()
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::msg(format!("Database `{}` does not exist", name)))
    }
}

impl Driver for MemoryDriver {
    type Connection = MemoryConnection;
    type SqlWriter = GenericSqlWriter;

    const NAME: &'static str = "memory";

    fn sql_writer(&self) -> GenericSqlWriter {
        GenericSqlWriter::new()
    }

    async fn connect(&self, url: &str) -> Result<MemoryConnection> {
        let parsed = Url::parse(url).with_context(|| format!("Invalid URL `{}`", url))?;
        if parsed.scheme() != Self::NAME {
            return Err(Error::msg(format!(
                "URL `{}` must use the `{}://` scheme",
                url,
                Self::NAME
            )));
        }
        let name = parsed
            .host_str()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::msg(format!("URL `{}` does not name a database", url)))?;
        let database = self.database(name)?;
        self.inner
            .counters
            .connections
            .fetch_add(1, Ordering::Relaxed);
        log::debug!("Connected to the memory database `{}`", name);
        Ok(MemoryConnection::new(self.clone(), database))
    }
}
