use crate::{Database, MemoryDriver, MemoryTransaction, driver::SharedDatabase};
use ferry_core::{
    BulkCopyOptions, Connection, Error, Executor, QueryResult, Result, RowsAffected, StagedRows,
    Statement,
    future::TryFutureExt,
    stream::{self, Stream},
};
use std::{future::Future, sync::atomic::Ordering};

pub struct MemoryConnection {
    driver: MemoryDriver,
    database: SharedDatabase,
    /// Working copy of the open transaction.
    pub(crate) pending: Option<Database>,
}

impl MemoryConnection {
    pub(crate) fn new(driver: MemoryDriver, database: SharedDatabase) -> Self {
        Self {
            driver,
            database,
            pending: None,
        }
    }

    /// Apply `f` to the transaction copy or, outside transactions, to the shared
    /// database. A failing `f` leaves nothing behind.
    async fn with_database<R>(&mut self, f: impl FnOnce(&mut Database) -> Result<R>) -> Result<R> {
        if let Some(pending) = &mut self.pending {
            let mut copy = pending.clone();
            let result = f(&mut copy)?;
            *pending = copy;
            return Ok(result);
        }
        let mut database = self.database.lock().await;
        let mut copy = database.clone();
        let result = f(&mut copy)?;
        *database = copy;
        Ok(result)
    }

    pub(crate) async fn commit(&mut self) -> Result<()> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| Error::msg("No transaction is open"))?;
        if self.driver.commits_fail() {
            self.driver
                .counters()
                .rollbacks
                .fetch_add(1, Ordering::Relaxed);
            return Err(Error::msg("The commit was rejected by the memory database"));
        }
        *self.database.lock().await = pending;
        self.driver
            .counters()
            .commits
            .fetch_add(1, Ordering::Relaxed);
        log::debug!("Transaction committed");
        Ok(())
    }

    pub(crate) fn rollback(&mut self) -> Result<()> {
        self.pending
            .take()
            .ok_or_else(|| Error::msg("No transaction is open"))?;
        self.driver
            .counters()
            .rollbacks
            .fetch_add(1, Ordering::Relaxed);
        log::debug!("Transaction rolled back");
        Ok(())
    }
}

impl Executor for MemoryConnection {
    type Driver = MemoryDriver;

    fn driver(&self) -> &Self::Driver {
        &self.driver
    }

    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        async move {
            self.driver.pause().await;
            self.driver
                .counters()
                .statements
                .fetch_add(1, Ordering::Relaxed);
            let results = self
                .with_database(|database| database.execute(&statement))
                .await?;
            Ok::<_, Error>(stream::iter(results.into_iter().map(Ok)))
        }
        .try_flatten_stream()
    }

    fn bulk_copy(
        &mut self,
        rows: &StagedRows,
        options: &BulkCopyOptions,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        async move {
            self.driver.pause().await;
            self.driver
                .counters()
                .bulk_copies
                .fetch_add(1, Ordering::Relaxed);
            log::trace!(
                "Bulk copy of {} rows into {} (check constraints: {}, fire triggers: {})",
                rows.len(),
                options.table,
                options.check_constraints,
                options.fire_triggers
            );
            let affected = self
                .with_database(|database| {
                    database
                        .table_mut(&options.table)?
                        .insert_staged(rows, options.keep_identity)
                })
                .await?;
            Ok(RowsAffected::new(affected))
        }
    }
}

impl Connection for MemoryConnection {
    type Transaction<'c> = MemoryTransaction<'c>;

    async fn begin(&mut self) -> Result<MemoryTransaction<'_>> {
        if self.pending.is_some() {
            return Err(Error::msg("A transaction is already open on this connection"));
        }
        self.pending = Some(self.database.lock().await.clone());
        Ok(MemoryTransaction::new(self))
    }
}
