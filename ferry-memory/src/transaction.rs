use crate::{MemoryConnection, MemoryDriver};
use ferry_core::{Result, Transaction, impl_executor_transaction};

/// Snapshot transaction: statements run on a copy of the database that replaces
/// the shared one on commit.
pub struct MemoryTransaction<'c> {
    connection: &'c mut MemoryConnection,
}

impl<'c> MemoryTransaction<'c> {
    pub(crate) fn new(connection: &'c mut MemoryConnection) -> Self {
        Self { connection }
    }
}

impl_executor_transaction!(MemoryDriver, MemoryTransaction, connection);

impl<'c> Transaction<'c> for MemoryTransaction<'c> {
    async fn commit(self) -> Result<()> {
        self.connection.commit().await
    }

    async fn rollback(self) -> Result<()> {
        self.connection.rollback()
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if self.connection.pending.take().is_some() {
            log::warn!("Transaction dropped without commit or rollback, its changes are discarded");
        }
    }
}
