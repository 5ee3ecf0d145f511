use crate::{Executor, Result};
use std::future::Future;

pub trait Transaction<'c>: Executor {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

/// Implement [`Executor`] for a transaction type by delegating to its connection field.
///
/// ```ignore
/// impl_executor_transaction!(MemoryDriver, MemoryTransaction, connection);
/// ```
#[macro_export]
macro_rules! impl_executor_transaction {
    ($driver:ty, $transaction:ident, $connection:ident) => {
        impl<'c> $crate::Executor for $transaction<'c> {
            type Driver = $driver;

            fn driver(&self) -> &Self::Driver {
                use $crate::Executor as _;
                self.$connection.driver()
            }

            fn run(
                &mut self,
                statement: $crate::Statement,
            ) -> impl $crate::stream::Stream<Item = $crate::Result<$crate::QueryResult>> + Send
            {
                use $crate::Executor as _;
                self.$connection.run(statement)
            }

            fn bulk_copy(
                &mut self,
                rows: &$crate::StagedRows,
                options: &$crate::BulkCopyOptions,
            ) -> impl ::std::future::Future<Output = $crate::Result<$crate::RowsAffected>> + Send
            {
                use $crate::Executor as _;
                self.$connection.bulk_copy(rows, options)
            }
        }
    };
}
