use crate::{Executor, Result, Transaction};
use std::future::Future;

pub trait Connection: Executor {
    type Transaction<'c>: Transaction<'c, Driver = Self::Driver>
    where
        Self: 'c;

    /// Start a transaction, it borrows the connection until committed or rolled back.
    fn begin(&mut self) -> impl Future<Output = Result<Self::Transaction<'_>>> + Send;
}
