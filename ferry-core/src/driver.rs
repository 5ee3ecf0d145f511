use crate::{Connection, Result, SqlWriter};
use std::future::Future;

/// Entry point of a database backend.
pub trait Driver: Send + Sync + Sized {
    type Connection: Connection<Driver = Self>;
    type SqlWriter: SqlWriter;

    /// Name used in logs.
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;

    /// Open a connection described by `url`.
    fn connect(&self, url: &str) -> impl Future<Output = Result<Self::Connection>> + Send;
}
