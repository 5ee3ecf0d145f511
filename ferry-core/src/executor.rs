use crate::{
    BulkCopyOptions, Driver, QueryResult, Result, RowLabeled, RowsAffected, SqlWriter, StagedRows,
    Statement, StatementKind,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::future::Future;

pub trait Executor: Send + Sized {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// General method to send any statement and return any result type (either row or count)
    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the statement and returns the rows.
    fn fetch(&mut self, statement: Statement) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(statement).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the statement and return the total number of rows affected.
    fn execute(&mut self, statement: Statement) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(statement)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }

    /// Transfer staged rows into `options.table`. Defaults to a multi-row insert for
    /// drivers without a native bulk path.
    fn bulk_copy(
        &mut self,
        rows: &StagedRows,
        options: &BulkCopyOptions,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        async move {
            if rows.is_empty() {
                return Ok(RowsAffected::default());
            }
            let mut sql = String::new();
            self.driver()
                .sql_writer()
                .write_insert(&mut sql, &options.table, rows, options.keep_nulls);
            let statement = Statement::new(
                sql,
                StatementKind::Insert {
                    table: options.table.clone(),
                },
            )
            .with_timeout(options.timeout);
            self.execute(statement).await
        }
    }
}
