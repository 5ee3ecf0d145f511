use crate::{
    BatchItemError, BatchResult, BulkCopyOptions, BulkOperation, BulkOptions, BulkRequest,
    BulkResult, BulkTimings, Connection, Driver, Error, Executor, Parameter, Result, RowSource,
    STAGED_ROWS_PARAMETER, SqlWriter, StagedRows, Statement, StatementKind, Transaction,
    UpsertStrategy, contains_ignore_case, position_ignore_case, validate_identifier,
    validate_table_name, writer::Context,
};
use anyhow::Context as _;
use std::time::{Duration, Instant};

/// One unit of work of a prepared request.
#[derive(Debug)]
enum Transfer {
    Copy {
        rows: StagedRows,
        options: BulkCopyOptions,
    },
    Statement(Statement),
}

/// Runs bulk operations against the database reached through `driver` at `url`.
///
/// Every call opens its own connection. Results are always returned as values:
/// [`BulkClient::execute`] never fails, [`BulkClient::batch`] only fails when the
/// transaction itself cannot be opened or committed.
pub struct BulkClient<D: Driver> {
    driver: D,
    url: String,
    options: BulkOptions,
}

impl<D: Driver> BulkClient<D> {
    pub fn new(driver: D, url: impl Into<String>) -> Self {
        Self {
            driver,
            url: url.into(),
            options: BulkOptions::default(),
        }
    }

    /// Defaults of the requests that do not carry their own options.
    pub fn with_options(mut self, options: BulkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn options(&self) -> &BulkOptions {
        &self.options
    }

    pub async fn insert<'a>(
        &self,
        table: impl Into<String>,
        data: impl RowSource + 'a,
    ) -> BulkResult {
        self.execute(BulkRequest::insert(table, data)).await
    }

    pub async fn update<'a>(
        &self,
        table: impl Into<String>,
        key: impl Into<String>,
        data: impl RowSource + 'a,
    ) -> BulkResult {
        self.execute(BulkRequest::update(table, key, data)).await
    }

    pub async fn delete<'a>(
        &self,
        table: impl Into<String>,
        key: impl Into<String>,
        data: impl RowSource + 'a,
    ) -> BulkResult {
        self.execute(BulkRequest::delete(table, key, data)).await
    }

    pub async fn upsert<'a>(
        &self,
        table: impl Into<String>,
        key: impl Into<String>,
        data: impl RowSource + 'a,
    ) -> BulkResult {
        self.execute(BulkRequest::upsert(table, key, data)).await
    }

    pub async fn sync<I, S>(
        &self,
        source: impl Into<String>,
        target: impl Into<String>,
        key: impl Into<String>,
        columns: I,
    ) -> BulkResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute(BulkRequest::sync(source, target, key, columns))
            .await
    }

    /// Run one bulk operation in its own connection and, unless disabled, its own
    /// transaction.
    pub async fn execute(&self, request: BulkRequest<'_>) -> BulkResult {
        let start = Instant::now();
        let operation = request.operation;
        let options = request.options.as_ref().unwrap_or(&self.options);
        if operation != BulkOperation::Sync && request.is_empty() {
            log::debug!("Bulk {} into {} skipped, no rows", operation, request.table);
            return BulkResult::success(operation, 0, Duration::ZERO);
        }
        let mut timings = BulkTimings::default();
        let mut affected = 0;
        let outcome = match self.prepare(&request, options) {
            Ok(transfers) => {
                timings.preparation = start.elapsed();
                self.transfer(&transfers, options, &mut affected, &mut timings)
                    .await
            }
            Err(error) => Err(error),
        };
        let elapsed = start.elapsed();
        match outcome {
            Ok(()) => {
                log::info!(
                    "Bulk {} into {} completed, {} rows affected in {:?}",
                    operation,
                    request.table,
                    affected,
                    elapsed
                );
                BulkResult::success(operation, affected, elapsed).with_timings(timings, elapsed)
            }
            Err(error) => {
                let error = error.context(format!(
                    "While running bulk {} into {} with {}",
                    operation,
                    request.table,
                    D::NAME
                ));
                log::error!("{:#}", error);
                BulkResult::failure(operation, affected, error).with_timings(timings, elapsed)
            }
        }
    }

    /// Run every request inside one transaction.
    ///
    /// A failing item is recorded and the next one runs. The transaction is committed
    /// whatever the item outcomes, the rows written by the succeeded items persist.
    pub async fn batch(&self, requests: Vec<BulkRequest<'_>>) -> Result<BatchResult> {
        let start = Instant::now();
        let mut result = BatchResult {
            total: requests.len(),
            ..Default::default()
        };
        if requests.is_empty() {
            return Ok(result);
        }
        let mut connection = self
            .driver
            .connect(&self.url)
            .await
            .with_context(|| format!("While connecting with {} to run a batch", D::NAME))?;
        let mut transaction = connection
            .begin()
            .await
            .context("While beginning the transaction of a batch")?;
        for (index, request) in requests.iter().enumerate() {
            match self.run_item(&mut transaction, request).await {
                Ok(affected) => {
                    result.succeeded += 1;
                    result.rows_affected += affected;
                }
                Err(error) => {
                    log::error!(
                        "Batch item {} ({} into {}) failed: {:#}",
                        index,
                        request.operation,
                        request.table,
                        error
                    );
                    result.failed += 1;
                    result.errors.push(BatchItemError {
                        index,
                        operation: request.operation,
                        message: format!("{:#}", error),
                    });
                }
            }
        }
        transaction
            .commit()
            .await
            .context("While committing the transaction of a batch")?;
        result.elapsed = start.elapsed();
        log::info!(
            "Batch of {} operations committed, {} succeeded, {} failed in {:?}",
            result.total,
            result.succeeded,
            result.failed,
            result.elapsed
        );
        Ok(result)
    }

    async fn run_item<E: Executor>(&self, executor: &mut E, request: &BulkRequest<'_>) -> Result<u64> {
        let options = request.options.as_ref().unwrap_or(&self.options);
        if request.operation != BulkOperation::Sync && request.is_empty() {
            return Ok(0);
        }
        let transfers = self.prepare(request, options)?;
        let mut affected = 0;
        run_transfers(executor, &transfers, options.timeout, &mut affected).await?;
        Ok(affected)
    }

    async fn transfer(
        &self,
        transfers: &[Transfer],
        options: &BulkOptions,
        affected: &mut u64,
        timings: &mut BulkTimings,
    ) -> Result<()> {
        let mut connection = self
            .driver
            .connect(&self.url)
            .await
            .with_context(|| format!("While connecting with {}", D::NAME))?;
        if !options.use_transaction {
            let start = Instant::now();
            let result = run_transfers(&mut connection, transfers, options.timeout, affected).await;
            timings.transfer = start.elapsed();
            return result;
        }
        let mut transaction = connection
            .begin()
            .await
            .context("While beginning the transaction")?;
        let start = Instant::now();
        let result = run_transfers(&mut transaction, transfers, options.timeout, affected).await;
        timings.transfer = start.elapsed();
        if let Err(error) = result {
            *affected = 0;
            if let Err(rollback) = transaction.rollback().await {
                log::error!("Rollback failed: {:#}", rollback);
            }
            return Err(error);
        }
        let start = Instant::now();
        let result = transaction
            .commit()
            .await
            .context("While committing the transaction");
        timings.processing = start.elapsed();
        if result.is_err() {
            *affected = 0;
        }
        result
    }

    /// Validate the identifiers, stage the rows and build the transfers.
    fn prepare(&self, request: &BulkRequest<'_>, options: &BulkOptions) -> Result<Vec<Transfer>> {
        let operation = request.operation;
        let table = request.table.as_str();
        validate_table_name(table).context("Invalid target table")?;
        let key = match operation {
            BulkOperation::Insert => None,
            _ => {
                let key = request
                    .key
                    .as_deref()
                    .ok_or_else(|| Error::msg(format!("Bulk {} requires a key column", operation)))?;
                validate_identifier(key).context("Invalid key column")?;
                Some(key)
            }
        };
        if let Some(table_type) = &options.table_type {
            validate_table_name(table_type).context("Invalid table type of the staged rows")?;
        }
        let writer = self.driver.sql_writer();
        if operation == BulkOperation::Sync {
            let key = key.unwrap_or_default();
            let source = request
                .source
                .as_deref()
                .ok_or_else(|| Error::msg("Sync requires a source table"))?;
            validate_table_name(source).context("Invalid source table")?;
            if request.columns.is_empty() {
                return Err(Error::msg("Sync requires at least one column"));
            }
            for column in &request.columns {
                validate_identifier(column).context("Invalid sync column")?;
            }
            let mut sql = String::new();
            writer.write_sync(
                &mut sql,
                source,
                table,
                key,
                &request.columns,
                options.delete_missing,
            );
            let statement = Statement::new(
                sql,
                StatementKind::Sync {
                    source: source.into(),
                    target: table.into(),
                    key: key.into(),
                    columns: request.columns.clone(),
                    delete_missing: options.delete_missing,
                },
            )
            .with_timeout(options.timeout);
            return Ok(vec![Transfer::Statement(statement)]);
        }
        let data = request
            .data
            .as_ref()
            .ok_or_else(|| Error::msg(format!("Bulk {} requires data", operation)))?;
        let staged = data
            .stage(options)
            .with_context(|| format!("While staging {} rows of {}", data.len(), data.type_name()))?;
        for destination in staged.destinations() {
            validate_identifier(destination).context("Invalid destination column")?;
        }
        log::debug!(
            "Staged {} rows of {} for bulk {} into {}",
            staged.len(),
            data.type_name(),
            operation,
            table
        );
        let key = match key {
            Some(key) => {
                if staged.destination_index(key).is_none() {
                    return Err(Error::msg(format!(
                        "Key column `{}` is not part of the staged columns",
                        key
                    )));
                }
                key
            }
            None => {
                let options = BulkCopyOptions::new(table, options);
                return Ok(staged
                    .chunks(options.batch_size)
                    .map(|rows| Transfer::Copy {
                        rows,
                        options: options.clone(),
                    })
                    .collect());
            }
        };
        let batch_size = options.batch_size.max(1);
        if operation == BulkOperation::Delete {
            let keys = staged.column_values(key)?;
            return Ok(keys
                .chunks(batch_size)
                .map(|keys| {
                    let mut context = Context::default();
                    let placeholders: Vec<String> =
                        keys.iter().map(|_| context.next_placeholder()).collect();
                    let mut sql = String::new();
                    writer.write_delete(&mut sql, table, key, &placeholders);
                    let mut statement = Statement::new(
                        sql,
                        StatementKind::Delete {
                            table: table.into(),
                            key: key.into(),
                        },
                    )
                    .with_timeout(options.timeout);
                    statement.params = placeholders
                        .into_iter()
                        .zip(keys.iter().cloned())
                        .map(|(name, value)| Parameter::Value { name, value })
                        .collect();
                    Transfer::Statement(statement)
                })
                .collect());
        }
        let update_columns = update_columns(&staged, key, options)?;
        let all_columns = staged.destinations().to_vec();
        let strategy = match operation {
            BulkOperation::Upsert => options.upsert_strategy,
            _ => UpsertStrategy::UpdateIfExists,
        };
        if strategy == UpsertStrategy::UpdateIfExists && update_columns.is_empty() {
            return Err(Error::msg(format!(
                "Bulk {} into {} has no column to update",
                operation, table
            )));
        }
        let mut sql = String::new();
        let kind = match strategy {
            UpsertStrategy::Merge => {
                writer.write_merge(&mut sql, table, key, &update_columns, STAGED_ROWS_PARAMETER);
                StatementKind::Merge {
                    table: table.into(),
                    key: key.into(),
                    columns: update_columns,
                }
            }
            UpsertStrategy::InsertIfNotExists => {
                writer.write_insert_missing(&mut sql, table, key, &all_columns, STAGED_ROWS_PARAMETER);
                StatementKind::InsertMissing {
                    table: table.into(),
                    key: key.into(),
                    columns: all_columns,
                }
            }
            UpsertStrategy::UpdateIfExists => {
                writer.write_update(&mut sql, table, key, &update_columns, STAGED_ROWS_PARAMETER);
                StatementKind::Update {
                    table: table.into(),
                    key: key.into(),
                    columns: update_columns,
                }
            }
        };
        Ok(staged
            .chunks(batch_size)
            .map(|rows| {
                Transfer::Statement(
                    Statement::new(sql.clone(), kind.clone())
                        .with_param(Parameter::Rows {
                            name: STAGED_ROWS_PARAMETER.into(),
                            type_name: options.table_type.clone(),
                            rows,
                        })
                        .with_timeout(options.timeout),
                )
            })
            .collect())
    }
}

/// Columns written by updates: the configured list resolved against the staged
/// columns, or every staged column but the key.
fn update_columns(staged: &StagedRows, key: &str, options: &BulkOptions) -> Result<Vec<String>> {
    let Some(columns) = &options.update_columns else {
        return Ok(staged
            .destinations()
            .iter()
            .filter(|c| !c.eq_ignore_ascii_case(key))
            .cloned()
            .collect());
    };
    let mut result = Vec::with_capacity(columns.len());
    for column in columns {
        let destination = staged
            .destination_index(column)
            .or_else(|| position_ignore_case(staged.columns(), column))
            .map(|i| staged.destinations()[i].clone())
            .ok_or_else(|| {
                Error::msg(format!(
                    "Update column `{}` is not part of the staged columns",
                    column
                ))
            })?;
        if !destination.eq_ignore_ascii_case(key) && !contains_ignore_case(&result, &destination) {
            result.push(destination);
        }
    }
    Ok(result)
}

async fn run_transfers<E: Executor>(
    executor: &mut E,
    transfers: &[Transfer],
    timeout: Duration,
    affected: &mut u64,
) -> Result<()> {
    for (i, transfer) in transfers.iter().enumerate() {
        let result = match transfer {
            Transfer::Copy { rows, options } => {
                tokio::time::timeout(timeout, executor.bulk_copy(rows, options)).await
            }
            Transfer::Statement(statement) => {
                log::debug!("Executing {}", statement);
                tokio::time::timeout(timeout, executor.execute(statement.clone())).await
            }
        };
        let rows = result
            .map_err(|_| Error::msg(format!("Transfer timed out after {:?}", timeout)))?
            .with_context(|| format!("While running transfer {} of {}", i + 1, transfers.len()))?;
        *affected += rows.rows_affected;
    }
    Ok(())
}
