use ferry_core::{
    Error, QueryResult, Result, RowLabeled, RowNames, RowsAffected, StagedRows, Statement,
    StatementKind, Value, position_ignore_case,
};
use std::collections::HashMap;

/// A table of the in-process database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    /// Primary key column, unique among rows.
    pub key: Option<String>,
    /// The key is generated unless the transfer keeps identity values.
    pub identity: bool,
    pub rows: Vec<Vec<Value>>,
    next_identity: i64,
}

fn same_key(a: &Value, b: &Value) -> bool {
    match (a.as_i128(), b.as_i128()) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            next_identity: 1,
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Append rows given in column order, bypassing identity generation.
    pub fn with_rows<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        self.rows.extend(rows);
        if let Ok(key) = self.key_index() {
            let max = self
                .rows
                .iter()
                .filter_map(|row| row[key].as_i128())
                .max()
                .unwrap_or_default();
            self.next_identity = self.next_identity.max(max as i64 + 1);
        }
        self
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        position_ignore_case(&self.columns, name)
    }

    fn key_index(&self) -> Result<usize> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| Error::msg("The table has no key"))?;
        self.column_index(key)
            .ok_or_else(|| Error::msg(format!("Key column `{}` does not exist", key)))
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::msg(format!("Invalid column name `{}`", name)))
    }

    fn position(&self, column: usize, value: &Value) -> Option<usize> {
        self.rows.iter().position(|row| same_key(&row[column], value))
    }

    /// Value of `column` in the row identified by `key`, for assertions.
    pub fn get(&self, key: &Value, column: &str) -> Option<&Value> {
        let key_index = self.key_index().ok()?;
        let column = self.column_index(column)?;
        let row = self.position(key_index, key)?;
        Some(&self.rows[row][column])
    }

    /// Insert one row given as (column, value) pairs, the other columns are NULL.
    fn insert<'a>(
        &mut self,
        values: impl IntoIterator<Item = (&'a str, &'a Value)>,
        keep_identity: bool,
    ) -> Result<()> {
        let mut row = vec![Value::Null; self.columns.len()];
        for (column, value) in values {
            row[self.require_column(column)?] = value.clone();
        }
        if self.key.is_some() {
            let key = self.key_index()?;
            if self.identity {
                if !keep_identity || row[key].is_null() {
                    row[key] = Value::Int64(Some(self.next_identity));
                }
                if let Some(v) = row[key].as_i128() {
                    self.next_identity = self.next_identity.max(v as i64 + 1);
                }
            }
            if row[key].is_null() {
                return Err(Error::msg(format!(
                    "Cannot insert NULL into the key column `{}`",
                    self.columns[key]
                )));
            }
            if self.position(key, &row[key]).is_some() {
                return Err(Error::msg(format!(
                    "Violation of the primary key, duplicate key {}",
                    row[key]
                )));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Set `columns` of row `index` from the staged `values`.
    fn assign(
        &mut self,
        index: usize,
        staged: &StagedRows,
        values: &[Value],
        columns: &[String],
    ) -> Result<()> {
        for column in columns {
            let target = self.require_column(column)?;
            let source = staged.destination_index(column).ok_or_else(|| {
                Error::msg(format!("Column `{}` is not part of the staged rows", column))
            })?;
            self.rows[index][target] = values[source].clone();
        }
        Ok(())
    }

    pub fn insert_staged(&mut self, staged: &StagedRows, keep_identity: bool) -> Result<u64> {
        for row in staged.rows() {
            self.insert(
                staged
                    .destinations()
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter()),
                keep_identity,
            )?;
        }
        Ok(staged.len() as u64)
    }

    fn update_staged(&mut self, staged: &StagedRows, key: &str, columns: &[String]) -> Result<u64> {
        let key_index = self.require_column(key)?;
        let source_key = staged
            .destination_index(key)
            .ok_or_else(|| Error::msg(format!("Key `{}` is not part of the staged rows", key)))?;
        let mut affected = 0;
        for row in staged.rows() {
            if let Some(index) = self.position(key_index, &row[source_key]) {
                self.assign(index, staged, row, columns)?;
                affected += 1;
            }
        }
        Ok(affected)
    }

    /// Update matched rows with `columns` (when `update`), insert the others with the
    /// key and `columns`.
    fn merge_staged(
        &mut self,
        staged: &StagedRows,
        key: &str,
        columns: &[String],
        update: bool,
    ) -> Result<u64> {
        let key_index = self.require_column(key)?;
        let source_key = staged
            .destination_index(key)
            .ok_or_else(|| Error::msg(format!("Key `{}` is not part of the staged rows", key)))?;
        let mut affected = 0;
        for row in staged.rows() {
            match self.position(key_index, &row[source_key]) {
                Some(index) => {
                    if update && !columns.is_empty() {
                        self.assign(index, staged, row, columns)?;
                        affected += 1;
                    }
                }
                None => {
                    let mut values = vec![(key, &row[source_key])];
                    for column in columns.iter().filter(|c| !c.eq_ignore_ascii_case(key)) {
                        let source = staged.destination_index(column).ok_or_else(|| {
                            Error::msg(format!("Column `{}` is not part of the staged rows", column))
                        })?;
                        values.push((column.as_str(), &row[source]));
                    }
                    self.insert(values, true)?;
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    fn delete_keys<'a>(&mut self, key: &str, keys: impl Iterator<Item = &'a Value>) -> Result<u64> {
        let key_index = self.require_column(key)?;
        let keys: Vec<&Value> = keys.collect();
        let before = self.rows.len();
        self.rows
            .retain(|row| !keys.iter().any(|k| same_key(&row[key_index], k)));
        Ok((before - self.rows.len()) as u64)
    }
}

/// Named tables, looked up ignoring case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    tables: HashMap<String, Table>,
}

impl Database {
    pub fn create_table(&mut self, name: &str, table: Table) {
        self.tables.insert(name.to_lowercase(), table);
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| Error::msg(format!("Invalid object name `{}`", name)))
    }

    /// Run a generated statement from its description.
    pub fn execute(&mut self, statement: &Statement) -> Result<Vec<QueryResult>> {
        let staged = || {
            statement
                .staged_rows()
                .ok_or_else(|| Error::msg("The statement has no staged rows parameter"))
        };
        let affected = match &statement.kind {
            StatementKind::Raw => {
                return Err(Error::msg(format!(
                    "Raw SQL is not supported by the memory driver: {}",
                    statement
                )));
            }
            StatementKind::Select { table } => {
                let table = self
                    .table(table)
                    .ok_or_else(|| Error::msg(format!("Invalid object name `{}`", table)))?;
                let labels: RowNames = table.columns.clone().into();
                return Ok(table
                    .rows
                    .iter()
                    .map(|row| {
                        QueryResult::Row(RowLabeled::new(labels.clone(), row.clone().into()))
                    })
                    .collect());
            }
            StatementKind::Insert { table } => self.table_mut(table)?.insert_staged(staged()?, false)?,
            StatementKind::Update {
                table,
                key,
                columns,
            } => self.table_mut(table)?.update_staged(staged()?, key, columns)?,
            StatementKind::Delete { table, key } => {
                self.table_mut(table)?.delete_keys(key, statement.values())?
            }
            StatementKind::Merge {
                table,
                key,
                columns,
            } => self
                .table_mut(table)?
                .merge_staged(staged()?, key, columns, true)?,
            StatementKind::InsertMissing {
                table,
                key,
                columns,
            } => self
                .table_mut(table)?
                .merge_staged(staged()?, key, columns, false)?,
            StatementKind::Sync {
                source,
                target,
                key,
                columns,
                delete_missing,
            } => self.sync(source, target, key, columns, *delete_missing)?,
        };
        Ok(vec![QueryResult::Affected(RowsAffected::new(affected))])
    }

    fn sync(
        &mut self,
        source: &str,
        target: &str,
        key: &str,
        columns: &[String],
        delete_missing: bool,
    ) -> Result<u64> {
        let source_table = self
            .table(source)
            .ok_or_else(|| Error::msg(format!("Invalid object name `{}`", source)))?;
        let mut names = vec![key.to_string()];
        names.extend(
            columns
                .iter()
                .filter(|c| !c.eq_ignore_ascii_case(key))
                .cloned(),
        );
        let mut staged = StagedRows::with_columns(names.clone())?;
        for row in &source_table.rows {
            let values = names
                .iter()
                .map(|c| {
                    source_table
                        .require_column(c)
                        .map(|i| row[i].clone())
                })
                .collect::<Result<Vec<_>>>()?;
            staged.push(values.into())?;
        }
        let keys = staged.column_values(key)?;
        let target_table = self.table_mut(target)?;
        let mut affected = target_table.merge_staged(&staged, key, &names[1..], true)?;
        if delete_missing {
            let key_index = target_table.require_column(key)?;
            let before = target_table.rows.len();
            target_table
                .rows
                .retain(|row| keys.iter().any(|k| same_key(&row[key_index], k)));
            affected += (before - target_table.rows.len()) as u64;
        }
        Ok(affected)
    }
}
