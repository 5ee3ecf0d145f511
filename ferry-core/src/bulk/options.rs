use std::{collections::HashMap, time::Duration};

/// How an upsert resolves existing rows.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStrategy {
    /// Update matched rows, insert the others.
    #[default]
    Merge,
    /// Insert only the rows whose key is not present yet.
    InsertIfNotExists,
    /// Update only the rows whose key is present.
    UpdateIfExists,
}

/// Per call configuration of a bulk operation.
///
/// Built with `BulkOptions::default()` and the `with_*` setters, passed by value.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOptions {
    /// Rows per transfer chunk.
    pub batch_size: usize,
    /// Bound of each transfer.
    pub timeout: Duration,
    /// Write the staged identity values instead of letting the table generate them.
    pub keep_identity: bool,
    pub check_constraints: bool,
    /// Write NULL instead of the column default for null values.
    pub keep_nulls: bool,
    pub fire_triggers: bool,
    /// Member name -> table column.
    pub column_renames: HashMap<String, String>,
    /// Members (or their columns) not staged.
    pub excluded_columns: Vec<String>,
    /// Wrap the operation in a transaction owned by the call.
    pub use_transaction: bool,
    /// Columns written by updates, `None` means every staged column except the key.
    pub update_columns: Option<Vec<String>>,
    pub upsert_strategy: UpsertStrategy,
    /// Sync deletes target rows missing from the source.
    pub delete_missing: bool,
    /// Declared table type of the staged rows parameter.
    pub table_type: Option<String>,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            timeout: Duration::from_secs(30),
            keep_identity: false,
            check_constraints: false,
            keep_nulls: false,
            fire_triggers: false,
            column_renames: HashMap::new(),
            excluded_columns: Vec::new(),
            use_transaction: true,
            update_columns: None,
            upsert_strategy: UpsertStrategy::Merge,
            delete_missing: false,
            table_type: None,
        }
    }
}

impl BulkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_keep_identity(mut self, enabled: bool) -> Self {
        self.keep_identity = enabled;
        self
    }

    pub fn with_check_constraints(mut self, enabled: bool) -> Self {
        self.check_constraints = enabled;
        self
    }

    pub fn with_keep_nulls(mut self, enabled: bool) -> Self {
        self.keep_nulls = enabled;
        self
    }

    pub fn with_fire_triggers(mut self, enabled: bool) -> Self {
        self.fire_triggers = enabled;
        self
    }

    pub fn with_rename(mut self, member: impl Into<String>, column: impl Into<String>) -> Self {
        self.column_renames.insert(member.into(), column.into());
        self
    }

    pub fn with_excluded(mut self, member: impl Into<String>) -> Self {
        self.excluded_columns.push(member.into());
        self
    }

    pub fn with_transaction(mut self, enabled: bool) -> Self {
        self.use_transaction = enabled;
        self
    }

    pub fn with_update_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_upsert_strategy(mut self, strategy: UpsertStrategy) -> Self {
        self.upsert_strategy = strategy;
        self
    }

    pub fn with_delete_missing(mut self, enabled: bool) -> Self {
        self.delete_missing = enabled;
        self
    }

    pub fn with_table_type(mut self, name: impl Into<String>) -> Self {
        self.table_type = Some(name.into());
        self
    }

    /// Table column a member is renamed to, compared ignoring case.
    pub fn rename_of(&self, member: &str) -> Option<&str> {
        self.column_renames
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(member))
            .map(|(_, v)| v.as_str())
    }
}

/// Settings handed to [`Executor::bulk_copy`](crate::Executor::bulk_copy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkCopyOptions {
    pub table: String,
    pub batch_size: usize,
    pub timeout: Duration,
    pub keep_identity: bool,
    pub check_constraints: bool,
    pub keep_nulls: bool,
    pub fire_triggers: bool,
}

impl BulkCopyOptions {
    pub fn new(table: impl Into<String>, options: &BulkOptions) -> Self {
        Self {
            table: table.into(),
            batch_size: options.batch_size,
            timeout: options.timeout,
            keep_identity: options.keep_identity,
            check_constraints: options.check_constraints,
            keep_nulls: options.keep_nulls,
            fire_triggers: options.fire_triggers,
        }
    }
}
