use crate::{BulkOperation, BulkOptions, RowSource};
use std::fmt;

/// A bulk operation to run through a [`BulkClient`](crate::BulkClient).
///
/// Sync requests read from `source` and carry no data, every other operation stages
/// `data`.
pub struct BulkRequest<'a> {
    pub operation: BulkOperation,
    pub table: String,
    pub key: Option<String>,
    pub data: Option<Box<dyn RowSource + 'a>>,
    /// Source table of a sync.
    pub source: Option<String>,
    /// Columns copied by a sync.
    pub columns: Vec<String>,
    /// Replaces the client defaults when present.
    pub options: Option<BulkOptions>,
}

impl<'a> BulkRequest<'a> {
    fn new(operation: BulkOperation, table: impl Into<String>) -> Self {
        Self {
            operation,
            table: table.into(),
            key: None,
            data: None,
            source: None,
            columns: Vec::new(),
            options: None,
        }
    }

    pub fn insert(table: impl Into<String>, data: impl RowSource + 'a) -> Self {
        Self {
            data: Some(Box::new(data)),
            ..Self::new(BulkOperation::Insert, table)
        }
    }

    pub fn update(
        table: impl Into<String>,
        key: impl Into<String>,
        data: impl RowSource + 'a,
    ) -> Self {
        Self {
            key: Some(key.into()),
            data: Some(Box::new(data)),
            ..Self::new(BulkOperation::Update, table)
        }
    }

    pub fn delete(
        table: impl Into<String>,
        key: impl Into<String>,
        data: impl RowSource + 'a,
    ) -> Self {
        Self {
            key: Some(key.into()),
            data: Some(Box::new(data)),
            ..Self::new(BulkOperation::Delete, table)
        }
    }

    pub fn upsert(
        table: impl Into<String>,
        key: impl Into<String>,
        data: impl RowSource + 'a,
    ) -> Self {
        Self {
            key: Some(key.into()),
            data: Some(Box::new(data)),
            ..Self::new(BulkOperation::Upsert, table)
        }
    }

    pub fn sync<I, S>(
        source: impl Into<String>,
        target: impl Into<String>,
        key: impl Into<String>,
        columns: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: Some(key.into()),
            source: Some(source.into()),
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::new(BulkOperation::Sync, target)
        }
    }

    pub fn with_options(mut self, options: BulkOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Rows provided by the request, zero for sync.
    pub fn len(&self) -> usize {
        self.data.as_ref().map(|v| v.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for BulkRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkRequest")
            .field("operation", &self.operation)
            .field("table", &self.table)
            .field("key", &self.key)
            .field("data", &self.data.as_ref().map(|v| (v.type_name(), v.len())))
            .field("source", &self.source)
            .field("columns", &self.columns)
            .field("options", &self.options)
            .finish()
    }
}
