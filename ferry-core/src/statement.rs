use crate::{StagedRows, Value, truncate_long};
use std::{
    fmt::{self, Display},
    time::Duration,
};

/// Name of the structured parameter carrying the staged rows.
pub const STAGED_ROWS_PARAMETER: &str = "@rows";

/// A value bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Scalar parameter, named after its placeholder (`@p0`, `@p1`, ...).
    Value { name: String, value: Value },
    /// Table-valued parameter. The database must declare a table type with the
    /// destination columns of `rows`.
    Rows {
        name: String,
        type_name: Option<String>,
        rows: StagedRows,
    },
}

impl Parameter {
    pub fn name(&self) -> &str {
        match self {
            Parameter::Value { name, .. } | Parameter::Rows { name, .. } => name,
        }
    }
}

/// Which strategy produced a statement.
///
/// Drivers that speak SQL only need [`Statement::sql`]; in-process drivers can
/// execute the statement from this description instead of parsing the text.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum StatementKind {
    #[default]
    Raw,
    Select {
        table: String,
    },
    Insert {
        table: String,
    },
    Update {
        table: String,
        key: String,
        columns: Vec<String>,
    },
    Delete {
        table: String,
        key: String,
    },
    Merge {
        table: String,
        key: String,
        columns: Vec<String>,
    },
    InsertMissing {
        table: String,
        key: String,
        columns: Vec<String>,
    },
    Sync {
        source: String,
        target: String,
        key: String,
        columns: Vec<String>,
        delete_missing: bool,
    },
}

/// Parameterized SQL ready to be handed to an [`Executor`](crate::Executor).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Parameter>,
    pub kind: StatementKind,
    /// Execution timeout, drivers should apply it to the statement.
    pub timeout: Option<Duration>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            sql: sql.into(),
            kind,
            ..Default::default()
        }
    }
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }
    /// The staged rows bound to this statement, if any.
    pub fn staged_rows(&self) -> Option<&StagedRows> {
        self.params.iter().find_map(|p| match p {
            Parameter::Rows { rows, .. } => Some(rows),
            _ => None,
        })
    }
    /// Scalar parameter values in binding order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.params.iter().filter_map(|p| match p {
            Parameter::Value { value, .. } => Some(value),
            _ => None,
        })
    }
}

impl From<String> for Statement {
    fn from(value: String) -> Self {
        Statement::new(value, StatementKind::Raw)
    }
}

impl From<&str> for Statement {
    fn from(value: &str) -> Self {
        Statement::new(value, StatementKind::Raw)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}
