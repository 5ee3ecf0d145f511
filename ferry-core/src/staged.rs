use crate::{
    BulkOptions, Error, Model, Result, Row, RowNames, Value, contains_ignore_case,
    position_ignore_case,
};
use std::any;

/// In-memory tabular payload handed to bulk transfers and table-valued parameters.
///
/// Every column carries both the source name (model member) and the destination
/// name (table column), the latter after renames.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedRows {
    columns: RowNames,
    destinations: RowNames,
    rows: Vec<Row>,
}

impl StagedRows {
    pub fn new(columns: Vec<String>, destinations: Vec<String>) -> Result<Self> {
        if columns.len() != destinations.len() {
            return Err(Error::msg(format!(
                "Staged rows declare {} columns but {} destinations",
                columns.len(),
                destinations.len()
            )));
        }
        for (i, destination) in destinations.iter().enumerate() {
            if position_ignore_case(&destinations[..i], destination).is_some() {
                return Err(Error::msg(format!(
                    "Destination column `{}` is written by more than one member",
                    destination
                )));
            }
        }
        Ok(Self {
            columns: columns.into(),
            destinations: destinations.into(),
            rows: Vec::new(),
        })
    }

    /// Rows whose source and destination names coincide.
    pub fn with_columns(columns: Vec<String>) -> Result<Self> {
        Self::new(columns.clone(), columns)
    }

    pub fn push(&mut self, row: Row) -> Result<&mut Self> {
        if row.len() != self.columns.len() {
            return Err(Error::msg(format!(
                "Row has {} values but the staged rows have {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (source, destination) column pairs, in column order.
    pub fn mappings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.destinations.iter().map(String::as_str))
    }

    pub fn destination_index(&self, name: &str) -> Option<usize> {
        position_ignore_case(&self.destinations, name)
    }

    /// Values of the destination column `name`.
    pub fn column_values(&self, name: &str) -> Result<Vec<Value>> {
        let index = self.destination_index(name).ok_or_else(|| {
            Error::msg(format!("Column `{}` is not part of the staged rows", name))
        })?;
        Ok(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    /// Split into consecutive pieces of at most `size` rows, sharing the column names.
    pub fn chunks(&self, size: usize) -> impl Iterator<Item = StagedRows> + '_ {
        self.rows.chunks(size.max(1)).map(|rows| StagedRows {
            columns: self.columns.clone(),
            destinations: self.destinations.clone(),
            rows: rows.to_vec(),
        })
    }
}

/// A collection that can be staged for a bulk operation.
pub trait RowSource: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Materialize the rows, honoring `options.excluded_columns` and
    /// `options.column_renames`.
    fn stage(&self, options: &BulkOptions) -> Result<StagedRows>;
}

fn stage_models<M: Model>(models: &[M], options: &BulkOptions) -> Result<StagedRows> {
    let descriptor = M::descriptor();
    let members: Vec<_> = descriptor
        .mapped_members()
        .filter(|(_, m)| {
            !contains_ignore_case(&options.excluded_columns, &m.name)
                && !contains_ignore_case(&options.excluded_columns, m.column_name())
        })
        .collect();
    if members.is_empty() {
        return Err(Error::msg(format!(
            "{} has no member left to stage",
            descriptor.type_name()
        )));
    }
    let columns = members.iter().map(|(_, m)| m.name.clone()).collect();
    let destinations = members
        .iter()
        .map(|(_, m)| {
            options
                .rename_of(&m.name)
                .unwrap_or(m.column_name())
                .to_string()
        })
        .collect();
    let mut staged = StagedRows::new(columns, destinations)?;
    staged.rows.reserve(models.len());
    for model in models {
        staged.rows.push(
            members
                .iter()
                .map(|(i, _)| descriptor.get(model, *i))
                .collect(),
        );
    }
    Ok(staged)
}

impl<M: Model> RowSource for &[M] {
    fn len(&self) -> usize {
        <[M]>::len(self)
    }
    fn type_name(&self) -> &'static str {
        any::type_name::<M>()
    }
    fn stage(&self, options: &BulkOptions) -> Result<StagedRows> {
        stage_models(self, options)
    }
}

impl<M: Model> RowSource for Vec<M> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
    fn type_name(&self) -> &'static str {
        any::type_name::<M>()
    }
    fn stage(&self, options: &BulkOptions) -> Result<StagedRows> {
        stage_models(self, options)
    }
}

/// Rows staged by hand, exclusions and renames apply to the source names.
impl RowSource for StagedRows {
    fn len(&self) -> usize {
        self.rows.len()
    }
    fn type_name(&self) -> &'static str {
        any::type_name::<Self>()
    }
    fn stage(&self, options: &BulkOptions) -> Result<StagedRows> {
        let kept: Vec<usize> = (0..self.columns.len())
            .filter(|i| !contains_ignore_case(&options.excluded_columns, &self.columns[*i]))
            .collect();
        if kept.is_empty() {
            return Err(Error::msg("No column left to stage"));
        }
        let mut staged = StagedRows::new(
            kept.iter().map(|i| self.columns[*i].clone()).collect(),
            kept.iter()
                .map(|i| {
                    options
                        .rename_of(&self.columns[*i])
                        .unwrap_or(&self.destinations[*i])
                        .to_string()
                })
                .collect(),
        )?;
        staged.rows = self
            .rows
            .iter()
            .map(|row| kept.iter().map(|i| row[*i].clone()).collect())
            .collect();
        Ok(staged)
    }
}
