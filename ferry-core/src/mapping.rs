use crate::{
    Binding, ColumnMapping, Executor, Model, Result, RowLabeled, Statement, TabularResult,
    TypeDescriptor, Value, coerce, stream::TryStreamExt,
};

/// One `M` per row of `result`.
///
/// The column mapping is computed once for the whole result. Cells that cannot be
/// converted leave the member to its default, see [`coerce`].
pub fn map_many<M: Model>(result: &TabularResult) -> Vec<M> {
    let descriptor = M::descriptor();
    let mapping = ColumnMapping::new(&result.columns, descriptor.members());
    log::trace!(
        "Mapping {} rows to {}, {} of {} members bound to a column",
        result.len(),
        descriptor.type_name(),
        mapping.matched(),
        descriptor.members().len()
    );
    result
        .rows
        .iter()
        .map(|row| map_row(&descriptor, &mapping, row))
        .collect()
}

/// The first row of `result` as `M`, `None` when there are no rows.
pub fn map_one<M: Model>(result: &TabularResult) -> Option<M> {
    let row = result.rows.first()?;
    let descriptor = M::descriptor();
    let mapping = ColumnMapping::new(&result.columns, descriptor.members());
    Some(map_row(&descriptor, &mapping, row))
}

fn map_row<M: Model>(descriptor: &TypeDescriptor<M>, mapping: &ColumnMapping, row: &[Value]) -> M {
    let mut model = M::default();
    for (index, binding) in mapping.bindings() {
        let member = &descriptor.members()[index];
        let raw = match binding {
            Binding::Column(column) => row.get(column).cloned().unwrap_or_default(),
            Binding::Default => Value::Null,
        };
        let Some(value) = coerce(raw, member).into_value() else {
            continue;
        };
        if let Err(error) = descriptor.set(&mut model, index, value) {
            log::warn!(
                "Cannot assign member `{}` of {}: {:#}",
                member.name,
                descriptor.type_name(),
                error
            );
        }
    }
    model
}

/// Run `statement` and collect the rows it returns.
pub async fn fetch_tabular<E: Executor>(
    executor: &mut E,
    statement: impl Into<Statement>,
) -> Result<TabularResult> {
    let rows: Vec<RowLabeled> = executor.fetch(statement.into()).try_collect().await?;
    TabularResult::from_labeled(rows)
}

pub async fn fetch_many<M: Model, E: Executor>(
    executor: &mut E,
    statement: impl Into<Statement>,
) -> Result<Vec<M>> {
    Ok(map_many(&fetch_tabular(executor, statement).await?))
}

pub async fn fetch_one<M: Model, E: Executor>(
    executor: &mut E,
    statement: impl Into<Statement>,
) -> Result<Option<M>> {
    Ok(map_one(&fetch_tabular(executor, statement).await?))
}
