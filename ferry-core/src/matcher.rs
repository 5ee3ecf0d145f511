use crate::MemberDescriptor;
use convert_case::{Case, Casing};

/// Identifier prefixes stripped by the heuristic pass: `IdCustomer` matches a column ending in `customer`.
const IDENTIFIER_PREFIXES: &[&str] = &["Id"];

/// How a member gets its value for one result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Read from the column at this index.
    Column(usize),
    /// No column, the member takes its configured default.
    Default,
}

/// Member -> column correspondence for one (descriptor, column set) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Aligned with the descriptor members.
    bindings: Box<[Option<Binding>]>,
}

impl ColumnMapping {
    /// Match `members` against `columns`.
    ///
    /// Explicit columns and exact names are claimed for every member first, then the
    /// heuristics run (identifier prefix, containment, underscore expansion). Columns
    /// are scanned in order and claimed at most once.
    pub fn new<S: AsRef<str>>(columns: &[S], members: &[MemberDescriptor]) -> Self {
        let columns: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        let mut claimed = vec![false; columns.len()];
        let mut bindings: Vec<Option<Binding>> = vec![None; members.len()];
        let mut pending = Vec::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            if member.ignore {
                continue;
            }
            if let Some(column) = &member.column {
                match find(&columns, &claimed, |c| c.eq_ignore_ascii_case(&column.name)) {
                    Some(index) => {
                        claimed[index] = true;
                        bindings[i] = Some(Binding::Column(index));
                    }
                    None => {
                        if !column.optional {
                            log::warn!(
                                "Column `{}` declared for member `{}` is not part of the result",
                                column.name,
                                member.name
                            );
                        }
                    }
                }
                continue;
            }
            match find(&columns, &claimed, |c| c.eq_ignore_ascii_case(&member.name)) {
                Some(index) => {
                    claimed[index] = true;
                    bindings[i] = Some(Binding::Column(index));
                }
                None => pending.push(i),
            }
        }
        for i in pending {
            let member = &members[i];
            if let Some(index) = heuristic(&columns, &claimed, &member.name) {
                claimed[index] = true;
                bindings[i] = Some(Binding::Column(index));
            }
        }
        for (binding, member) in bindings.iter_mut().zip(members) {
            if binding.is_none() && !member.ignore && member.default.is_some() {
                *binding = Some(Binding::Default);
            }
        }
        Self {
            bindings: bindings.into_boxed_slice(),
        }
    }

    pub fn binding(&self, member: usize) -> Option<Binding> {
        self.bindings.get(member).copied().flatten()
    }

    /// Column index bound to the member, if any.
    pub fn column(&self, member: usize) -> Option<usize> {
        match self.binding(member) {
            Some(Binding::Column(index)) => Some(index),
            _ => None,
        }
    }

    pub fn bindings(&self) -> impl Iterator<Item = (usize, Binding)> + '_ {
        self.bindings
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.map(|b| (i, b)))
    }

    /// Number of members bound to a column.
    pub fn matched(&self) -> usize {
        self.bindings
            .iter()
            .filter(|b| matches!(b, Some(Binding::Column(..))))
            .count()
    }
}

fn find(columns: &[&str], claimed: &[bool], predicate: impl Fn(&str) -> bool) -> Option<usize> {
    columns
        .iter()
        .enumerate()
        .find(|(i, c)| !claimed[*i] && predicate(c))
        .map(|(i, _)| i)
}

fn heuristic(columns: &[&str], claimed: &[bool], name: &str) -> Option<usize> {
    let lower = name.to_lowercase();
    for prefix in IDENTIFIER_PREFIXES {
        if lower.len() > prefix.len() && lower.starts_with(&prefix.to_lowercase()) {
            let remainder = &lower[prefix.len()..];
            if let Some(index) = find(columns, claimed, |c| c.to_lowercase().ends_with(remainder)) {
                return Some(index);
            }
        }
    }
    if let Some(index) = find(columns, claimed, |c| {
        let c = c.to_lowercase();
        !c.is_empty() && (lower.contains(&c) || c.contains(&lower))
    }) {
        return Some(index);
    }
    let expanded = name.to_case(Case::Snake);
    find(columns, claimed, |c| c.eq_ignore_ascii_case(&expanded))
}
