use crate::{AsValue, Result, TypeDescriptor, Value, describe};
use std::{fmt, sync::Arc};

/// A type that can be materialized from result rows and staged for bulk writes.
///
/// The members are declared once in [`Model::schema`], the registration is turned
/// into a [`TypeDescriptor`] the first time the type is used and cached for the
/// rest of the process.
///
/// ```rust
/// use ferry_core::{Model, Schema};
///
/// #[derive(Default, Debug)]
/// struct Customer {
///     id: i32,
///     name: String,
///     nickname: Option<String>,
///     scratch: Vec<u8>,
/// }
///
/// impl Model for Customer {
///     fn schema(schema: Schema<Self>) -> Schema<Self> {
///         schema
///             .field("Id", |m| &m.id, |m| &mut m.id)
///             .field("Name", |m| &m.name, |m| &mut m.name)
///             .column("customer_name")
///             .field("Nickname", |m| &m.nickname, |m| &mut m.nickname)
///             .default_value("n/a")
///             .field("Scratch", |m| &m.scratch, |m| &mut m.scratch)
///             .ignore()
///     }
/// }
/// ```
pub trait Model: Default + Send + Sync + 'static {
    fn schema(schema: Schema<Self>) -> Schema<Self>;

    fn descriptor() -> Arc<TypeDescriptor<Self>> {
        describe::<Self>()
    }
}

/// Explicit column name of a member.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOverride {
    pub name: String,
    /// Missing column is not worth a diagnostic.
    pub optional: bool,
}

/// Custom conversion applied to raw cells before assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Type prototype the raw cell is converted to first.
    pub target: Value,
    /// `time` format description for temporal targets, number pattern (`#,##0.00`)
    /// for decimal targets.
    pub format: Option<String>,
}

/// Static description of one member of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    pub name: String,
    /// Type prototype (`Value::Int32(None)` for `i32`).
    pub value: Value,
    pub nullable: bool,
    pub column: Option<ColumnOverride>,
    pub default: Option<Value>,
    pub conversion: Option<Conversion>,
    pub ignore: bool,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, value: Value, nullable: bool) -> Self {
        Self {
            name: name.into(),
            value,
            nullable,
            column: None,
            default: None,
            conversion: None,
            ignore: false,
        }
    }
    /// Column name used when writing this member to a table.
    pub fn column_name(&self) -> &str {
        self.column
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(&self.name)
    }
}

pub(crate) type Getter<M> = Box<dyn Fn(&M) -> Value + Send + Sync>;
pub(crate) type Setter<M> = Box<dyn Fn(&mut M, Value) -> Result<()> + Send + Sync>;

pub(crate) struct Accessor<M> {
    pub(crate) get: Getter<M>,
    pub(crate) set: Setter<M>,
}

/// Registration builder handed to [`Model::schema`].
///
/// Modifiers (`column`, `optional`, `default_value`, `convert`, `format`, `ignore`)
/// apply to the last declared field.
pub struct Schema<M> {
    pub(crate) members: Vec<MemberDescriptor>,
    pub(crate) accessors: Vec<Accessor<M>>,
}

impl<M: Model> Schema<M> {
    pub(crate) fn new() -> Self {
        Self {
            members: Vec::new(),
            accessors: Vec::new(),
        }
    }

    pub fn field<T>(mut self, name: &str, get: fn(&M) -> &T, get_mut: fn(&mut M) -> &mut T) -> Self
    where
        T: AsValue + Clone + 'static,
    {
        self.members
            .push(MemberDescriptor::new(name, T::as_empty_value(), T::NULLABLE));
        self.accessors.push(Accessor {
            get: Box::new(move |model: &M| get(model).clone().as_value()),
            set: Box::new(move |model: &mut M, value: Value| {
                *get_mut(model) = T::try_from_value(value)?;
                Ok(())
            }),
        });
        self
    }

    /// Read this member from `column` instead of matching by name.
    pub fn column(self, column: &str) -> Self {
        self.modify("column", |m| {
            m.column = Some(ColumnOverride {
                name: column.into(),
                optional: false,
            })
        })
    }

    /// The explicit column may be missing from a result without a diagnostic.
    pub fn optional(self) -> Self {
        self.modify("optional", |m| match &mut m.column {
            Some(column) => column.optional = true,
            None => log::error!(
                "`optional` on member `{}` requires an explicit `column`",
                m.name
            ),
        })
    }

    pub fn default_value(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.modify("default_value", |m| m.default = Some(value))
    }

    /// Convert raw cells to `target` before converting them to the member type.
    pub fn convert(self, target: Value) -> Self {
        self.modify("convert", |m| {
            m.conversion = Some(Conversion {
                target,
                format: None,
            })
        })
    }

    /// Format used by the conversion, the target defaults to the member type.
    pub fn format(self, format: &str) -> Self {
        self.modify("format", |m| {
            let target = m.value.clone();
            m.conversion
                .get_or_insert(Conversion {
                    target,
                    format: None,
                })
                .format = Some(format.into())
        })
    }

    /// Exclude the member from mapping and from staged payloads.
    pub fn ignore(self) -> Self {
        self.modify("ignore", |m| m.ignore = true)
    }

    fn modify(mut self, modifier: &str, f: impl FnOnce(&mut MemberDescriptor)) -> Self {
        match self.members.last_mut() {
            Some(member) => f(member),
            None => log::error!(
                "`{}` must follow a `field` declaration in the schema of {}",
                modifier,
                std::any::type_name::<M>()
            ),
        }
        self
    }
}

impl<M> fmt::Debug for Schema<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("members", &self.members)
            .field("accessors", &"..")
            .finish()
    }
}
