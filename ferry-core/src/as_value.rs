use crate::{Error, Result, Value};
use rust_decimal::Decimal;
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native member types and [`Value`].
///
/// `as_empty_value` returns the NULL of the type and doubles as the type prototype
/// recorded in a [`MemberDescriptor`](crate::MemberDescriptor). `try_from_value` is
/// strict: it accepts the canonical variant only, the coercer is responsible for
/// converting anything else beforehand.
pub trait AsValue {
    /// Whether a NULL can be stored (`Option<T>`).
    const NULLABLE: bool = false;
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {value:?} to {}",
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value!(bool, Value::Boolean);
impl_as_value!(i8, Value::Int8);
impl_as_value!(i16, Value::Int16);
impl_as_value!(i32, Value::Int32);
impl_as_value!(i64, Value::Int64);
impl_as_value!(u8, Value::UInt8);
impl_as_value!(u16, Value::UInt16);
impl_as_value!(u32, Value::UInt32);
impl_as_value!(u64, Value::UInt64);
impl_as_value!(f32, Value::Float32);
impl_as_value!(f64, Value::Float64);
impl_as_value!(Decimal, Value::Decimal);
impl_as_value!(String, Value::Varchar);
impl_as_value!(Box<[u8]>, Value::Blob);
impl_as_value!(Vec<u8>, Value::Blob);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(PrimitiveDateTime, Value::Timestamp);
impl_as_value!(OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value!(Uuid, Value::Uuid);

impl<T: AsValue> AsValue for Option<T> {
    const NULLABLE: bool = true;
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

/// Implements [`AsValue`] for a fieldless enum so it can be registered as a model member.
///
/// Text cells are matched case-insensitively against the variant names, integer
/// cells against the discriminants.
///
/// ```rust
/// #[derive(Default, Debug, Clone, Copy, PartialEq)]
/// enum Status {
///     #[default]
///     Active = 1,
///     Suspended = 2,
/// }
/// ferry_core::impl_enum_value!(Status { Active, Suspended });
/// ```
#[macro_export]
macro_rules! impl_enum_value {
    ($enum:ident { $($variant:ident),+ $(,)? }) => {
        impl $enum {
            pub const ENUM_DEF: &'static $crate::EnumDef = &$crate::EnumDef {
                name: stringify!($enum),
                variants: &[$((stringify!($variant), $enum::$variant as i64)),+],
            };
        }
        impl $crate::AsValue for $enum {
            fn as_empty_value() -> $crate::Value {
                $crate::Value::Enum(None, $enum::ENUM_DEF)
            }
            fn as_value(self) -> $crate::Value {
                $crate::Value::Enum(Some(self as i64), $enum::ENUM_DEF)
            }
            fn try_from_value(value: $crate::Value) -> $crate::Result<Self> {
                match value {
                    $crate::Value::Enum(Some(v), ..) => {
                        $(if v == $enum::$variant as i64 {
                            return Ok($enum::$variant);
                        })+
                        Err($crate::Error::msg(format!(
                            "{} is not a discriminant of {}",
                            v,
                            stringify!($enum)
                        )))
                    }
                    _ => Err($crate::Error::msg(format!(
                        "Cannot convert {:?} to {}",
                        value,
                        stringify!($enum)
                    ))),
                }
            }
        }
    };
}
