use crate::{Conversion, Error, MemberDescriptor, Result, Value};
use anyhow::Context;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::str::FromStr;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{self, BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use uuid::Uuid;

const DATE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month]/[day]"),
];
const TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[hour]:[minute]:[second].[subsecond]"),
    format_description!("[hour]:[minute]:[second]"),
    format_description!("[hour]:[minute]"),
];
const TIMESTAMP_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];
const TIMESTAMPTZ_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
    ),
    format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
    ),
    format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory]:[offset_minute]"
    ),
];

/// Outcome of coercing one cell into a member.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Converted cell, ready to be assigned.
    Value(Value),
    /// The cell was NULL or could not be converted, the member default applies.
    Default(Value),
    /// Same as `Default` for members without a default: the member keeps the zero
    /// value of its type.
    Zero,
}

impl Coerced {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Coerced::Value(v) | Coerced::Default(v) => Some(v),
            Coerced::Zero => None,
        }
    }
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Coerced::Value(..))
    }
}

/// Convert a raw cell into the type declared by `member`.
///
/// Never fails: a cell that cannot be converted is reported with a warning and
/// replaced by the member default (or the zero value).
pub fn coerce(raw: Value, member: &MemberDescriptor) -> Coerced {
    if raw.is_null() {
        return fallback(member);
    }
    if raw.same_type(&member.value) {
        return Coerced::Value(raw);
    }
    let converted = match &member.conversion {
        Some(conversion) => convert_custom(&raw, conversion)
            .and_then(|v| convert(v, &member.value))
            .with_context(|| format!("While applying the conversion of member `{}`", member.name)),
        None => convert(raw.clone(), &member.value),
    };
    match converted {
        Ok(value) => Coerced::Value(value),
        Err(error) => {
            log::warn!(
                "Member `{}` falls back to its default, cannot convert {:?} to {}: {:#}",
                member.name,
                raw,
                member.value.type_name(),
                error
            );
            fallback(member)
        }
    }
}

fn fallback(member: &MemberDescriptor) -> Coerced {
    let Some(default) = &member.default else {
        return Coerced::Zero;
    };
    match convert(default.clone(), &member.value) {
        Ok(value) => Coerced::Default(value),
        Err(error) => {
            log::warn!(
                "Default of member `{}` is not a valid {}: {:#}",
                member.name,
                member.value.type_name(),
                error
            );
            Coerced::Zero
        }
    }
}

/// Apply a custom conversion: format-constrained parse first, format-free afterwards.
pub fn convert_custom(raw: &Value, conversion: &Conversion) -> Result<Value> {
    let target = &conversion.target;
    if let (Value::Varchar(Some(text)), Some(format)) = (raw, &conversion.format) {
        if target.is_temporal() || matches!(target, Value::Decimal(..)) {
            match parse_formatted(text.trim(), format, target) {
                Ok(value) => return Ok(value),
                Err(error) => log::debug!(
                    "`{}` does not match the format `{}`, trying without it: {:#}",
                    text,
                    format,
                    error
                ),
            }
        }
    }
    convert(raw.clone(), target)
}

/// Built-in conversion of `value` to the type of the `target` prototype.
pub fn convert(value: Value, target: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(target.as_null());
    }
    if value.same_type(target) || matches!(target, Value::Null) {
        return Ok(value);
    }
    if let Value::Varchar(Some(text)) = &value {
        return parse_text(text.trim(), target);
    }
    convert_generic(value, target)
}

fn out_of_range(value: impl std::fmt::Display, target: &Value) -> Error {
    Error::msg(format!(
        "Value {} is out of range for {}",
        value,
        target.type_name()
    ))
}

fn unsupported(value: &Value, target: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} to {}",
        value,
        target.type_name()
    ))
}

fn from_integer(v: i128, target: &Value) -> Result<Value> {
    macro_rules! ranged {
        ($variant:path, $ty:ty) => {
            <$ty>::try_from(v)
                .map(|v| $variant(Some(v)))
                .map_err(|_| out_of_range(v, target))
        };
    }
    match target {
        Value::Int8(..) => ranged!(Value::Int8, i8),
        Value::Int16(..) => ranged!(Value::Int16, i16),
        Value::Int32(..) => ranged!(Value::Int32, i32),
        Value::Int64(..) => ranged!(Value::Int64, i64),
        Value::UInt8(..) => ranged!(Value::UInt8, u8),
        Value::UInt16(..) => ranged!(Value::UInt16, u16),
        Value::UInt32(..) => ranged!(Value::UInt32, u32),
        Value::UInt64(..) => ranged!(Value::UInt64, u64),
        Value::Boolean(..) => Ok(Value::Boolean(Some(v != 0))),
        Value::Float32(..) => Ok(Value::Float32(Some(v as f32))),
        Value::Float64(..) => Ok(Value::Float64(Some(v as f64))),
        Value::Decimal(..) => Decimal::try_from_i128_with_scale(v, 0)
            .map(|v| Value::Decimal(Some(v)))
            .map_err(|_| out_of_range(v, target)),
        Value::Varchar(..) => Ok(Value::Varchar(Some(v.to_string()))),
        Value::Enum(.., def) => i64::try_from(v)
            .ok()
            .filter(|d| def.contains(*d))
            .map(|d| Value::Enum(Some(d), *def))
            .ok_or_else(|| Error::msg(format!("{} is not a discriminant of {}", v, def.name))),
        _ => Err(Error::msg(format!(
            "Cannot convert the integer {} to {}",
            v,
            target.type_name()
        ))),
    }
}

fn from_float(v: f64, target: &Value) -> Result<Value> {
    match target {
        Value::Float32(..) => Ok(Value::Float32(Some(v as f32))),
        Value::Float64(..) => Ok(Value::Float64(Some(v))),
        Value::Decimal(..) => Decimal::from_f64(v)
            .map(|v| Value::Decimal(Some(v)))
            .ok_or_else(|| out_of_range(v, target)),
        Value::Varchar(..) => Ok(Value::Varchar(Some(v.to_string()))),
        _ if target.is_integer() || matches!(target, Value::Boolean(..)) => {
            if v.fract() != 0.0 || !v.is_finite() {
                return Err(Error::msg(format!(
                    "{} has a fractional part and cannot become {}",
                    v,
                    target.type_name()
                )));
            }
            from_integer(v as i128, target)
        }
        _ => Err(unsupported(&Value::Float64(Some(v)), target)),
    }
}

fn from_timestamp(v: PrimitiveDateTime, target: &Value) -> Result<Value> {
    match target {
        Value::Date(..) => Ok(Value::Date(Some(v.date()))),
        Value::Time(..) => Ok(Value::Time(Some(v.time()))),
        Value::TimestampWithTimezone(..) => Ok(Value::TimestampWithTimezone(Some(v.assume_utc()))),
        Value::Varchar(..) => Ok(Value::Varchar(Some(v.to_string()))),
        _ => Err(unsupported(&Value::Timestamp(Some(v)), target)),
    }
}

fn convert_generic(value: Value, target: &Value) -> Result<Value> {
    if let Some(v) = value.as_i128() {
        if let (Value::Enum(_, def), Value::Varchar(..)) = (&value, target) {
            return Ok(Value::Varchar(Some(
                def.name_of(v as i64).map(String::from).unwrap_or_else(|| v.to_string()),
            )));
        }
        return from_integer(v, target);
    }
    match value {
        Value::Boolean(Some(v)) if !matches!(target, Value::Varchar(..)) => {
            from_integer(v as i128, target)
        }
        Value::Float32(Some(v)) => from_float(v as f64, target),
        Value::Float64(Some(v)) => from_float(v, target),
        Value::Decimal(Some(v)) => match target {
            Value::Float32(..) | Value::Float64(..) => {
                from_float(v.to_f64().ok_or_else(|| out_of_range(v, target))?, target)
            }
            Value::Varchar(..) => Ok(Value::Varchar(Some(v.to_string()))),
            _ if target.is_integer() || matches!(target, Value::Boolean(..) | Value::Enum(..)) => {
                if !v.fract().is_zero() {
                    return Err(Error::msg(format!(
                        "{} has a fractional part and cannot become {}",
                        v,
                        target.type_name()
                    )));
                }
                from_integer(v.to_i128().ok_or_else(|| out_of_range(v, target))?, target)
            }
            _ => Err(unsupported(&value, target)),
        },
        Value::Timestamp(Some(v)) => from_timestamp(v, target),
        Value::TimestampWithTimezone(Some(v)) => match target {
            Value::Varchar(..) => Ok(Value::Varchar(Some(v.format(&Rfc3339)?))),
            _ => {
                let utc = v.to_offset(UtcOffset::UTC);
                from_timestamp(PrimitiveDateTime::new(utc.date(), utc.time()), target)
            }
        },
        Value::Date(Some(v)) => match target {
            Value::Timestamp(..) => Ok(Value::Timestamp(Some(v.midnight()))),
            Value::TimestampWithTimezone(..) => {
                Ok(Value::TimestampWithTimezone(Some(v.midnight().assume_utc())))
            }
            Value::Varchar(..) => Ok(Value::Varchar(Some(v.to_string()))),
            _ => Err(unsupported(&value, target)),
        },
        Value::Blob(Some(ref v)) => match target {
            Value::Uuid(..) => Ok(Value::Uuid(Some(Uuid::from_slice(v)?))),
            Value::Varchar(..) => Ok(Value::Varchar(Some(hex::encode(v)))),
            _ => Err(unsupported(&value, target)),
        },
        Value::Uuid(Some(v)) => match target {
            Value::Blob(..) => Ok(Value::Blob(Some(v.as_bytes().to_vec().into()))),
            Value::Varchar(..) => Ok(Value::Varchar(Some(v.to_string()))),
            _ => Err(unsupported(&value, target)),
        },
        ref v if matches!(target, Value::Varchar(..)) => Ok(Value::Varchar(Some(v.to_string()))),
        _ => Err(unsupported(&value, target)),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    const TRUE: &[&str] = &["true", "t", "yes", "y", "on", "1"];
    const FALSE: &[&str] = &["false", "f", "no", "n", "off", "0"];
    if TRUE.iter().any(|v| v.eq_ignore_ascii_case(text)) {
        Some(true)
    } else if FALSE.iter().any(|v| v.eq_ignore_ascii_case(text)) {
        Some(false)
    } else {
        None
    }
}

fn parse_with<T>(
    text: &str,
    formats: &[&[BorrowedFormatItem<'static>]],
    parse: impl Fn(&str, &[BorrowedFormatItem<'static>]) -> std::result::Result<T, time::error::Parse>,
) -> Option<T> {
    formats.iter().find_map(|format| parse(text, format).ok())
}

fn parse_text(text: &str, target: &Value) -> Result<Value> {
    let context = || format!("Cannot parse `{}` as {}", text, target.type_name());
    let value = match target {
        Value::Boolean(..) => Value::Boolean(Some(
            parse_bool(text).ok_or_else(|| Error::msg(context()))?,
        )),
        _ if target.is_integer() => {
            let v = i128::from_str(text)
                .or_else(|_| {
                    // Integral text written as a decimal, `42.0`
                    Decimal::from_str(text)
                        .map_err(Error::new)
                        .and_then(|d| {
                            if d.fract().is_zero() {
                                d.to_i128().ok_or_else(|| Error::msg(context()))
                            } else {
                                Err(Error::msg(context()))
                            }
                        })
                })
                .with_context(context)?;
            from_integer(v, target)?
        }
        Value::Float32(..) => Value::Float32(Some(f32::from_str(text).with_context(context)?)),
        Value::Float64(..) => Value::Float64(Some(f64::from_str(text).with_context(context)?)),
        Value::Decimal(..) => Value::Decimal(Some(
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .with_context(context)?,
        )),
        Value::Varchar(..) => Value::Varchar(Some(text.into())),
        Value::Blob(..) => Value::Blob(Some(
            hex::decode(text.trim_start_matches("0x"))
                .with_context(context)?
                .into(),
        )),
        Value::Date(..) => Value::Date(Some(
            parse_with(text, DATE_FORMATS, |t, f| Date::parse(t, f))
                .or_else(|| {
                    parse_with(text, TIMESTAMP_FORMATS, |t, f| PrimitiveDateTime::parse(t, f))
                        .map(|v| v.date())
                })
                .ok_or_else(|| Error::msg(context()))?,
        )),
        Value::Time(..) => Value::Time(Some(
            parse_with(text, TIME_FORMATS, |t, f| Time::parse(t, f))
                .ok_or_else(|| Error::msg(context()))?,
        )),
        Value::Timestamp(..) => Value::Timestamp(Some(
            parse_with(text, TIMESTAMP_FORMATS, |t, f| PrimitiveDateTime::parse(t, f))
                .or_else(|| {
                    parse_with(text, DATE_FORMATS, |t, f| Date::parse(t, f)).map(Date::midnight)
                })
                .ok_or_else(|| Error::msg(context()))?,
        )),
        Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(Some(
            OffsetDateTime::parse(text, &Rfc3339)
                .ok()
                .or_else(|| {
                    parse_with(text, TIMESTAMPTZ_FORMATS, |t, f| OffsetDateTime::parse(t, f))
                })
                .or_else(|| {
                    parse_with(text, TIMESTAMP_FORMATS, |t, f| PrimitiveDateTime::parse(t, f))
                        .map(PrimitiveDateTime::assume_utc)
                })
                .ok_or_else(|| Error::msg(context()))?,
        )),
        Value::Uuid(..) => Value::Uuid(Some(Uuid::parse_str(text).with_context(context)?)),
        Value::Enum(.., def) => {
            let discriminant = match def.discriminant_of(text) {
                Some(d) => d,
                None => i64::from_str(text)
                    .ok()
                    .filter(|d| def.contains(*d))
                    .ok_or_else(|| Error::msg(format!("`{}` is not a variant of {}", text, def.name)))?,
            };
            Value::Enum(Some(discriminant), *def)
        }
        _ => return Err(Error::msg(context())),
    };
    Ok(value)
}

fn parse_formatted(text: &str, format: &str, target: &Value) -> Result<Value> {
    if let Value::Decimal(..) = target {
        return parse_decimal_pattern(text, format).map(|v| Value::Decimal(Some(v)));
    }
    let items = format_description::parse(format)
        .with_context(|| format!("Invalid format description `{}`", format))?;
    let items = items.as_slice();
    let value = match target {
        Value::Date(..) => Value::Date(Some(Date::parse(text, items)?)),
        Value::Time(..) => Value::Time(Some(Time::parse(text, items)?)),
        Value::Timestamp(..) => Value::Timestamp(Some(PrimitiveDateTime::parse(text, items)?)),
        Value::TimestampWithTimezone(..) => {
            Value::TimestampWithTimezone(Some(OffsetDateTime::parse(text, items)?))
        }
        _ => return Err(unsupported(&Value::Varchar(Some(text.into())), target)),
    };
    Ok(value)
}

/// Parse `text` with a number pattern such as `#,##0.00` (grouping `,`, decimal `.`)
/// or `#.##0,00` (grouping `.`, decimal `,`). A pattern repeating a single separator
/// (`#,###,###`) has grouping only.
fn parse_decimal_pattern(text: &str, pattern: &str) -> Result<Decimal> {
    let separators: Vec<char> = pattern
        .chars()
        .filter(|c| !matches!(c, '#' | '0' | '-' | '+'))
        .collect();
    let (grouping, decimal) = match separators.last() {
        None => (None, None),
        Some(&last) => {
            let grouping = separators.iter().copied().find(|c| *c != last);
            if grouping.is_none() && separators.len() > 1 {
                (Some(last), None)
            } else {
                (grouping, Some(last))
            }
        }
    };
    let mut normalized = String::with_capacity(text.len());
    for c in text.chars() {
        if Some(c) == grouping {
            continue;
        } else if Some(c) == decimal {
            normalized.push('.');
        } else if c.is_ascii_digit() || c == '-' || c == '+' {
            normalized.push(c);
        } else {
            return Err(Error::msg(format!(
                "Unexpected character `{}` in `{}` for the pattern `{}`",
                c, text, pattern
            )));
        }
    }
    Decimal::from_str(&normalized)
        .with_context(|| format!("Cannot parse `{}` with the pattern `{}`", text, pattern))
}
