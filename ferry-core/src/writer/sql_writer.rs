use crate::{StagedRows, Value, separated_by, split_table_name, writer::Context};
use std::fmt::Write;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use super::Fragment;

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        if $value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        } else {
            $this.write_value_non_finite($context, $out, $value as f64);
        }
    }};
}

/// Alias of the target table inside generated statements.
pub const TARGET_ALIAS: &str = "t";
/// Alias of the staged rows (or sync source) inside generated statements.
pub const SOURCE_ALIAS: &str = "s";

/// Dialect printer turning bulk strategies into SQL text.
///
/// Every method has a default implementation producing ANSI quoted, T-SQL flavoured
/// statements. Drivers override the pieces their database spells differently.
/// Identifiers are expected to be validated already, they are always quoted.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Possibly schema qualified table name, every part quoted.
    fn write_table_name(&self, context: &mut Context, out: &mut String, value: &str) {
        separated_by(
            out,
            split_table_name(value),
            |out, v| self.write_identifier_quoted(context, out, v),
            ".",
        );
    }

    /// `alias."column"`
    fn write_column_qualified(
        &self,
        context: &mut Context,
        out: &mut String,
        alias: &str,
        column: &str,
    ) {
        out.push_str(alias);
        out.push('.');
        self.write_identifier_quoted(context, out, column);
    }

    /// Name of the staged rows parameter as it appears in the statement.
    fn write_rows_parameter(&self, _context: &mut Context, out: &mut String, name: &str) {
        out.push_str(name);
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Enum(Some(v), ..) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, context, out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Decimal(Some(v)) => drop(write!(out, "{}", v)),
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Date(Some(v)) => self.write_value_date(context, out, v, false),
            Value::Time(Some(v)) => self.write_value_time(context, out, v, false),
            Value::Timestamp(Some(v)) => self.write_value_timestamp(context, out, v),
            Value::TimestampWithTimezone(Some(v)) => {
                self.write_value_timestamptz(context, out, v)
            }
            Value::Uuid(Some(v)) => drop(write!(out, "'{}'", v)),
            _ => log::error!("Cannot write {:?}", value),
        };
    }

    /// Render NULL, or DEFAULT for inserted rows that do not keep nulls.
    fn write_value_none(&self, context: &mut Context, out: &mut String) {
        if context.fragment == Fragment::SqlInsertIntoValues && !context.keep_nulls {
            out.push_str("DEFAULT");
        } else {
            out.push_str("NULL");
        }
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push_str(["0", "1"][value as usize]);
    }

    /// Render +/- infinity and NaN through a cast.
    fn write_value_non_finite(&self, _context: &mut Context, out: &mut String, value: f64) {
        let text = if value.is_nan() {
            "NaN"
        } else if value.is_sign_negative() {
            "-Infinity"
        } else {
            "Infinity"
        };
        let _ = write!(out, "CAST('{}' AS FLOAT)", text);
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    /// Render a blob literal as hexadecimal.
    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("0x");
        out.push_str(&hex::encode_upper(value));
    }

    /// Render a DATE literal (optionally as part of TIMESTAMP composition).
    fn write_value_date(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &Date,
        timestamp: bool,
    ) {
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:04}-{:02}-{:02}{b}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    /// Render a TIME literal (optionally as part of TIMESTAMP composition).
    fn write_value_time(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &Time,
        timestamp: bool,
    ) {
        let mut subsecond = value.nanosecond();
        let mut width = 9;
        while width > 1 && subsecond % 10 == 0 {
            subsecond /= 10;
            width -= 1;
        }
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:02}:{:02}:{:02}.{:0width$}{b}",
            value.hour(),
            value.minute(),
            value.second(),
            subsecond
        );
    }

    fn write_value_timestamp(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &PrimitiveDateTime,
    ) {
        out.push('\'');
        self.write_value_date(context, out, &value.date(), true);
        out.push('T');
        self.write_value_time(context, out, &value.time(), true);
        out.push('\'');
    }

    /// Render a TIMESTAMPTZ literal, normalized to UTC.
    fn write_value_timestamptz(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &OffsetDateTime,
    ) {
        let date_time = value.to_offset(UtcOffset::UTC);
        out.push('\'');
        self.write_value_date(context, out, &date_time.date(), true);
        out.push('T');
        self.write_value_time(context, out, &date_time.time(), true);
        out.push_str("Z'");
    }

    /// `"a" = s."a", "b" = s."b"`
    fn write_assignments(&self, context: &mut Context, out: &mut String, columns: &[String]) {
        separated_by(
            out,
            columns,
            |out, v| {
                self.write_identifier_quoted(context, out, v);
                out.push_str(" = ");
                self.write_column_qualified(context, out, SOURCE_ALIAS, v);
            },
            ", ",
        );
    }

    /// `t."key" = s."key"`
    fn write_key_condition(&self, context: &mut Context, out: &mut String, key: &str) {
        self.write_column_qualified(context, out, TARGET_ALIAS, key);
        out.push_str(" = ");
        self.write_column_qualified(context, out, SOURCE_ALIAS, key);
    }

    /// Emit SELECT of the listed columns (every column when empty) of a table.
    fn write_select(&self, out: &mut String, table: &str, columns: &[String]) {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlSelect);
        out.push_str("SELECT ");
        if columns.is_empty() {
            out.push('*');
        } else {
            separated_by(
                out,
                columns,
                |out, v| self.write_identifier_quoted(&mut context, out, v),
                ", ",
            );
        }
        out.push_str("\nFROM ");
        self.write_table_name(&mut context, out, table);
        out.push(';');
    }

    /// Emit a multi-row INSERT of the staged rows, destination columns in order.
    fn write_insert(&self, out: &mut String, table: &str, rows: &StagedRows, keep_nulls: bool) {
        if rows.is_empty() {
            return;
        }
        out.reserve(128 + rows.len() * rows.destinations().len() * 16);
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlInsertInto).with_keep_nulls(keep_nulls);
        out.push_str("INSERT INTO ");
        self.write_table_name(&mut context, out, table);
        out.push_str(" (");
        separated_by(
            out,
            rows.destinations(),
            |out, v| self.write_identifier_quoted(&mut context, out, v),
            ", ",
        );
        out.push_str(") VALUES\n");
        context.switch_fragment(Fragment::SqlInsertIntoValues);
        separated_by(
            out,
            rows.rows(),
            |out, row| {
                out.push('(');
                separated_by(
                    out,
                    row.iter(),
                    |out, v| self.write_value(&mut context, out, v),
                    ", ",
                );
                out.push(')');
            },
            ",\n",
        );
        out.push(';');
    }

    /// Set-based UPDATE joining the target table to the staged rows on `key`.
    fn write_update(
        &self,
        out: &mut String,
        table: &str,
        key: &str,
        columns: &[String],
        rows_parameter: &str,
    ) {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlUpdate);
        let _ = write!(out, "UPDATE {}\nSET ", TARGET_ALIAS);
        self.write_assignments(&mut context, out, columns);
        out.push_str("\nFROM ");
        self.write_table_name(&mut context, out, table);
        let _ = write!(out, " AS {}\nINNER JOIN ", TARGET_ALIAS);
        self.write_rows_parameter(&mut context, out, rows_parameter);
        let _ = write!(out, " AS {} ON ", SOURCE_ALIAS);
        self.write_key_condition(&mut context, out, key);
        out.push(';');
    }

    /// DELETE by an explicit list of key placeholders, one per key value.
    fn write_delete(&self, out: &mut String, table: &str, key: &str, placeholders: &[String]) {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlDeleteFromWhere);
        out.push_str("DELETE FROM ");
        self.write_table_name(&mut context, out, table);
        out.push_str("\nWHERE ");
        self.write_identifier_quoted(&mut context, out, key);
        out.push_str(" IN (");
        separated_by(out, placeholders, |out, v| out.push_str(v), ", ");
        out.push_str(");");
    }

    /// MERGE of the staged rows: matched rows get `columns`, the others are inserted
    /// with the key and `columns`. Without columns only inserts happen.
    fn write_merge(
        &self,
        out: &mut String,
        table: &str,
        key: &str,
        columns: &[String],
        rows_parameter: &str,
    ) {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlMerge);
        let update_columns: Vec<String> = columns
            .iter()
            .filter(|c| !c.eq_ignore_ascii_case(key))
            .cloned()
            .collect();
        let mut insert_columns = vec![key.to_string()];
        insert_columns.extend(update_columns.iter().cloned());
        out.push_str("MERGE INTO ");
        self.write_table_name(&mut context, out, table);
        let _ = write!(out, " AS {}\nUSING ", TARGET_ALIAS);
        self.write_rows_parameter(&mut context, out, rows_parameter);
        let _ = write!(out, " AS {}\nON ", SOURCE_ALIAS);
        self.write_key_condition(&mut context, out, key);
        if !update_columns.is_empty() {
            out.push_str("\nWHEN MATCHED THEN UPDATE SET ");
            self.write_assignments(&mut context, out, &update_columns);
        }
        out.push_str("\nWHEN NOT MATCHED THEN ");
        self.write_merge_insert(&mut context, out, &insert_columns);
        out.push(';');
    }

    /// `INSERT ("a", "b") VALUES (s."a", s."b")` branch of a MERGE.
    fn write_merge_insert(&self, context: &mut Context, out: &mut String, columns: &[String]) {
        out.push_str("INSERT (");
        separated_by(
            out,
            columns,
            |out, v| self.write_identifier_quoted(context, out, v),
            ", ",
        );
        out.push_str(") VALUES (");
        separated_by(
            out,
            columns,
            |out, v| self.write_column_qualified(context, out, SOURCE_ALIAS, v),
            ", ",
        );
        out.push(')');
    }

    /// INSERT of the staged rows whose key is not in the table yet.
    fn write_insert_missing(
        &self,
        out: &mut String,
        table: &str,
        key: &str,
        columns: &[String],
        rows_parameter: &str,
    ) {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlInsertInto);
        out.push_str("INSERT INTO ");
        self.write_table_name(&mut context, out, table);
        out.push_str(" (");
        separated_by(
            out,
            columns,
            |out, v| self.write_identifier_quoted(&mut context, out, v),
            ", ",
        );
        out.push_str(")\nSELECT ");
        separated_by(
            out,
            columns,
            |out, v| self.write_column_qualified(&mut context, out, SOURCE_ALIAS, v),
            ", ",
        );
        out.push_str("\nFROM ");
        self.write_rows_parameter(&mut context, out, rows_parameter);
        let _ = write!(out, " AS {}\nWHERE NOT EXISTS (SELECT 1 FROM ", SOURCE_ALIAS);
        self.write_table_name(&mut context, out, table);
        let _ = write!(out, " AS {} WHERE ", TARGET_ALIAS);
        self.write_key_condition(&mut context, out, key);
        out.push_str(");");
    }

    /// MERGE from `source` into `target` on `key`: matched rows are updated, missing
    /// rows inserted and, with `delete_missing`, target rows absent from the source
    /// deleted.
    fn write_sync(
        &self,
        out: &mut String,
        source: &str,
        target: &str,
        key: &str,
        columns: &[String],
        delete_missing: bool,
    ) {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlMerge);
        let update_columns: Vec<String> = columns
            .iter()
            .filter(|c| !c.eq_ignore_ascii_case(key))
            .cloned()
            .collect();
        let mut insert_columns = vec![key.to_string()];
        insert_columns.extend(update_columns.iter().cloned());
        out.push_str("MERGE INTO ");
        self.write_table_name(&mut context, out, target);
        let _ = write!(out, " AS {}\nUSING ", TARGET_ALIAS);
        self.write_table_name(&mut context, out, source);
        let _ = write!(out, " AS {}\nON ", SOURCE_ALIAS);
        self.write_key_condition(&mut context, out, key);
        if !update_columns.is_empty() {
            out.push_str("\nWHEN MATCHED THEN UPDATE SET ");
            self.write_assignments(&mut context, out, &update_columns);
        }
        out.push_str("\nWHEN NOT MATCHED BY TARGET THEN ");
        self.write_merge_insert(&mut context, out, &insert_columns);
        if delete_missing {
            out.push_str("\nWHEN NOT MATCHED BY SOURCE THEN DELETE");
        }
        out.push(';');
    }
}

/// Fallback generic SQL writer.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
