use crate::{Error, Result};

/// Longest identifier accepted, in bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Reject identifiers that cannot be safely quoted: empty, containing a NUL byte or
/// longer than [`MAX_IDENTIFIER_LENGTH`] bytes.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::msg("Identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(Error::msg(format!(
            "Identifier {:?} contains a NUL byte",
            name
        )));
    }
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(Error::msg(format!(
            "Identifier exceeds the maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }
    Ok(())
}

/// Validate a possibly schema qualified table name (`schema.table`).
pub fn validate_table_name(name: &str) -> Result<()> {
    let parts = split_table_name(name);
    if parts.len() > 3 {
        return Err(Error::msg(format!(
            "Table name {:?} has more than three parts",
            name
        )));
    }
    for part in parts {
        validate_identifier(part)?;
    }
    Ok(())
}

/// Parts of a qualified table name, `dbo.Customers` -> `["dbo", "Customers"]`.
pub fn split_table_name(name: &str) -> Vec<&str> {
    name.split('.').collect()
}
