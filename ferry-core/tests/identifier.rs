#[cfg(test)]
mod tests {
    use ferry_core::{
        MAX_IDENTIFIER_LENGTH, split_table_name, validate_identifier, validate_table_name,
    };

    #[test]
    fn identifiers() {
        assert!(validate_identifier("Customers").is_ok());
        assert!(validate_identifier("weird \"name\"; DROP TABLE x").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("a\0b").is_err());
        assert!(validate_identifier(&"x".repeat(MAX_IDENTIFIER_LENGTH)).is_ok());
        let error = validate_identifier(&"x".repeat(MAX_IDENTIFIER_LENGTH + 1)).unwrap_err();
        assert!(error.to_string().contains("maximum length of 128"));
        // Multi-byte characters count in bytes
        assert!(validate_identifier(&"é".repeat(65)).is_err());
    }

    #[test]
    fn table_names() {
        assert_eq!(split_table_name("dbo.Customers"), ["dbo", "Customers"]);
        assert!(validate_table_name("db.dbo.Customers").is_ok());
        assert!(validate_table_name("a.b.c.d").is_err());
        assert!(validate_table_name("dbo.").is_err());
        assert!(validate_table_name("").is_err());
    }
}
