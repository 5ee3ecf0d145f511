#[cfg(test)]
mod tests {
    use ferry_core::{Coerced, Conversion, MemberDescriptor, Value, coerce, convert, convert_custom};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::{date, datetime, time};

    fn member(name: &str, value: Value) -> MemberDescriptor {
        MemberDescriptor::new(name, value, false)
    }

    fn decimal(v: &str) -> Value {
        Value::Decimal(Some(Decimal::from_str(v).unwrap()))
    }

    #[test]
    fn same_type_passes_through() {
        let m = member("Id", Value::Int32(None));
        assert_eq!(
            coerce(Value::Int32(Some(7)), &m),
            Coerced::Value(Value::Int32(Some(7)))
        );
    }

    #[test]
    fn null_takes_default_or_zero() {
        let mut m = member("Region", Value::Varchar(None));
        assert_eq!(coerce(Value::Null, &m), Coerced::Zero);
        assert_eq!(coerce(Value::Varchar(None), &m).into_value(), None);
        m.default = Some("unassigned".into());
        let coerced = coerce(Value::Null, &m);
        assert!(coerced.is_fallback());
        assert_eq!(
            coerced,
            Coerced::Default(Value::Varchar(Some("unassigned".into())))
        );
    }

    #[test]
    fn default_is_converted_to_the_member_type() {
        let mut m = member("Quantity", Value::Int16(None));
        m.default = Some(Value::Int64(Some(10)));
        assert_eq!(
            coerce(Value::Null, &m),
            Coerced::Default(Value::Int16(Some(10)))
        );
        m.default = Some("ten".into());
        assert_eq!(coerce(Value::Null, &m), Coerced::Zero);
    }

    #[test]
    fn integers_are_range_checked() {
        let mut m = member("Small", Value::Int8(None));
        assert_eq!(
            coerce(Value::Int64(Some(100)), &m),
            Coerced::Value(Value::Int8(Some(100)))
        );
        assert_eq!(coerce(Value::Int64(Some(300)), &m), Coerced::Zero);
        assert_eq!(coerce(Value::Int32(Some(-1)), &member("U", Value::UInt32(None))), Coerced::Zero);
        m.default = Some(Value::Int8(Some(7)));
        assert_eq!(
            coerce(Value::Int64(Some(300)), &m),
            Coerced::Default(Value::Int8(Some(7)))
        );
    }

    #[test]
    fn text_is_parsed() {
        assert_eq!(
            convert(Value::Varchar(Some(" 42 ".into())), &Value::Int64(None)).unwrap(),
            Value::Int64(Some(42))
        );
        assert_eq!(
            convert(Value::Varchar(Some("42.0".into())), &Value::Int32(None)).unwrap(),
            Value::Int32(Some(42))
        );
        assert!(convert(Value::Varchar(Some("42.5".into())), &Value::Int32(None)).is_err());
        assert_eq!(
            convert(Value::Varchar(Some("yes".into())), &Value::Boolean(None)).unwrap(),
            Value::Boolean(Some(true))
        );
        assert_eq!(
            convert(Value::Varchar(Some("1234.5".into())), &Value::Decimal(None)).unwrap(),
            decimal("1234.5")
        );
        assert_eq!(
            convert(Value::Varchar(Some("2024-03-05".into())), &Value::Date(None)).unwrap(),
            Value::Date(Some(date!(2024 - 03 - 05)))
        );
        assert_eq!(
            convert(Value::Varchar(Some("14:30".into())), &Value::Time(None)).unwrap(),
            Value::Time(Some(time!(14:30)))
        );
        assert_eq!(
            convert(
                Value::Varchar(Some("2024-03-05 14:30:15".into())),
                &Value::Timestamp(None)
            )
            .unwrap(),
            Value::Timestamp(Some(datetime!(2024-03-05 14:30:15)))
        );
        assert_eq!(
            convert(
                Value::Varchar(Some("2024-03-05T14:30:15+02:00".into())),
                &Value::TimestampWithTimezone(None)
            )
            .unwrap(),
            Value::TimestampWithTimezone(Some(datetime!(2024-03-05 12:30:15 UTC)))
        );
        assert_eq!(
            convert(Value::Varchar(Some("0xCAFE".into())), &Value::Blob(None)).unwrap(),
            Value::Blob(Some(vec![0xca, 0xfe].into()))
        );
    }

    #[test]
    fn values_become_text() {
        assert_eq!(
            convert(Value::Int32(Some(5)), &Value::Varchar(None)).unwrap(),
            Value::Varchar(Some("5".into()))
        );
        assert_eq!(
            convert(Value::Boolean(Some(true)), &Value::Varchar(None)).unwrap(),
            Value::Varchar(Some("true".into()))
        );
        assert_eq!(
            convert(decimal("1.50"), &Value::Varchar(None)).unwrap(),
            Value::Varchar(Some("1.50".into()))
        );
    }

    #[test]
    fn numbers_cross_convert() {
        assert_eq!(
            convert(Value::Float64(Some(3.0)), &Value::Int32(None)).unwrap(),
            Value::Int32(Some(3))
        );
        assert!(convert(Value::Float64(Some(3.5)), &Value::Int32(None)).is_err());
        assert_eq!(
            convert(decimal("12"), &Value::Int64(None)).unwrap(),
            Value::Int64(Some(12))
        );
        assert_eq!(
            convert(Value::Int32(Some(12)), &Value::Decimal(None)).unwrap(),
            decimal("12")
        );
        assert_eq!(
            convert(Value::Int8(Some(0)), &Value::Boolean(None)).unwrap(),
            Value::Boolean(Some(false))
        );
        assert_eq!(
            convert(Value::Timestamp(Some(datetime!(2024-03-05 14:30))), &Value::Date(None))
                .unwrap(),
            Value::Date(Some(date!(2024 - 03 - 05)))
        );
    }

    #[test]
    fn null_converts_to_the_null_of_the_target() {
        assert_eq!(
            convert(Value::Null, &Value::Int32(None)).unwrap(),
            Value::Int32(None)
        );
        assert_eq!(
            convert(Value::Varchar(None), &Value::Date(None)).unwrap(),
            Value::Date(None)
        );
    }

    #[test]
    fn decimal_patterns() {
        let conversion = |format: &str| Conversion {
            target: Value::Decimal(None),
            format: Some(format.into()),
        };
        assert_eq!(
            convert_custom(&Value::Varchar(Some("1,234.50".into())), &conversion("#,##0.00"))
                .unwrap(),
            decimal("1234.50")
        );
        assert_eq!(
            convert_custom(&Value::Varchar(Some("1.234,50".into())), &conversion("#.##0,00"))
                .unwrap(),
            decimal("1234.50")
        );
        assert_eq!(
            convert_custom(&Value::Varchar(Some("1,234,567".into())), &conversion("#,###,###"))
                .unwrap(),
            decimal("1234567")
        );
        // Text not following the pattern is parsed without it
        assert_eq!(
            convert_custom(&Value::Varchar(Some("1e3".into())), &conversion("#.##0,00"))
                .unwrap(),
            decimal("1000")
        );
    }

    #[test]
    fn temporal_formats() {
        let conversion = Conversion {
            target: Value::Date(None),
            format: Some("[day]/[month]/[year]".into()),
        };
        assert_eq!(
            convert_custom(&Value::Varchar(Some("05/03/2024".into())), &conversion).unwrap(),
            Value::Date(Some(date!(2024 - 03 - 05)))
        );
        assert_eq!(
            convert_custom(&Value::Varchar(Some("2024-03-05".into())), &conversion).unwrap(),
            Value::Date(Some(date!(2024 - 03 - 05)))
        );
        assert!(
            convert_custom(&Value::Varchar(Some("March the 5th".into())), &conversion).is_err()
        );
    }

    #[test]
    fn conversion_then_member_type() {
        let mut m = member("Total", Value::Float64(None));
        m.conversion = Some(Conversion {
            target: Value::Decimal(None),
            format: Some("#,##0.00".into()),
        });
        assert_eq!(
            coerce(Value::Varchar(Some("2,000.25".into())), &m),
            Coerced::Value(Value::Float64(Some(2000.25)))
        );
        assert_eq!(coerce(Value::Varchar(Some("n/a".into())), &m), Coerced::Zero);
    }

    #[test]
    fn enums_from_text_and_integers() {
        use ferry_core::EnumDef;
        static STATUS: EnumDef = EnumDef {
            name: "Status",
            variants: &[("Active", 1), ("Suspended", 2), ("Closed", 3)],
        };
        let m = member("Status", Value::Enum(None, &STATUS));
        assert_eq!(
            coerce(Value::Varchar(Some("suspended".into())), &m),
            Coerced::Value(Value::Enum(Some(2), &STATUS))
        );
        assert_eq!(
            coerce(Value::Varchar(Some("3".into())), &m),
            Coerced::Value(Value::Enum(Some(3), &STATUS))
        );
        assert_eq!(
            coerce(Value::Int16(Some(1)), &m),
            Coerced::Value(Value::Enum(Some(1), &STATUS))
        );
        assert_eq!(coerce(Value::Int16(Some(9)), &m), Coerced::Zero);
        assert_eq!(coerce(Value::Varchar(Some("Deleted".into())), &m), Coerced::Zero);
    }
}
