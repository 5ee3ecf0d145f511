#[cfg(test)]
mod tests {
    use ferry_core::{AsValue, EnumDef, Value, impl_enum_value};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::{date, datetime};

    #[derive(Default, Debug, Clone, Copy, PartialEq)]
    enum Tier {
        #[default]
        Bronze = 1,
        Silver = 2,
        Gold = 5,
    }
    impl_enum_value!(Tier { Bronze, Silver, Gold });

    #[test]
    fn value_none() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert!(Value::Int32(None).is_null());
        assert!(!Value::Int32(Some(0)).is_null());
        assert_eq!(Value::Int64(Some(3)).as_null(), Value::Int64(None));
    }

    #[test]
    fn value_prototypes() {
        assert_eq!(i32::as_empty_value(), Value::Int32(None));
        assert_eq!(Option::<String>::as_empty_value(), Value::Varchar(None));
        assert!(<Option<i64> as AsValue>::NULLABLE);
        assert!(!<i64 as AsValue>::NULLABLE);
        assert!(Value::Int16(Some(4)).same_type(&Value::Int16(None)));
        assert!(!Value::Int16(Some(4)).same_type(&Value::Int32(None)));
    }

    #[test]
    fn value_strict_round_trip() {
        let val: Value = 42i32.into();
        assert_eq!(val, Value::Int32(Some(42)));
        assert_eq!(i32::try_from_value(val).unwrap(), 42);
        assert!(i32::try_from_value(Value::Int64(Some(42))).is_err());
        assert_eq!(Option::<i32>::try_from_value(Value::Int32(None)).unwrap(), None);
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        let decimal = Decimal::from_str("12.50").unwrap();
        assert_eq!(
            Decimal::try_from_value(decimal.as_value()).unwrap(),
            decimal
        );
    }

    #[test]
    fn value_enum() {
        let def: &EnumDef = Tier::ENUM_DEF;
        assert_eq!(def.name, "Tier");
        assert_eq!(def.discriminant_of("gold"), Some(5));
        assert_eq!(def.name_of(2), Some("Silver"));
        assert!(!def.contains(3));
        assert_eq!(Tier::Gold.as_value(), Value::Enum(Some(5), Tier::ENUM_DEF));
        assert_eq!(
            Tier::try_from_value(Value::Enum(Some(2), Tier::ENUM_DEF)).unwrap(),
            Tier::Silver
        );
        assert!(Tier::try_from_value(Value::Enum(Some(3), Tier::ENUM_DEF)).is_err());
        assert_eq!(Tier::Silver.as_value().to_string(), "Silver");
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Int8(None).to_string(), "NULL");
        assert_eq!(Value::Varchar(Some("abc".into())).to_string(), "abc");
        assert_eq!(Value::Blob(Some(vec![0xca, 0xfe].into())).to_string(), "cafe");
        assert_eq!(Value::Date(Some(date!(2024 - 03 - 05))).to_string(), "2024-03-05");
        assert_eq!(
            Value::Timestamp(Some(datetime!(2024-03-05 14:30))).type_name(),
            "TIMESTAMP"
        );
    }

    #[test]
    fn value_integers() {
        assert!(Value::UInt16(Some(1)).is_integer());
        assert!(!Value::Float64(Some(1.0)).is_integer());
        assert_eq!(Value::UInt64(Some(u64::MAX)).as_i128(), Some(u64::MAX as i128));
        assert_eq!(Value::Varchar(Some("1".into())).as_i128(), None);
        assert!(Value::Time(None).is_temporal());
    }
}
