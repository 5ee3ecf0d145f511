#[cfg(test)]
mod tests {
    use ferry::{TabularResult, Value, map_many, map_one};
    use ferry_tests::{CUSTOMER_COLUMNS, Customer, Status, customer_row, init_logs};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::datetime;

    fn customers() -> TabularResult {
        let mut result = TabularResult::new(CUSTOMER_COLUMNS);
        result
            .push(customer_row(1, "Ada", "1,234.50", "suspended", "05/03/2024 14:30"))
            .unwrap()
            .push(customer_row(2, "Grace", "not a number", "3", "2024-01-31 08:00"))
            .unwrap()
            .push(customer_row(3, "Linus", "12", "Unknown", "whenever"))
            .unwrap();
        result
    }

    #[test]
    fn map_customers() {
        init_logs();
        let customers: Vec<Customer> = map_many(&customers());
        assert_eq!(customers.len(), 3);
        assert_eq!(
            customers[0],
            Customer {
                id: 1,
                name: "Ada".into(),
                email: None,
                balance: Decimal::from_str("1234.50").unwrap(),
                status: Status::Suspended,
                created_at: Some(datetime!(2024-03-05 14:30)),
                region: "unassigned".into(),
                notes: Vec::new(),
            }
        );
        // Unconvertible cells keep the zero value of the member
        assert_eq!(customers[1].balance, Decimal::ZERO);
        assert_eq!(customers[1].status, Status::Closed);
        assert_eq!(customers[1].created_at, Some(datetime!(2024-01-31 08:00)));
        assert_eq!(customers[2].balance, Decimal::from(12));
        assert_eq!(customers[2].status, Status::Active);
        assert_eq!(customers[2].created_at, None);
    }

    #[test]
    fn map_first_customer() {
        init_logs();
        let customer: Option<Customer> = map_one(&customers());
        assert_eq!(customer.map(|c| c.name), Some("Ada".to_string()));
        let empty = TabularResult::new(CUSTOMER_COLUMNS);
        assert_eq!(map_one::<Customer>(&empty), None);
        assert!(map_many::<Customer>(&empty).is_empty());
    }

    #[test]
    fn explicit_column_wins() {
        init_logs();
        let mut result = TabularResult::new(["Name", "customer_name", "sales_region"]);
        result
            .push(vec![
                Value::Varchar(Some("wrong".into())),
                Value::Varchar(Some("right".into())),
                Value::Varchar(None),
            ])
            .unwrap();
        let customer: Customer = map_one(&result).unwrap();
        assert_eq!(customer.name, "right");
        // NULL cells take the default as a missing column would
        assert_eq!(customer.region, "unassigned");
        assert_eq!(customer.id, 0);
    }

    #[test]
    fn mapping_is_stable_across_results() {
        init_logs();
        let first: Vec<Customer> = map_many(&customers());
        let second: Vec<Customer> = map_many(&customers());
        assert_eq!(first, second);
    }
}
