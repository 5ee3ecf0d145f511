#[cfg(test)]
mod tests {
    use ferry::{
        BulkClient, BulkOptions, Driver, SqlWriter, Statement, StatementKind, fetch_many,
    };
    use ferry_memory::{MemoryDriver, Table};
    use ferry_tests::{Customer, Status, init_logs};
    use rust_decimal::Decimal;
    use time::macros::datetime;

    fn customer(id: i32, name: &str, status: Status) -> Customer {
        Customer {
            id,
            name: name.into(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            balance: Decimal::new(1050 * id as i64, 2),
            status,
            created_at: Some(datetime!(2024-06-01 09:15)),
            region: "emea".into(),
            notes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn write_then_read_customers() {
        init_logs();
        let driver = MemoryDriver::new();
        driver.create_database("crm");
        driver
            .create_table(
                "crm",
                "dbo.Customers",
                Table::new([
                    "Id",
                    "customer_name",
                    "Email",
                    "Balance",
                    "Status",
                    "CreatedAt",
                    "sales_region",
                ])
                .with_key("Id"),
            )
            .await
            .unwrap();
        let client = BulkClient::new(driver.clone(), "memory://crm")
            .with_options(BulkOptions::new().with_batch_size(2));
        let written = vec![
            customer(1, "Ada", Status::Active),
            customer(2, "Grace", Status::Suspended),
            customer(3, "Linus", Status::Closed),
        ];
        let result = client.insert("dbo.Customers", written.as_slice()).await;
        assert!(result.success, "{}", result.message);
        assert_eq!(result.rows_affected, 3);

        let mut renamed = written[1].clone();
        renamed.name = "Grace H.".into();
        let result = client
            .upsert("dbo.Customers", "Id", vec![renamed.clone()])
            .await;
        assert!(result.success, "{}", result.message);
        assert_eq!(result.rows_affected, 1);

        let mut sql = String::new();
        driver
            .sql_writer()
            .write_select(&mut sql, "dbo.Customers", &[]);
        let mut connection = driver.connect("memory://crm").await.unwrap();
        let read: Vec<Customer> = fetch_many(
            &mut connection,
            Statement::new(
                sql,
                StatementKind::Select {
                    table: "dbo.Customers".into(),
                },
            ),
        )
        .await
        .unwrap();
        let expected: Vec<Customer> = [written[0].clone(), renamed, written[2].clone()]
            .into_iter()
            .map(|c| Customer {
                notes: Vec::new(),
                ..c
            })
            .collect();
        assert_eq!(read, expected);
    }
}
