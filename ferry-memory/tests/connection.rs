#[cfg(test)]
mod tests {
    use ferry_core::{
        BulkCopyOptions, BulkOptions, Connection, Driver, Executor, Parameter, STAGED_ROWS_PARAMETER,
        SqlWriter, StagedRows, Statement, StatementKind, Transaction, Value, fetch_many, fetch_one,
    };
    use ferry_memory::{MemoryDriver, Table};
    use ferry_tests::{Item, init_logs, silent_logs};

    async fn driver() -> MemoryDriver {
        let driver = MemoryDriver::new();
        driver.create_database("shop");
        driver
            .create_table(
                "shop",
                "Items",
                Table::new(["Id", "Name"]).with_key("Id").with_rows([
                    vec![Value::Int32(Some(1)), Value::Varchar(Some("anchor".into()))],
                    vec![Value::Int32(Some(2)), Value::Varchar(Some("buoy".into()))],
                ]),
            )
            .await
            .unwrap();
        driver
    }

    fn staged(rows: &[(i32, &str)]) -> StagedRows {
        let mut staged = StagedRows::with_columns(vec!["Id".into(), "Name".into()]).unwrap();
        for (id, name) in rows {
            staged
                .push(
                    vec![Value::Int32(Some(*id)), Value::Varchar(Some(name.to_string()))].into(),
                )
                .unwrap();
        }
        staged
    }

    fn select(table: &str) -> Statement {
        let mut sql = String::new();
        MemoryDriver::new()
            .sql_writer()
            .write_select(&mut sql, table, &[]);
        Statement::new(
            sql,
            StatementKind::Select {
                table: table.into(),
            },
        )
    }

    #[tokio::test]
    async fn connect() {
        init_logs();
        let driver = driver().await;
        assert!(driver.connect("memory://shop").await.is_ok());
        assert!(driver.connect("memory://SHOP").await.is_ok());
        silent_logs! {
            assert!(driver.connect("memory://warehouse").await.is_err());
            assert!(driver.connect("postgres://shop").await.is_err());
            assert!(driver.connect("not a url").await.is_err());
        }
        assert_eq!(driver.connections(), 2);
    }

    #[tokio::test]
    async fn select_rows() {
        init_logs();
        let driver = driver().await;
        let mut connection = driver.connect("memory://shop").await.unwrap();
        let items: Vec<Item> = fetch_many(&mut connection, select("Items")).await.unwrap();
        assert_eq!(items, [Item::new(1, "anchor"), Item::new(2, "buoy")]);
        let item: Option<Item> = fetch_one(&mut connection, select("items")).await.unwrap();
        assert_eq!(item, Some(Item::new(1, "anchor")));
        assert!(
            fetch_one::<Item, _>(&mut connection, select("Missing"))
                .await
                .is_err()
        );
        assert_eq!(driver.statements(), 3);
    }

    #[tokio::test]
    async fn raw_sql_is_rejected() {
        init_logs();
        let driver = driver().await;
        let mut connection = driver.connect("memory://shop").await.unwrap();
        assert!(connection.execute("DELETE FROM Items".into()).await.is_err());
        assert_eq!(driver.table("shop", "Items").await.unwrap().rows.len(), 2);
    }

    #[tokio::test]
    async fn bulk_copy_is_atomic() {
        init_logs();
        let driver = driver().await;
        let mut connection = driver.connect("memory://shop").await.unwrap();
        let options = BulkCopyOptions::new("Items", &BulkOptions::default());
        let affected = connection
            .bulk_copy(&staged(&[(3, "chain"), (4, "deck")]), &options)
            .await
            .unwrap();
        assert_eq!(affected.rows_affected, 2);
        // The duplicate key fails the whole copy, row 5 is not written either
        assert!(
            connection
                .bulk_copy(&staged(&[(5, "eel"), (1, "again")]), &options)
                .await
                .is_err()
        );
        let table = driver.table("shop", "Items").await.unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.get(&Value::Int64(Some(5)), "Name"), None);
        assert_eq!(driver.bulk_copies(), 2);
    }

    #[tokio::test]
    async fn default_bulk_copy_statement() {
        init_logs();
        let driver = driver().await;
        let mut connection = driver.connect("memory://shop").await.unwrap();
        let rows = staged(&[(7, "gull")]);
        let mut sql = String::new();
        driver
            .sql_writer()
            .write_insert(&mut sql, "Items", &rows, true);
        let statement = Statement::new(
            sql,
            StatementKind::Insert {
                table: "Items".into(),
            },
        )
        .with_param(Parameter::Rows {
            name: STAGED_ROWS_PARAMETER.into(),
            type_name: None,
            rows,
        });
        let affected = connection.execute(statement).await.unwrap();
        assert_eq!(affected.rows_affected, 1);
        assert_eq!(
            driver
                .table("shop", "Items")
                .await
                .unwrap()
                .get(&Value::Int32(Some(7)), "name"),
            Some(&Value::Varchar(Some("gull".into())))
        );
    }

    #[tokio::test]
    async fn transaction_commit() {
        init_logs();
        let driver = driver().await;
        let mut connection = driver.connect("memory://shop").await.unwrap();
        let options = BulkCopyOptions::new("Items", &BulkOptions::default());
        let mut transaction = connection.begin().await.unwrap();
        transaction
            .bulk_copy(&staged(&[(3, "chain")]), &options)
            .await
            .unwrap();
        let uncommitted: Vec<Item> = fetch_many(&mut transaction, select("Items")).await.unwrap();
        assert_eq!(uncommitted.len(), 3);
        assert_eq!(driver.table("shop", "Items").await.unwrap().rows.len(), 2);
        transaction.commit().await.unwrap();
        assert_eq!(driver.table("shop", "Items").await.unwrap().rows.len(), 3);
        assert_eq!(driver.commits(), 1);
    }

    #[tokio::test]
    async fn transaction_rollback() {
        init_logs();
        let driver = driver().await;
        let mut connection = driver.connect("memory://shop").await.unwrap();
        let options = BulkCopyOptions::new("Items", &BulkOptions::default());
        let mut transaction = connection.begin().await.unwrap();
        transaction
            .bulk_copy(&staged(&[(3, "chain")]), &options)
            .await
            .unwrap();
        transaction.rollback().await.unwrap();
        assert_eq!(driver.table("shop", "Items").await.unwrap().rows.len(), 2);
        assert_eq!(driver.rollbacks(), 1);
        {
            let mut transaction = connection.begin().await.unwrap();
            transaction
                .bulk_copy(&staged(&[(4, "deck")]), &options)
                .await
                .unwrap();
            silent_logs! {
                drop(transaction);
            }
        }
        assert_eq!(driver.table("shop", "Items").await.unwrap().rows.len(), 2);
        // The connection is usable again once the transaction is gone
        assert!(connection.begin().await.unwrap().commit().await.is_ok());
    }

    #[tokio::test]
    async fn failing_commit() {
        init_logs();
        let driver = driver().await;
        driver.fail_commits(true);
        let mut connection = driver.connect("memory://shop").await.unwrap();
        let options = BulkCopyOptions::new("Items", &BulkOptions::default());
        let mut transaction = connection.begin().await.unwrap();
        transaction
            .bulk_copy(&staged(&[(3, "chain")]), &options)
            .await
            .unwrap();
        assert!(transaction.commit().await.is_err());
        assert_eq!(driver.table("shop", "Items").await.unwrap().rows.len(), 2);
        assert_eq!(driver.commits(), 0);
    }

    #[tokio::test]
    async fn identity_columns() {
        init_logs();
        let driver = driver().await;
        driver
            .create_table(
                "shop",
                "Orders",
                Table::new(["Id", "Name"]).with_key("Id").with_identity(),
            )
            .await
            .unwrap();
        let mut connection = driver.connect("memory://shop").await.unwrap();
        let generated = BulkCopyOptions::new("Orders", &BulkOptions::default());
        connection
            .bulk_copy(&staged(&[(10, "a"), (20, "b")]), &generated)
            .await
            .unwrap();
        let kept = BulkCopyOptions::new("Orders", &BulkOptions::new().with_keep_identity(true));
        connection
            .bulk_copy(&staged(&[(10, "c")]), &kept)
            .await
            .unwrap();
        connection
            .bulk_copy(&staged(&[(0, "d")]), &generated)
            .await
            .unwrap();
        let table = driver.table("shop", "Orders").await.unwrap();
        let ids: Vec<_> = table.rows.iter().map(|row| row[0].clone()).collect();
        assert_eq!(
            ids,
            [
                Value::Int64(Some(1)),
                Value::Int64(Some(2)),
                Value::Int32(Some(10)),
                Value::Int64(Some(11)),
            ]
        );
    }
}
