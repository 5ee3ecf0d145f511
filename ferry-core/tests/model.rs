#[cfg(test)]
mod tests {
    use ferry_core::{
        AsValue, BulkOptions, Model, RowSource, Schema, TabularResult, Value, describe, map_many,
        map_one,
    };
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };

    static REGISTRATIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Order {
        id: i64,
        customer_id: i32,
        total: f64,
        note: Option<String>,
        cache: Vec<u8>,
    }

    impl Model for Order {
        fn schema(schema: Schema<Self>) -> Schema<Self> {
            REGISTRATIONS.fetch_add(1, Ordering::Relaxed);
            schema
                .field("Id", |m| &m.id, |m| &mut m.id)
                .column("order_id")
                .field("CustomerId", |m| &m.customer_id, |m| &mut m.customer_id)
                .field("Total", |m| &m.total, |m| &mut m.total)
                .default_value(0.5f64)
                .field("Note", |m| &m.note, |m| &mut m.note)
                .default_value("none")
                .field("Cache", |m| &m.cache, |m| &mut m.cache)
                .ignore()
        }
    }

    #[test]
    fn descriptor_is_built_once() {
        let descriptors: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(describe::<Order>)).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(REGISTRATIONS.load(Ordering::Relaxed), 1);
        for descriptor in &descriptors {
            assert!(Arc::ptr_eq(descriptor, &descriptors[0]));
        }
        assert!(Arc::ptr_eq(&Order::descriptor(), &descriptors[0]));
    }

    #[test]
    fn descriptor_members() {
        let descriptor = Order::descriptor();
        let names: Vec<_> = descriptor.members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Id", "CustomerId", "Total", "Note", "Cache"]);
        assert_eq!(descriptor.mapped_members().count(), 4);
        let id = descriptor.member("id").unwrap();
        assert_eq!(id.column_name(), "order_id");
        assert_eq!(id.value, Value::Int64(None));
        assert!(!id.nullable);
        let note = descriptor.member("Note").unwrap();
        assert!(note.nullable);
        assert_eq!(note.default, Some(Value::Varchar(Some("none".into()))));
        assert!(descriptor.member("Cache").unwrap().ignore);
    }

    #[test]
    fn accessors() {
        let descriptor = Order::descriptor();
        let mut order = Order::default();
        descriptor.set(&mut order, 0, 9i64.as_value()).unwrap();
        descriptor
            .set(&mut order, 3, Value::Varchar(Some("rush".into())))
            .unwrap();
        assert!(descriptor.set(&mut order, 1, Value::Int64(Some(1))).is_err());
        assert_eq!(order.id, 9);
        assert_eq!(order.note.as_deref(), Some("rush"));
        assert_eq!(descriptor.get(&order, 0), Value::Int64(Some(9)));
        assert_eq!(descriptor.get(&order, 2), Value::Float64(Some(0.0)));
    }

    #[test]
    fn map_rows() {
        let mut result = TabularResult::new(["ORDER_ID", "customer_id", "total", "extra"]);
        result
            .push(vec![
                Value::Int32(Some(1)),
                Value::Varchar(Some("17".into())),
                Value::Varchar(Some("10.25".into())),
                Value::Boolean(Some(true)),
            ])
            .unwrap()
            .push(vec![
                Value::Int32(Some(2)),
                Value::Int64(Some(i64::MAX)),
                Value::Null,
                Value::Null,
            ])
            .unwrap();
        let orders: Vec<Order> = map_many(&result);
        assert_eq!(
            orders,
            [
                Order {
                    id: 1,
                    customer_id: 17,
                    total: 10.25,
                    note: Some("none".into()),
                    cache: Vec::new(),
                },
                Order {
                    id: 2,
                    customer_id: 0,
                    total: 0.5,
                    note: Some("none".into()),
                    cache: Vec::new(),
                },
            ]
        );
        assert_eq!(map_one::<Order>(&result), Some(orders[0].clone()));
        assert_eq!(map_one::<Order>(&TabularResult::new(["order_id"])), None);
    }

    #[test]
    fn stage_models() {
        let orders = vec![
            Order {
                id: 1,
                customer_id: 3,
                total: 2.5,
                note: None,
                cache: vec![1],
            },
            Order {
                id: 2,
                customer_id: 4,
                total: 1.0,
                note: Some("gift".into()),
                cache: Vec::new(),
            },
        ];
        let options = BulkOptions::new()
            .with_excluded("Total")
            .with_rename("CustomerId", "customer");
        let staged = orders.stage(&options).unwrap();
        assert_eq!(staged.columns(), ["Id", "CustomerId", "Note"]);
        assert_eq!(staged.destinations(), ["order_id", "customer", "Note"]);
        assert_eq!(staged.len(), 2);
        assert_eq!(
            staged.rows()[1].as_ref(),
            [
                Value::Int64(Some(2)),
                Value::Int32(Some(4)),
                Value::Varchar(Some("gift".into())),
            ]
        );
        assert_eq!(
            staged.column_values("customer").unwrap(),
            [Value::Int32(Some(3)), Value::Int32(Some(4))]
        );
        let options = BulkOptions::new().with_rename("Id", "Note");
        assert!(orders.stage(&options).is_err());
    }
}
