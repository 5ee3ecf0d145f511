use ferry_core::{Model, Schema, Value, impl_enum_value};
use rust_decimal::Decimal;
use time::PrimitiveDateTime;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[default]
    Active = 1,
    Suspended = 2,
    Closed = 3,
}
impl_enum_value!(Status { Active, Suspended, Closed });

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub balance: Decimal,
    pub status: Status,
    pub created_at: Option<PrimitiveDateTime>,
    pub region: String,
    pub notes: Vec<u8>,
}

impl Model for Customer {
    fn schema(schema: Schema<Self>) -> Schema<Self> {
        schema
            .field("Id", |m| &m.id, |m| &mut m.id)
            .field("Name", |m| &m.name, |m| &mut m.name)
            .column("customer_name")
            .field("Email", |m| &m.email, |m| &mut m.email)
            .field("Balance", |m| &m.balance, |m| &mut m.balance)
            .format("#,##0.00")
            .field("Status", |m| &m.status, |m| &mut m.status)
            .field("CreatedAt", |m| &m.created_at, |m| &mut m.created_at)
            .format("[day]/[month]/[year] [hour]:[minute]")
            .field("Region", |m| &m.region, |m| &mut m.region)
            .column("sales_region")
            .optional()
            .default_value("unassigned")
            .field("Notes", |m| &m.notes, |m| &mut m.notes)
            .ignore()
    }
}

/// Column labels of a hand written customer result.
pub const CUSTOMER_COLUMNS: [&str; 6] = [
    "CUSTOMER_ID",
    "customer_name",
    "email",
    "Balance",
    "status",
    "created_at",
];

/// A customer row shaped as a database would return it, mostly text.
pub fn customer_row(id: i32, name: &str, balance: &str, status: &str, created: &str) -> Vec<Value> {
    vec![
        Value::Int64(Some(id as i64)),
        Value::Varchar(Some(name.into())),
        Value::Varchar(None),
        Value::Varchar(Some(balance.into())),
        Value::Varchar(Some(status.into())),
        Value::Varchar(Some(created.into())),
    ]
}
