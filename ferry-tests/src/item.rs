use ferry_core::{Model, Schema};

/// Two column row of the `T` table used by the bulk scenarios.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i32,
    pub name: String,
}

impl Item {
    pub fn new(id: i32, name: &str) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Model for Item {
    fn schema(schema: Schema<Self>) -> Schema<Self> {
        schema
            .field("Id", |m| &m.id, |m| &mut m.id)
            .field("Name", |m| &m.name, |m| &mut m.name)
    }
}
