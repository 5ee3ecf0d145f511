mod as_value;
mod bulk;
mod coercer;
mod connection;
mod descriptor;
mod driver;
mod executor;
mod identifier;
mod mapping;
mod matcher;
mod model;
mod query;
mod staged;
mod statement;
mod transaction;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use bulk::*;
pub use coercer::*;
pub use connection::*;
pub use descriptor::*;
pub use driver::*;
pub use executor::*;
pub use identifier::*;
pub use mapping::*;
pub use matcher::*;
pub use model::*;
pub use query::*;
pub use staged::*;
pub use statement::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub use writer::{GenericSqlWriter, SqlWriter};
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
