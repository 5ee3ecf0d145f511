mod connection;
mod database;
mod driver;
mod transaction;

pub use connection::*;
pub use database::*;
pub use driver::*;
pub use transaction::*;
