mod client;
mod options;
mod request;
mod result;

pub use client::*;
pub use options::*;
pub use request::*;
pub use result::*;
