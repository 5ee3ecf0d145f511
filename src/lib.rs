//! Typed row mapping and set-based bulk writes.
//!
//! Models register their members once through [`Model::schema`]. Tabular results are
//! mapped onto them with [`map_many`] and [`map_one`], and collections of models are
//! moved into tables with a [`BulkClient`] over any [`Driver`].
pub use ferry_core::*;
