//! Columnar in-memory table: stable slot indices, tombstoned deletes,
//! key-indexed upsert, cell-level random read, alive-row projection,
//! and bounded substring search .

mod error;
mod table;

pub use error::TableError;
pub use table::{BatchUpsertOutcome, Table, UpsertOutcome, CAPACITY};
