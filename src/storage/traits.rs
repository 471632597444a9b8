//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::schema::TableSpec;
use rusqlite::types::Value;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row for {table} has {got} values, expected {expected}")]
    RowShape {
        table: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One positional row, ordered like [`TableSpec::columns`]
pub type Row = Vec<Value>;

/// Trait for storage backend implementations
///
/// The loader issues only these three operation shapes; backends never run
/// ad hoc queries on its behalf.
pub trait Storage {
    /// Drops and recreates the staging tables (and drops the views built on them)
    fn create_schema(&mut self) -> StorageResult<()>;

    /// Inserts all rows into `table`, chunked to bound statement size
    ///
    /// # Returns
    ///
    /// The number of rows written
    fn bulk_insert(&mut self, table: &TableSpec, rows: &[Row]) -> StorageResult<usize>;

    /// Defines (or replaces) the view `name` as `query`
    fn define_view(&mut self, name: &str, query: &str) -> StorageResult<()>;
}
