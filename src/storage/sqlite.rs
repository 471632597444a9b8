//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::{initialize_schema, is_valid_identifier, TableSpec, BULK_CHUNK_SIZE};
use crate::storage::traits::{Row, Storage, StorageError, StorageResult};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file, creating parent directories
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn create_schema(&mut self) -> StorageResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    fn bulk_insert(&mut self, table: &TableSpec, rows: &[Row]) -> StorageResult<usize> {
        let ncols = table.columns.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != ncols) {
            return Err(StorageError::RowShape {
                table: table.name,
                expected: ncols,
                got: bad.len(),
            });
        }

        let placeholder = format!("({})", vec!["?"; ncols].join(", "));
        let columns = table.columns.join(", ");

        let tx = self.conn.transaction()?;
        for chunk in rows.chunks(BULK_CHUNK_SIZE) {
            let values = vec![placeholder.as_str(); chunk.len()].join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                table.name, columns, values
            );
            tx.execute(&sql, params_from_iter(chunk.iter().flatten()))?;
        }
        tx.commit()?;

        tracing::debug!("Inserted {} rows into {}", rows.len(), table.name);
        Ok(rows.len())
    }

    fn define_view(&mut self, name: &str, query: &str) -> StorageResult<()> {
        if !is_valid_identifier(name) {
            return Err(StorageError::InvalidIdentifier(name.to_string()));
        }

        // SQLite has no CREATE OR REPLACE VIEW
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP VIEW IF EXISTS {name}; CREATE VIEW {name} AS {query};"
        ))?;
        tx.commit()?;

        tracing::debug!("Defined view {}", name);
        Ok(())
    }
}
