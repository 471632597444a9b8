//! Storage module for persisting pipeline output
//!
//! This module handles all database operations for the loader, including:
//! - SQLite database initialization and staging schema (re)creation
//! - Chunked bulk inserts of page and link rows
//! - Production view definitions over staging

mod schema;
mod sqlite;
mod traits;

pub use schema::{
    TableSpec, BULK_CHUNK_SIZE, PRODUCTION_LINKS_VIEW, PRODUCTION_PAGES_VIEW, STAGING_LINKS,
    STAGING_PAGES,
};
pub use sqlite::SqliteStorage;
pub use traits::{Row, Storage, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use rusqlite::types::Value;

/// One validated, extracted page
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    /// Canonical URL, unique per run
    pub url: String,
    pub title: String,
    /// First substantial paragraph
    pub summary: String,
    /// Concatenated paragraph text
    pub content: String,
    pub word_count: usize,
    /// 0 for the seed
    pub depth: u32,
    /// Page that first linked here, `None` for the seed
    pub parent_url: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub crawled_at: DateTime<Utc>,
}

impl PageRecord {
    /// Converts the record into a `staging_pages` row
    pub fn to_row(&self) -> Row {
        vec![
            Value::Text(self.url.clone()),
            Value::Text(self.title.clone()),
            Value::Text(self.summary.clone()),
            Value::Text(self.content.clone()),
            Value::Integer(self.word_count as i64),
            Value::Integer(i64::from(self.depth)),
            optional_text(self.parent_url.clone()),
            optional_text(self.last_modified.map(|t| t.to_rfc3339())),
            Value::Text(self.crawled_at.to_rfc3339()),
        ]
    }
}

/// One directed edge in the discovered link graph
///
/// The target need not have a [`PageRecord`]; it may have been cut by the
/// per-page fan-out cap or failed extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkEdge {
    pub source_url: String,
    pub target_url: String,
    pub anchor_text: String,
}

impl LinkEdge {
    /// Converts the edge into a `staging_page_links` row
    pub fn to_row(&self) -> Row {
        vec![
            Value::Text(self.source_url.clone()),
            Value::Text(self.target_url.clone()),
            Value::Text(self.anchor_text.clone()),
        ]
    }
}

fn optional_text(value: Option<String>) -> Value {
    value.map(Value::Text).unwrap_or(Value::Null)
}
