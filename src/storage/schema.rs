//! Database schema definitions
//!
//! Staging tables hold raw, filter-free rows for the current run; production
//! views are pure filters defined over them by the loader.

/// Rows per multi-VALUES insert statement
pub const BULK_CHUNK_SIZE: usize = 500;

/// Name of the production page view
pub const PRODUCTION_PAGES_VIEW: &str = "production_pages";

/// Name of the production edge view
pub const PRODUCTION_LINKS_VIEW: &str = "production_page_links";

/// A staging table and its insert column order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const STAGING_PAGES: TableSpec = TableSpec {
    name: "staging_pages",
    columns: &[
        "url",
        "title",
        "summary",
        "content",
        "word_count",
        "depth",
        "parent_url",
        "last_modified",
        "crawled_at",
    ],
};

pub const STAGING_LINKS: TableSpec = TableSpec {
    name: "staging_page_links",
    columns: &["source_url", "target_url", "link_text"],
};

/// Full-refresh schema: views first, since they reference the tables
pub const SCHEMA_SQL: &str = r#"
DROP VIEW IF EXISTS production_page_links;
DROP VIEW IF EXISTS production_pages;
DROP TABLE IF EXISTS staging_page_links;
DROP TABLE IF EXISTS staging_pages;

CREATE TABLE staging_pages (
    url TEXT PRIMARY KEY,
    title TEXT,
    summary TEXT,
    content TEXT,
    word_count INTEGER,
    depth INTEGER,
    parent_url TEXT,
    last_modified TEXT,
    crawled_at TEXT NOT NULL
);

CREATE TABLE staging_page_links (
    source_url TEXT NOT NULL,
    target_url TEXT NOT NULL,
    link_text TEXT
);

CREATE INDEX idx_page_links_source ON staging_page_links(source_url);
CREATE INDEX idx_page_links_target ON staging_page_links(target_url);
"#;

/// Drops and recreates the staging schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Returns true if `name` is safe to splice into DDL as an identifier
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
