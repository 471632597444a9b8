//! Loader: full-refresh staging load plus production view definitions
//!
//! Every load drops and recreates staging, inserts all rows, and then
//! (re)defines the production views as pure filters over staging.

use crate::storage::{
    LinkEdge, PageRecord, Row, Storage, StorageError, TableSpec, PRODUCTION_LINKS_VIEW,
    PRODUCTION_PAGES_VIEW, STAGING_LINKS, STAGING_PAGES,
};
use thiserror::Error;

/// Target name used when schema (re)creation fails
pub const SCHEMA_TARGET: &str = "schema";

/// Load failures; each aborts the load phase
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to write {target}: {source}")]
    WriteFailure {
        target: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to define view {view}: {source}")]
    ViewDefinitionFailure {
        view: String,
        #[source]
        source: StorageError,
    },
}

impl LoadError {
    /// Short machine-readable kind used in report entries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WriteFailure { .. } => "write-failure",
            Self::ViewDefinitionFailure { .. } => "view-definition-failure",
        }
    }

    /// The table or view that failed
    pub fn target(&self) -> &str {
        match self {
            Self::WriteFailure { target, .. } => target,
            Self::ViewDefinitionFailure { view, .. } => view,
        }
    }

    fn write(target: &str, source: StorageError) -> Self {
        Self::WriteFailure {
            target: target.to_string(),
            source,
        }
    }
}

/// Rows written by a successful load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadResult {
    pub pages_loaded: usize,
    pub links_loaded: usize,
}

/// Query behind the production page view
///
/// # Examples
///
/// ```
/// use wiki_etl::loader::production_pages_query;
///
/// assert!(production_pages_query(50).ends_with("length(content) > 50"));
/// ```
pub fn production_pages_query(min_content_length: usize) -> String {
    format!(
        "SELECT * FROM {} WHERE title IS NOT NULL AND length(content) > {}",
        STAGING_PAGES.name, min_content_length
    )
}

/// Query behind the production edge view: both endpoints must be production pages
pub fn production_links_query() -> String {
    format!(
        "SELECT * FROM {links} \
         WHERE source_url IN (SELECT url FROM {pages}) \
         AND target_url IN (SELECT url FROM {pages})",
        links = STAGING_LINKS.name,
        pages = PRODUCTION_PAGES_VIEW
    )
}

/// Writes crawl output through a [`Storage`] backend
pub struct Loader<'a, S: Storage + ?Sized> {
    storage: &'a mut S,
    min_content_length: usize,
}

impl<'a, S: Storage + ?Sized> Loader<'a, S> {
    pub fn new(storage: &'a mut S, min_content_length: usize) -> Self {
        Self {
            storage,
            min_content_length,
        }
    }

    /// Replaces staging with `records` and `edges`, then defines the views
    ///
    /// # Load Order
    ///
    /// 1. Drop and recreate staging (views are dropped with it)
    /// 2. Insert pages, then edges
    /// 3. Define the page view, then the edge view that depends on it
    ///
    /// The inputs are only borrowed, so a failed load can be retried with
    /// the same crawl output.
    pub fn load(&mut self, records: &[PageRecord], edges: &[LinkEdge]) -> Result<LoadResult, LoadError> {
        tracing::info!(
            "Loading {} pages and {} links into staging",
            records.len(),
            edges.len()
        );

        self.storage
            .create_schema()
            .map_err(|e| LoadError::write(SCHEMA_TARGET, e))?;

        let page_rows: Vec<Row> = records.iter().map(PageRecord::to_row).collect();
        let pages_loaded = self.insert(&STAGING_PAGES, &page_rows)?;

        let link_rows: Vec<Row> = edges.iter().map(LinkEdge::to_row).collect();
        let links_loaded = self.insert(&STAGING_LINKS, &link_rows)?;

        self.define(PRODUCTION_PAGES_VIEW, &production_pages_query(self.min_content_length))?;
        self.define(PRODUCTION_LINKS_VIEW, &production_links_query())?;

        tracing::info!(
            "Load complete: {} pages, {} links; views {} and {} defined",
            pages_loaded,
            links_loaded,
            PRODUCTION_PAGES_VIEW,
            PRODUCTION_LINKS_VIEW
        );

        Ok(LoadResult {
            pages_loaded,
            links_loaded,
        })
    }

    fn insert(&mut self, table: &TableSpec, rows: &[Row]) -> Result<usize, LoadError> {
        self.storage.bulk_insert(table, rows).map_err(|e| {
            tracing::error!("Insert into {} failed: {}", table.name, e);
            LoadError::write(table.name, e)
        })
    }

    fn define(&mut self, view: &str, query: &str) -> Result<(), LoadError> {
        self.storage.define_view(view, query).map_err(|e| {
            tracing::error!("Defining view {} failed: {}", view, e);
            LoadError::ViewDefinitionFailure {
                view: view.to_string(),
                source: e,
            }
        })
    }
}
