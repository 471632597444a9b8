//! URL handling module for Wiki-ETL
//!
//! This module provides canonicalization of article links, same-site checks,
//! and namespace filtering for administrative/meta pages.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, same_site};
pub use matcher::NamespaceFilter;
pub use normalize::{article_slug, canonicalize, ARTICLE_PATH_PREFIX};
