//! Frontier management: the visited set and per-level URL batches
//!
//! Admission is the only operation that mutates the visited set and it takes
//! `&mut self`, so it cannot overlap the concurrent fetch phase of a level.

use crate::url::{canonicalize, NamespaceFilter};
use crate::UrlResult;
use std::collections::HashSet;
use url::Url;

/// One URL scheduled for a level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    pub url: Url,

    /// The page that first linked here, `None` for the seed
    pub parent_url: Option<String>,
}

/// All URLs to process at one depth, in admission order
#[derive(Debug, Clone, Default)]
pub struct FrontierLevel {
    pub depth: u32,
    pub items: Vec<FrontierItem>,
}

impl FrontierLevel {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A link found during a level, before dedup against the visited set
#[derive(Debug, Clone)]
pub struct DiscoveredLink {
    pub target: String,
    pub parent_url: String,
}

/// Visited-set owner and next-level builder
#[derive(Debug)]
pub struct Frontier {
    site: Url,
    filter: NamespaceFilter,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier for the site of `site`
    pub fn new(site: Url, filter: NamespaceFilter) -> Self {
        Self {
            site,
            filter,
            visited: HashSet::new(),
        }
    }

    /// Builds level 0 from the seed URL
    ///
    /// # Errors
    ///
    /// Returns an error if the seed is not an article URL.
    pub fn seed(&mut self, seed_url: &str) -> UrlResult<FrontierLevel> {
        let url = canonicalize(seed_url, &self.site)?;
        self.admit(&url);
        tracing::debug!("Seeded frontier with {}", url);

        Ok(FrontierLevel {
            depth: 0,
            items: vec![FrontierItem {
                url,
                parent_url: None,
            }],
        })
    }

    /// Marks a URL visited; returns false if it already was
    pub fn admit(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    #[cfg(test)]
    fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Builds the next level from links discovered during the previous one
    ///
    /// Each link is canonicalized, namespace-filtered and checked against
    /// the visited set in the order given. The first parent to reach a
    /// target wins; later duplicates are dropped.
    pub fn next_level<I>(&mut self, depth: u32, discovered: I) -> FrontierLevel
    where
        I: IntoIterator<Item = DiscoveredLink>,
    {
        let mut items = Vec::new();

        for link in discovered {
            let url = match canonicalize(&link.target, &self.site) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Dropping {} from frontier: {}", link.target, e);
                    continue;
                }
            };

            if self.filter.is_excluded(&url) {
                continue;
            }

            if self.admit(&url) {
                items.push(FrontierItem {
                    url,
                    parent_url: Some(link.parent_url),
                });
            }
        }

        FrontierLevel { depth, items }
    }
}
