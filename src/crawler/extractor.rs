//! Page extraction and validation
//!
//! This module turns a fetched document into a [`PageRecord`] plus its
//! outbound article links:
//! - Title from the article heading
//! - Summary and full text from the content region's paragraphs
//! - Same-site article links with anchor text
//! - Citation-marker and whitespace cleanup

use crate::crawler::fetcher::FetchedDocument;
use crate::storage::{LinkEdge, PageRecord};
use crate::url::{canonicalize, NamespaceFilter};
use crate::{UrlError, ValidationError};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

/// Cleaned paragraph length a summary must exceed
pub const MIN_SUMMARY_CHARS: usize = 50;

const TITLE_SELECTOR: &str = "h1#firstHeading";
const CONTENT_SELECTOR: &str = "div#mw-content-text";

/// Where a document sits in the crawl
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Canonical URL the document was fetched for
    pub url: &'a Url,
    pub depth: u32,
    pub max_depth: u32,
    pub parent_url: Option<&'a str>,
}

/// Everything extracted from one valid page
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: PageRecord,

    /// Outbound edges in document order, one per distinct target
    pub links: Vec<LinkEdge>,

    /// Links dropped as malformed; the page itself is still valid
    pub rejected_links: Vec<ValidationError>,
}

/// Extracts a page record and its links, or the reason the page is invalid
///
/// # Validation Rules
///
/// - Depth must be within `0..=max_depth`
/// - Title must be present and non-empty after cleaning
/// - Content may be empty; length filtering happens in the production view
///
/// # Arguments
///
/// * `document` - The fetched page
/// * `ctx` - Crawl position of the page
/// * `filter` - Namespaces whose links are skipped
///
/// # Example
///
/// ```no_run
/// # use wiki_etl::crawler::{extract, FetchedDocument, PageContext};
/// # use wiki_etl::url::NamespaceFilter;
/// # fn demo(doc: &FetchedDocument, url: &url::Url) {
/// let ctx = PageContext { url, depth: 0, max_depth: 2, parent_url: None };
/// let filter = NamespaceFilter::new(["File:"]);
/// let extraction = extract(doc, &ctx, &filter).unwrap();
/// println!("{} links from {}", extraction.links.len(), extraction.record.title);
/// # }
/// ```
pub fn extract(
    document: &FetchedDocument,
    ctx: &PageContext<'_>,
    filter: &NamespaceFilter,
) -> Result<Extraction, ValidationError> {
    if ctx.depth > ctx.max_depth {
        return Err(ValidationError::DepthOutOfRange {
            url: ctx.url.to_string(),
            depth: ctx.depth,
            max_depth: ctx.max_depth,
        });
    }

    let html = Html::parse_document(&document.body);

    let title = extract_title(&html).ok_or_else(|| ValidationError::MissingTitle {
        url: ctx.url.to_string(),
    })?;

    let region = selector(CONTENT_SELECTOR).and_then(|s| html.select(&s).next());

    let paragraphs: Vec<String> = match region {
        Some(region) => extract_paragraphs(region),
        None => {
            tracing::debug!("No content region on {}", ctx.url);
            Vec::new()
        }
    };

    let summary = paragraphs
        .iter()
        .find(|p| p.chars().count() > MIN_SUMMARY_CHARS)
        .cloned()
        .unwrap_or_default();
    let content = paragraphs.join(" ");
    let word_count = content.split_whitespace().count();

    let (links, rejected_links) = match region {
        Some(region) => extract_links(region, ctx, filter),
        None => (Vec::new(), Vec::new()),
    };

    let record = PageRecord {
        url: ctx.url.to_string(),
        title,
        summary,
        content,
        word_count,
        depth: ctx.depth,
        parent_url: ctx.parent_url.map(str::to_string),
        last_modified: document.last_modified,
        crawled_at: document.fetched_at,
    };

    Ok(Extraction {
        record,
        links,
        rejected_links,
    })
}

/// Strips `[12]` and `[citation needed]` markers and collapses whitespace
///
/// # Examples
///
/// ```
/// use wiki_etl::crawler::clean_text;
///
/// assert_eq!(clean_text("Toronto[1]  is\n a city.[citation needed]"), "Toronto is a city.");
/// ```
pub fn clean_text(raw: &str) -> String {
    let stripped = match citation_pattern() {
        Some(re) => re.replace_all(raw, ""),
        None => raw.into(),
    };
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn citation_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\[(?:\d+|citation needed)\]").ok())
        .as_ref()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn extract_title(html: &Html) -> Option<String> {
    let heading = selector(TITLE_SELECTOR)?;
    html.select(&heading)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Cleaned, non-empty paragraph texts in document order
fn extract_paragraphs(region: ElementRef<'_>) -> Vec<String> {
    let Some(paragraph) = selector("p") else {
        return Vec::new();
    };

    region
        .select(&paragraph)
        .map(|p| clean_text(&visible_text(p)))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Text of an element, skipping script, style and reference descendants
fn visible_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    let root = (*element).id();

    for node in element.descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root)
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_hidden(&ancestor));

        if !hidden {
            text.push_str(chunk);
        }
    }

    text
}

fn is_hidden(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    matches!(value.name(), "script" | "style") || value.classes().any(|c| c == "reference")
}

/// Outbound article links and the hrefs rejected as malformed
///
/// Off-site, non-article, self and excluded-namespace links are skipped
/// silently. Only the first anchor for each target is kept.
fn extract_links(
    region: ElementRef<'_>,
    ctx: &PageContext<'_>,
    filter: &NamespaceFilter,
) -> (Vec<LinkEdge>, Vec<ValidationError>) {
    let mut links = Vec::new();
    let mut rejected = Vec::new();

    let Some(anchor) = selector("a[href]") else {
        return (links, rejected);
    };

    let source_url = ctx.url.to_string();
    let mut seen: HashSet<String> = HashSet::new();

    for element in region.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let target = match canonicalize(href, ctx.url) {
            Ok(target) => target,
            Err(UrlError::EmptySlug(_)) => {
                rejected.push(malformed(&source_url, href, "empty article slug"));
                continue;
            }
            Err(UrlError::Parse(reason)) => {
                rejected.push(malformed(&source_url, href, &reason));
                continue;
            }
            Err(other) => {
                tracing::trace!("Skipping link {} on {}: {}", href, source_url, other);
                continue;
            }
        };

        if filter.is_excluded(&target) {
            tracing::trace!("Skipping excluded namespace link {}", target);
            continue;
        }

        if target == *ctx.url {
            continue;
        }

        let target_url = target.to_string();
        if !seen.insert(target_url.clone()) {
            continue;
        }

        links.push(LinkEdge {
            source_url: source_url.clone(),
            target_url,
            anchor_text: clean_text(&element.text().collect::<String>()),
        });
    }

    (links, rejected)
}

fn malformed(source_url: &str, href: &str, reason: &str) -> ValidationError {
    ValidationError::MalformedLink {
        source_url: source_url.to_string(),
        href: href.to_string(),
        reason: reason.to_string(),
    }
}
