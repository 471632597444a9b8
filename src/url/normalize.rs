use crate::url::domain::same_site;
use crate::{UrlError, UrlResult};
use url::Url;

/// Path prefix shared by every article on the crawled site
pub const ARTICLE_PATH_PREFIX: &str = "/wiki/";

/// Resolves an href against a page URL and reduces it to canonical article form
///
/// # Canonicalization Steps
///
/// 1. Resolve relative to `base`; reject if malformed
/// 2. Accept only http(s), and only on the same site as `base`
/// 3. Adopt the scheme of `base`
/// 4. Require the article path prefix and a non-empty slug
/// 5. Strip trailing slashes from the slug
/// 6. Drop fragment and query (a `#section` or `?action=edit` variant is the
///    same article as its bare path)
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_etl::url::canonicalize;
///
/// let base = Url::parse("https://en.wikipedia.org/wiki/Toronto").unwrap();
/// let url = canonicalize("/wiki/Ontario?action=edit#History", &base).unwrap();
/// assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/Ontario");
/// ```
pub fn canonicalize(href: &str, base: &Url) -> UrlResult<Url> {
    let href = href.trim();
    let mut url = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if !same_site(&url, base) {
        return Err(UrlError::OffSite(url.to_string()));
    }

    if url.scheme() != base.scheme() {
        url.set_scheme(base.scheme())
            .map_err(|_| UrlError::InvalidScheme(base.scheme().to_string()))?;
    }

    let slug = match url.path().strip_prefix(ARTICLE_PATH_PREFIX) {
        Some(rest) => rest.trim_end_matches('/').to_string(),
        None => return Err(UrlError::NotArticle(url.to_string())),
    };

    if slug.is_empty() {
        return Err(UrlError::EmptySlug(url.to_string()));
    }

    url.set_path(&format!("{}{}", ARTICLE_PATH_PREFIX, slug));
    url.set_fragment(None);
    url.set_query(None);

    Ok(url)
}

/// Returns the article slug of a canonical URL (`Toronto` for `/wiki/Toronto`)
pub fn article_slug(url: &Url) -> Option<&str> {
    url.path()
        .strip_prefix(ARTICLE_PATH_PREFIX)
        .filter(|slug| !slug.is_empty())
}
