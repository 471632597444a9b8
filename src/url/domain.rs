use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_etl::url::extract_domain;
///
/// let url = Url::parse("https://EN.Wikipedia.org/wiki/Toronto").unwrap();
/// assert_eq!(extract_domain(&url), Some("en.wikipedia.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs live on the same site
///
/// Hosts are compared case-insensitively together with the effective port.
/// The scheme is ignored so that `http` and `https` links to the crawled
/// site collapse to one canonical form.
pub fn same_site(candidate: &Url, site: &Url) -> bool {
    match (extract_domain(candidate), extract_domain(site)) {
        // `port()` is None for the scheme's default port
        (Some(a), Some(b)) => a == b && candidate.port() == site.port(),
        _ => false,
    }
}
