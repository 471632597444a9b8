use crate::url::normalize::article_slug;
use url::Url;

/// Excludes articles whose slug starts with an administrative namespace
///
/// `Category:Canada` is in the `Category:` namespace; `Toronto` and
/// `Toronto:_A_History` (unknown prefix) are ordinary articles.
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    prefixes: Vec<String>,
}

impl NamespaceFilter {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the URL belongs to an excluded namespace
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use wiki_etl::url::NamespaceFilter;
    ///
    /// let filter = NamespaceFilter::new(["File:", "Category:"]);
    /// let file = Url::parse("https://en.wikipedia.org/wiki/File:X.png").unwrap();
    /// let article = Url::parse("https://en.wikipedia.org/wiki/Ontario").unwrap();
    /// assert!(filter.is_excluded(&file));
    /// assert!(!filter.is_excluded(&article));
    /// ```
    pub fn is_excluded(&self, url: &Url) -> bool {
        let Some(slug) = article_slug(url) else {
            return false;
        };

        match slug.split_once(':') {
            Some((namespace, _)) => self
                .prefixes
                .iter()
                .any(|prefix| prefix.strip_suffix(':') == Some(namespace)),
            None => false,
        }
    }
}
