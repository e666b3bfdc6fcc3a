//! URL entries of a sitemap file.

use chrono::NaiveDate;

/// One `<url>` element of a sitemap file.
///
/// Entries are built per generation pass and only persisted as XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// Absolute URL of the page.
    pub location: String,
    /// Date written to `<lastmod>`.
    pub last_modified: NaiveDate,
    /// Translated variants of the page, in emission order.
    pub alternates: Vec<Alternate>,
}

impl UrlEntry {
    /// Create an entry without language alternates.
    #[must_use]
    pub fn new(location: impl Into<String>, last_modified: NaiveDate) -> Self {
        Self {
            location: location.into(),
            last_modified,
            alternates: Vec::new(),
        }
    }
}

/// An `xhtml:link rel="alternate"` annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternate {
    /// Language code written to `hreflang`.
    pub language: String,
    /// Absolute URL of the translated page.
    pub href: String,
}
