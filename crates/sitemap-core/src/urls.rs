//! URL construction for catalog pages.
//!
//! All locations are absolute and start with the site root. Paths follow the
//! catalog's routing: `/dataset/<name>` for datasets and
//! `/dataset/<name>/resource/<id>` for resources, where `dataset` is the
//! configured package type.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sitemap_source::{Package, Resource};

use crate::entry::{Alternate, UrlEntry};

/// Top-level pages always listed first: home, dataset search, organization
/// index, group index.
const STATIC_PATHS: &[&str] = &["/", "/dataset/", "/organization/", "/group/"];

/// Languages offered as alternates.
///
/// Built from the offered locales minus filtered-out locales minus the
/// default locale. Iteration order is sorted, so output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSet(BTreeSet<String>);

impl LocaleSet {
    /// Compute the alternate languages from locale configuration.
    #[must_use]
    pub fn new(offered: &[String], filtered_out: &[String], default: &str) -> Self {
        Self(
            offered
                .iter()
                .filter(|l| l.as_str() != default && !filtered_out.contains(l))
                .cloned()
                .collect(),
        )
    }

    /// Iterate language codes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True if no alternates would be emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds [`UrlEntry`] values for the pages of one site.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    root: String,
    package_type: String,
    locales: LocaleSet,
    alternates: bool,
}

impl SiteUrls {
    /// Create a builder for the site at `root`.
    ///
    /// Language alternates are only attached when `alternates` is true.
    #[must_use]
    pub fn new(root: &str, package_type: &str, locales: LocaleSet, alternates: bool) -> Self {
        Self {
            root: root.trim_end_matches('/').to_owned(),
            package_type: package_type.to_owned(),
            locales,
            alternates,
        }
    }

    /// Site root without trailing slash.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Entries for the fixed top-level pages, dated `today`.
    #[must_use]
    pub fn static_entries(&self, today: NaiveDate) -> Vec<UrlEntry> {
        STATIC_PATHS
            .iter()
            .map(|path| UrlEntry::new(self.absolute(path), today))
            .collect()
    }

    /// Entry for an operator-configured URI, dated `today`.
    ///
    /// A URI already under the site root is used verbatim and a relative
    /// path is joined to the root. URIs on other hosts are skipped, since a
    /// sitemap may only list its own site.
    #[must_use]
    pub fn custom_entry(&self, uri: &str, today: NaiveDate) -> Option<UrlEntry> {
        if self.is_own_url(uri) {
            return Some(UrlEntry::new(uri, today));
        }
        if uri.contains("://") {
            tracing::warn!(uri, root = %self.root, "Skipping custom URI outside the site");
            return None;
        }
        let path = format!("/{}", uri.trim_start_matches('/'));
        Some(UrlEntry::new(self.absolute(&path), today))
    }

    /// Entry for a dataset page, dated by its metadata modification.
    #[must_use]
    pub fn dataset_entry(&self, package: &Package) -> UrlEntry {
        let path = format!("/{}/{}", self.package_type, package.name);
        self.localized(&path, package.metadata_modified.date())
    }

    /// Entry for a resource page, dated by the resource's creation.
    #[must_use]
    pub fn resource_entry(&self, package: &Package, resource: &Resource) -> UrlEntry {
        let path = format!(
            "/{}/{}/resource/{}",
            self.package_type, package.name, resource.id
        );
        self.localized(&path, resource.created.date())
    }

    fn localized(&self, path: &str, last_modified: NaiveDate) -> UrlEntry {
        let mut entry = UrlEntry::new(self.absolute(path), last_modified);
        if self.alternates {
            entry.alternates = self
                .locales
                .iter()
                .map(|language| Alternate {
                    language: language.to_owned(),
                    href: format!("{}/{language}{path}", self.root),
                })
                .collect();
        }
        entry
    }

    fn absolute(&self, path: &str) -> String {
        format!("{}{path}", self.root)
    }

    fn is_own_url(&self, uri: &str) -> bool {
        uri.strip_prefix(&self.root)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
    }
}
