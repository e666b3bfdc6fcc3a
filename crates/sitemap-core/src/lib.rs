//! Sitemap generation for catalog sites.
//!
//! This crate turns the publishable records of a data catalog into
//! sitemaps.org XML files and keeps them on disk until they expire:
//!
//! - [`Generator`]: one full pass. Collects URL entries (static links, custom
//!   links, datasets, resources), splits them into files of at most
//!   `max_items` entries via [`BatchWriter`], then writes the index.
//! - [`CacheState`]: decides whether the files on disk are fresh, stale or
//!   missing from the index file's modification time.
//! - [`Sitemaps`]: the service used by the HTTP server and the CLI. Runs the
//!   cache controller, serializes regeneration per output directory and reads
//!   files back.
//!
//! # Output layout
//!
//! ```text
//! {directory}/
//! +-- sitemap_index.xml   # <sitemapindex> listing every file below
//! +-- sitemap-0.xml       # <urlset> with up to max_items <url> entries
//! +-- sitemap-1.xml
//! +-- ...
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sitemap_core::{SitemapSettings, Sitemaps};
//! use sitemap_source::SqliteSource;
//!
//! let settings = SitemapSettings::from_config(&config);
//! let source = Arc::new(SqliteSource::connect("sqlite://catalog.db").await?);
//! let sitemaps = Sitemaps::new(settings, source);
//! let index_xml = sitemaps.index().await?;
//! ```

mod batch;
mod cache;
mod entry;
mod error;
mod generator;
mod index;
mod lock;
mod service;
mod store;
mod urls;
mod writer;

use std::path::PathBuf;
use std::time::Duration;

pub use batch::BatchWriter;
pub use cache::CacheState;
pub use entry::{Alternate, UrlEntry};
pub use error::SitemapError;
pub use generator::{GenerationSummary, Generator};
pub use index::render_index;
pub use service::Sitemaps;
pub use store::{INDEX_FILE_NAME, SitemapStore, file_name, parse_file_name};
pub use urls::{LocaleSet, SiteUrls};
pub use writer::{SITEMAP_NS, XHTML_NS, render_urlset};

/// Settings for generating and caching sitemaps.
#[derive(Clone, Debug)]
pub struct SitemapSettings {
    /// Output directory for the index and numbered files.
    pub directory: PathBuf,
    /// Absolute site root, without trailing slash.
    pub site_url: String,
    /// URL segment datasets are published under.
    pub package_type: String,
    /// Languages emitted as `xhtml:link` alternates.
    pub locales: LocaleSet,
    /// Regenerate automatically once the index is stale.
    pub autorenew: bool,
    /// Age at which the index becomes stale.
    pub ttl: Duration,
    /// Maximum `<url>` entries per file.
    pub max_items: usize,
    /// Include resource-level URLs.
    pub resources: bool,
    /// Emit language alternates for dataset and resource URLs.
    pub language_alternatives: bool,
    /// Operator-configured extra URIs.
    pub custom_uris: Vec<String>,
}

impl SitemapSettings {
    /// Build settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &sitemap_config::Config) -> Self {
        let sitemap = &config.sitemap_resolved;
        Self {
            directory: sitemap.directory.clone(),
            site_url: config.site_root().to_owned(),
            package_type: config.site.package_type.clone(),
            locales: LocaleSet::new(
                &config.locales.offered,
                &config.locales.filtered_out,
                &config.locales.default,
            ),
            autorenew: sitemap.autorenew,
            ttl: sitemap.ttl,
            max_items: sitemap.max_items,
            resources: sitemap.resources,
            language_alternatives: sitemap.language_alternatives,
            custom_uris: sitemap.custom_uris.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! XML inspection helpers shared by the unit tests.

    use std::path::Path;
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveDateTime};
    use quick_xml::events::Event;
    use quick_xml::reader::Reader;

    use crate::{LocaleSet, SitemapSettings};

    pub(crate) fn settings(directory: &Path) -> SitemapSettings {
        SitemapSettings {
            directory: directory.to_path_buf(),
            site_url: "https://data.example.org".to_owned(),
            package_type: "dataset".to_owned(),
            locales: LocaleSet::default(),
            autorenew: true,
            ttl: Duration::from_secs(28800),
            max_items: 5000,
            resources: true,
            language_alternatives: false,
            custom_uris: Vec::new(),
        }
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
    }

    /// Count start/empty elements with the given qualified name.
    pub(crate) fn count_elements(xml: &[u8], name: &str) -> usize {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut count = 0;
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == name.as_bytes() => {
                    count += 1;
                }
                Event::Eof => return count,
                _ => {}
            }
            buf.clear();
        }
    }

    /// Text of every `<loc>` element, in document order.
    pub(crate) fn locs(xml: &[u8]) -> Vec<String> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut in_loc = false;
        let mut out = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) if e.name().as_ref() == b"loc" => in_loc = true,
                Event::End(e) if e.name().as_ref() == b"loc" => in_loc = false,
                Event::Text(e) if in_loc => {
                    out.push(reader.decoder().decode(&e).unwrap().into_owned());
                }
                Event::Eof => return out,
                _ => {}
            }
            buf.clear();
        }
    }
}
