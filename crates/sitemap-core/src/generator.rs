//! Full generation pass: entries → numbered files → index.

use chrono::NaiveDate;
use sitemap_source::Package;

use crate::SitemapSettings;
use crate::batch::BatchWriter;
use crate::error::SitemapError;
use crate::index::render_index;
use crate::store::{INDEX_FILE_NAME, SitemapStore};
use crate::urls::SiteUrls;

/// Outcome of a generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Number of numbered sitemap files written.
    pub files: usize,
    /// Number of `<url>` entries across all files.
    pub urls: usize,
}

/// Writes the sitemap files and index for a set of packages.
#[derive(Debug, Clone)]
pub struct Generator {
    urls: SiteUrls,
    store: SitemapStore,
    max_items: usize,
    resources: bool,
    custom_uris: Vec<String>,
}

impl Generator {
    /// Create a generator from settings.
    #[must_use]
    pub fn new(settings: &SitemapSettings) -> Self {
        Self {
            urls: SiteUrls::new(
                &settings.site_url,
                &settings.package_type,
                settings.locales.clone(),
                settings.language_alternatives,
            ),
            store: SitemapStore::new(settings.directory.clone()),
            max_items: settings.max_items,
            resources: settings.resources,
            custom_uris: settings.custom_uris.clone(),
        }
    }

    /// Store the generator writes to.
    #[must_use]
    pub fn store(&self) -> &SitemapStore {
        &self.store
    }

    /// Run one pass over `packages`.
    ///
    /// Entries are written in order: top-level pages, custom URIs, then each
    /// dataset followed by its resources. Static and custom entries are
    /// dated `today`. The index is written after all numbered files, and
    /// numbered files left over from an earlier, larger pass are removed.
    ///
    /// Any write failure aborts the pass.
    pub fn run(
        &self,
        packages: &[Package],
        today: NaiveDate,
    ) -> Result<GenerationSummary, SitemapError> {
        self.store.ensure_dir()?;

        let mut batch = BatchWriter::open(&self.store, self.max_items);

        for entry in self.urls.static_entries(today) {
            batch.add(entry)?;
        }
        for uri in &self.custom_uris {
            if let Some(entry) = self.urls.custom_entry(uri, today) {
                batch.add(entry)?;
            }
        }
        for package in packages {
            batch.add(self.urls.dataset_entry(package))?;
            if self.resources {
                for resource in &package.resources {
                    batch.add(self.urls.resource_entry(package, resource))?;
                }
            }
        }

        let urls = batch.entries();
        let files = batch.close()?;

        let index = render_index(self.urls.root(), files)
            .map_err(|e| SitemapError::io(self.store.index_path(), e))?;
        self.store.write(INDEX_FILE_NAME, &index)?;
        self.store.prune_from(files)?;

        tracing::info!(
            files,
            urls,
            directory = %self.store.dir().display(),
            "Generated sitemaps"
        );
        Ok(GenerationSummary { files, urls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::file_name;
    use crate::testing::{count_elements, date, datetime, locs, settings};
    use crate::urls::LocaleSet;
    use pretty_assertions::assert_eq;
    use sitemap_source::Resource;
    use tempfile::TempDir;

    fn package(name: &str, resources: &[&str]) -> Package {
        Package {
            id: format!("id-{name}"),
            name: name.to_owned(),
            metadata_modified: datetime(2024, 2, 20),
            resources: resources
                .iter()
                .map(|id| Resource {
                    id: (*id).to_owned(),
                    created: datetime(2024, 2, 1),
                })
                .collect(),
        }
    }

    fn read(store: &SitemapStore, name: &str) -> Vec<u8> {
        store.read(name).unwrap().unwrap()
    }

    #[test]
    fn test_no_datasets_yields_static_links_only() {
        let tmp = TempDir::new().unwrap();
        let generator = Generator::new(&settings(tmp.path()));

        let summary = generator.run(&[], date(2024, 6, 1)).unwrap();

        assert_eq!(summary, GenerationSummary { files: 1, urls: 4 });
        let xml = read(generator.store(), &file_name(0));
        assert_eq!(
            locs(&xml),
            vec![
                "https://data.example.org/",
                "https://data.example.org/dataset/",
                "https://data.example.org/organization/",
                "https://data.example.org/group/",
            ]
        );
        let index = read(generator.store(), INDEX_FILE_NAME);
        assert_eq!(locs(&index), vec!["https://data.example.org/sitemap-0.xml"]);
    }

    #[test]
    fn test_entry_order_static_custom_datasets_resources() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(tmp.path());
        settings.custom_uris = vec![
            "/about".to_owned(),
            "https://elsewhere.org/skipped".to_owned(),
        ];
        let generator = Generator::new(&settings);

        generator
            .run(
                &[package("alpha", &["r1", "r2"]), package("beta", &[])],
                date(2024, 6, 1),
            )
            .unwrap();

        let xml = read(generator.store(), &file_name(0));
        assert_eq!(
            locs(&xml)[4..].to_vec(),
            vec![
                "https://data.example.org/about",
                "https://data.example.org/dataset/alpha",
                "https://data.example.org/dataset/alpha/resource/r1",
                "https://data.example.org/dataset/alpha/resource/r2",
                "https://data.example.org/dataset/beta",
            ]
        );
    }

    #[test]
    fn test_resources_disabled() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(tmp.path());
        settings.resources = false;
        let generator = Generator::new(&settings);

        let summary = generator
            .run(&[package("alpha", &["r1", "r2"])], date(2024, 6, 1))
            .unwrap();

        assert_eq!(summary.urls, 5);
        let xml = read(generator.store(), &file_name(0));
        assert!(locs(&xml).iter().all(|loc| !loc.contains("/resource/")));
    }

    #[test]
    fn test_every_loc_starts_with_site_root() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(tmp.path());
        settings.max_items = 3;
        settings.custom_uris = vec!["faq".to_owned(), "https://data.example.org/x".to_owned()];
        let generator = Generator::new(&settings);

        let summary = generator
            .run(&[package("a", &["r"]), package("b", &["s", "t"])], date(2024, 6, 1))
            .unwrap();

        for i in 0..summary.files {
            for loc in locs(&read(generator.store(), &file_name(i))) {
                assert!(loc.starts_with("https://data.example.org/"), "{loc}");
            }
        }
    }

    #[test]
    fn test_index_matches_file_count() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(tmp.path());
        settings.max_items = 2;
        let generator = Generator::new(&settings);

        // 4 static + 3 datasets = 7 entries → 4 files
        let summary = generator
            .run(
                &[package("a", &[]), package("b", &[]), package("c", &[])],
                date(2024, 6, 1),
            )
            .unwrap();

        assert_eq!(summary.files, 4);
        let index = read(generator.store(), INDEX_FILE_NAME);
        assert_eq!(count_elements(&index, "sitemap"), 4);
        assert_eq!(generator.store().numbered_files().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_smaller_pass_prunes_leftover_files() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(tmp.path());
        settings.max_items = 2;
        let generator = Generator::new(&settings);
        // 4 static + 5 datasets = 9 entries → 5 files
        let many: Vec<Package> = (0..5).map(|i| package(&format!("d{i}"), &[])).collect();

        generator.run(&many, date(2024, 6, 1)).unwrap();
        assert_eq!(generator.store().numbered_files().unwrap().len(), 5);

        // 4 static + 1 dataset = 5 entries → 3 files
        let summary = generator.run(&[package("solo", &[])], date(2024, 6, 1)).unwrap();

        assert_eq!(summary.files, 3);
        assert_eq!(generator.store().numbered_files().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_language_alternates_only_on_dataset_entries() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(tmp.path());
        settings.language_alternatives = true;
        settings.locales = LocaleSet::new(&["en".to_owned(), "fr".to_owned()], &[], "en");
        settings.custom_uris = vec!["/about".to_owned()];
        let generator = Generator::new(&settings);

        generator
            .run(&[package("alpha", &["r1"])], date(2024, 6, 1))
            .unwrap();

        let xml = String::from_utf8(read(generator.store(), &file_name(0))).unwrap();
        assert_eq!(count_elements(xml.as_bytes(), "xhtml:link"), 2);
        assert!(xml.contains(r#"href="https://data.example.org/fr/dataset/alpha""#));
        assert!(xml.contains(r#"href="https://data.example.org/fr/dataset/alpha/resource/r1""#));
    }

    #[test]
    fn test_regeneration_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let generator = Generator::new(&settings(tmp.path()));
        let packages = [package("alpha", &["r1"]), package("beta", &["r2", "r3"])];

        generator.run(&packages, date(2024, 6, 1)).unwrap();
        let first_file = read(generator.store(), &file_name(0));
        let first_index = read(generator.store(), INDEX_FILE_NAME);

        generator.run(&packages, date(2024, 6, 1)).unwrap();

        assert_eq!(read(generator.store(), &file_name(0)), first_file);
        assert_eq!(read(generator.store(), INDEX_FILE_NAME), first_index);
    }

    #[test]
    fn test_missing_directory_is_created() {
        let tmp = TempDir::new().unwrap();
        let generator = Generator::new(&settings(&tmp.path().join("nested/out")));

        generator.run(&[], date(2024, 6, 1)).unwrap();

        assert!(tmp.path().join("nested/out").join(INDEX_FILE_NAME).exists());
    }
}
