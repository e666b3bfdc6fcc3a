//! Sitemap service shared by the HTTP server and the CLI.

use std::sync::Arc;
use std::time::SystemTime;

use chrono::Utc;
use sitemap_source::PackageSource;

use crate::SitemapSettings;
use crate::cache::CacheState;
use crate::error::SitemapError;
use crate::generator::{GenerationSummary, Generator};
use crate::lock::directory_lock;
use crate::store::{INDEX_FILE_NAME, file_name};

/// Generates, caches and reads back the sitemaps of one output directory.
pub struct Sitemaps {
    settings: SitemapSettings,
    generator: Generator,
    source: Arc<dyn PackageSource>,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Sitemaps {
    /// Create the service.
    ///
    /// All services writing to the same directory share one regeneration lock.
    #[must_use]
    pub fn new(settings: SitemapSettings, source: Arc<dyn PackageSource>) -> Self {
        Self {
            generator: Generator::new(&settings),
            lock: directory_lock(&settings.directory),
            settings,
            source,
        }
    }

    /// Settings the service was created with.
    #[must_use]
    pub fn settings(&self) -> &SitemapSettings {
        &self.settings
    }

    /// Run a full generation pass regardless of cache state.
    pub async fn regenerate(&self) -> Result<GenerationSummary, SitemapError> {
        let _guard = self.lock.lock().await;
        self.generate_locked().await
    }

    /// Regenerate if the cache controller asks for it.
    ///
    /// Returns the state observed before any regeneration.
    pub async fn ensure_fresh(&self) -> Result<CacheState, SitemapError> {
        let state = self.cache_state()?;
        if !state.needs_regeneration(self.settings.autorenew) {
            return Ok(state);
        }

        let _guard = self.lock.lock().await;
        // Another request may have regenerated while we waited.
        let state = self.cache_state()?;
        if !state.needs_regeneration(self.settings.autorenew) {
            return Ok(state);
        }

        if state == CacheState::Stale {
            tracing::info!(ttl_secs = self.settings.ttl.as_secs(), "Sitemap index expired");
            self.generator.store().remove_index()?;
        } else {
            tracing::info!("Sitemap index missing");
        }
        self.generate_locked().await?;
        Ok(state)
    }

    /// Contents of the sitemap index, generating it first if needed.
    pub async fn index(&self) -> Result<Vec<u8>, SitemapError> {
        self.ensure_fresh().await?;
        self.generator
            .store()
            .read(INDEX_FILE_NAME)?
            .ok_or_else(|| SitemapError::MissingIndex(self.generator.store().index_path()))
    }

    /// Contents of `sitemap-<index>.xml`, or `None` if no such file exists.
    ///
    /// A pass is run first when the directory holds no numbered file at all.
    pub async fn file(&self, index: usize) -> Result<Option<Vec<u8>>, SitemapError> {
        let store = self.generator.store();
        if store.numbered_files()?.is_empty() {
            let _guard = self.lock.lock().await;
            if store.numbered_files()?.is_empty() {
                tracing::info!("No sitemap files on disk");
                self.generate_locked().await?;
            }
        }
        store.read(&file_name(index))
    }

    fn cache_state(&self) -> Result<CacheState, SitemapError> {
        CacheState::of(
            &self.generator.store().index_path(),
            self.settings.ttl,
            SystemTime::now(),
        )
    }

    async fn generate_locked(&self) -> Result<GenerationSummary, SitemapError> {
        tracing::info!(directory = %self.settings.directory.display(), "Generating sitemaps");
        let packages = self.source.packages().await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to load catalog records");
        })?;
        self.generator.run(&packages, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    use crate::testing::{count_elements, datetime, settings};
    use pretty_assertions::assert_eq;
    use sitemap_source::MockSource;
    use tempfile::TempDir;

    fn service(tmp: &TempDir, source: &Arc<MockSource>) -> Sitemaps {
        Sitemaps::new(settings(tmp.path()), Arc::clone(source) as Arc<dyn PackageSource>)
    }

    fn age_index(sitemaps: &Sitemaps, age: Duration) {
        let file = File::options()
            .write(true)
            .open(sitemaps.generator.store().index_path())
            .unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_missing_index_generates_once() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(MockSource::new().with_package("alpha", datetime(2024, 3, 1)));
        let sitemaps = service(&tmp, &source);

        let index = sitemaps.index().await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(count_elements(&index, "sitemap"), 1);
    }

    #[tokio::test]
    async fn test_fresh_index_served_without_source_call() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(MockSource::new());
        let sitemaps = service(&tmp, &source);
        sitemaps.regenerate().await.unwrap();

        let state = sitemaps.ensure_fresh().await.unwrap();
        sitemaps.index().await.unwrap();

        assert_eq!(state, CacheState::Fresh);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_index_regenerated_with_autorenew() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(MockSource::new());
        let sitemaps = service(&tmp, &source);
        sitemaps.regenerate().await.unwrap();
        age_index(&sitemaps, Duration::from_secs(28800));

        let state = sitemaps.ensure_fresh().await.unwrap();

        assert_eq!(state, CacheState::Stale);
        assert_eq!(source.calls(), 2);
        assert_eq!(sitemaps.ensure_fresh().await.unwrap(), CacheState::Fresh);
    }

    #[tokio::test]
    async fn test_stale_index_kept_without_autorenew() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(MockSource::new());
        let mut settings = settings(tmp.path());
        settings.autorenew = false;
        let sitemaps = Sitemaps::new(settings, Arc::clone(&source) as Arc<dyn PackageSource>);
        sitemaps.regenerate().await.unwrap();
        age_index(&sitemaps, Duration::from_secs(90000));

        let state = sitemaps.ensure_fresh().await.unwrap();
        let index = sitemaps.index().await.unwrap();

        assert_eq!(state, CacheState::Stale);
        assert_eq!(source.calls(), 1);
        assert_eq!(count_elements(&index, "sitemap"), 1);
    }

    #[tokio::test]
    async fn test_file_out_of_range_is_none() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(tmp.path());
        settings.max_items = 3;
        // 4 static + 1 dataset = 5 entries → 2 files
        let source = Arc::new(MockSource::new().with_package("alpha", datetime(2024, 3, 1)));
        let sitemaps = Sitemaps::new(settings, Arc::clone(&source) as Arc<dyn PackageSource>);

        assert!(sitemaps.file(1).await.unwrap().is_some());
        assert_eq!(sitemaps.file(5).await.unwrap(), None);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(MockSource::failing("connection refused"));
        let sitemaps = service(&tmp, &source);

        let err = sitemaps.index().await.unwrap_err();

        assert!(matches!(err, SitemapError::Source(_)));
        assert!(!tmp.path().join(INDEX_FILE_NAME).exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_generate_once() {
        let tmp = TempDir::new().unwrap();
        let source = Arc::new(MockSource::new().with_package("alpha", datetime(2024, 3, 1)));
        let sitemaps = Arc::new(service(&tmp, &source));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sitemaps = Arc::clone(&sitemaps);
                tokio::spawn(async move { sitemaps.index().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(source.calls(), 1);
    }
}
