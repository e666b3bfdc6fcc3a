//! Mock package source for testing.
//!
//! Provides [`MockSource`] for unit testing without a database.

use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDateTime;

use crate::source::{Package, PackageSource, Resource, SourceError, SourceErrorKind, SourceFuture};

/// In-memory package source.
///
/// Use the builder methods to configure the mock with test data. The number
/// of [`PackageSource::packages`] calls is recorded so tests can observe
/// whether a generation pass ran.
///
/// # Example
///
/// ```ignore
/// use sitemap_source::MockSource;
///
/// let source = MockSource::new()
///     .with_package("census", modified)
///     .with_resource("census", "r-1", created);
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    packages: RwLock<Vec<Package>>,
    failure: RwLock<Option<String>>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a new empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source whose every query fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        let source = Self::default();
        *source.failure.write().unwrap() = Some(message.into());
        source
    }

    /// Add a package without resources. Its id equals its name.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_package(self, name: impl Into<String>, modified: NaiveDateTime) -> Self {
        let name = name.into();
        self.packages.write().unwrap().push(Package {
            id: name.clone(),
            name,
            metadata_modified: modified,
            resources: Vec::new(),
        });
        self
    }

    /// Append a resource to the package named `package`.
    ///
    /// # Panics
    ///
    /// Panics if the package was not added first or the lock is poisoned.
    #[must_use]
    pub fn with_resource(
        self,
        package: &str,
        id: impl Into<String>,
        created: NaiveDateTime,
    ) -> Self {
        {
            let mut packages = self.packages.write().unwrap();
            let target = packages
                .iter_mut()
                .find(|p| p.name == package)
                .expect("with_resource called for unknown package");
            target.resources.push(Resource {
                id: id.into(),
                created,
            });
        }
        self
    }

    /// Replace all packages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_packages(&self, packages: Vec<Package>) {
        *self.packages.write().unwrap() = packages;
    }

    /// Number of times [`PackageSource::packages`] has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PackageSource for MockSource {
    fn packages(&self) -> SourceFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.failure.read().unwrap().as_ref() {
            Some(message) => Err(SourceError::new(SourceErrorKind::Unavailable)
                .with_backend("Mock")
                .with_message(message.clone())),
            None => Ok(self.packages.read().unwrap().clone()),
        };
        Box::pin(std::future::ready(result))
    }
}
