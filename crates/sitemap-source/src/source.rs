//! Package source trait, record types and error types.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDateTime;

/// A publishable catalog package (dataset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package identifier.
    pub id: String,
    /// URL slug of the package.
    pub name: String,
    /// Last modification of the package metadata.
    pub metadata_modified: NaiveDateTime,
    /// Active resources, in display order.
    pub resources: Vec<Resource>,
}

/// A resource (file or link) belonging to a [`Package`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Resource identifier, used in the resource URL.
    pub id: String,
    /// Creation time of the resource.
    pub created: NaiveDateTime,
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// Backend could not be reached (connection refused, missing database file).
    Unavailable,
    /// Query failed.
    Query,
    /// A record holds data that cannot be interpreted.
    InvalidData,
    /// Other/unknown error category.
    Other,
}

/// Source error with semantic kind and backend-specific cause.
#[derive(Debug)]
pub struct SourceError {
    /// Semantic error category.
    pub kind: SourceErrorKind,
    /// Backend identifier (e.g., "Sqlite", "Mock").
    pub backend: Option<&'static str>,
    message: Option<String>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Create a new source error.
    #[must_use]
    pub fn new(kind: SourceErrorKind) -> Self {
        Self {
            kind,
            backend: None,
            message: None,
            source: None,
        }
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message: source"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            SourceErrorKind::Unavailable => "Unavailable",
            SourceErrorKind::Query => "Query failed",
            SourceErrorKind::InvalidData => "Invalid data",
            SourceErrorKind::Other => "Error",
        };
        write!(f, "{kind_str}")?;

        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Boxed future returned by [`PackageSource::packages`].
pub type SourceFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Package>, SourceError>> + Send + 'a>>;

/// Source of publishable catalog packages.
///
/// Implementations return every package that should appear in the sitemap:
/// dataset-typed, active and not private. Packages are ordered by name and
/// each package's resources are in display order, so repeated generation
/// over unchanged data produces identical files.
pub trait PackageSource: Send + Sync {
    /// Fetch all publishable packages with their resources.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend cannot be queried or returns
    /// records that cannot be interpreted.
    fn packages(&self) -> SourceFuture<'_>;
}
