//! Error types for sitemap generation.

use std::path::PathBuf;

use sitemap_source::SourceError;

/// Sitemap generation error.
///
/// Every variant aborts the current generation pass; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    /// The package source failed.
    #[error("Failed to load catalog records: {0}")]
    Source(#[from] SourceError),

    /// Reading or writing a sitemap file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory the operation was applied to.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A generation pass finished but the index file is not on disk.
    #[error("Sitemap index missing after generation: {}", .0.display())]
    MissingIndex(PathBuf),
}

impl SitemapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
