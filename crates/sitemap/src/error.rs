//! CLI error types.

use sitemap_config::ConfigError;
use sitemap_core::SitemapError;
use sitemap_source::SourceError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Sitemap(#[from] SitemapError),

    #[error("{0}")]
    Server(String),

    #[error("Sitemap generation failed")]
    GenerationFailed,
}
