//! Application state.

use sitemap_core::Sitemaps;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Sitemap service for the configured output directory.
    pub(crate) sitemaps: Sitemaps,
    /// Serve `/sitemap.xml` as a redirect to the index.
    pub(crate) legacy_redirect: bool,
}
