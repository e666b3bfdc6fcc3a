//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Server error type.
///
/// Responses are plain text. Internal failures are logged here and never
/// leak details to the client.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No sitemap file at the requested path.
    #[error("Sitemap not found: {0}")]
    NotFound(String),

    /// Generation or reading failed.
    #[error(transparent)]
    Sitemap(#[from] sitemap_core::SitemapError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotFound(path) => {
                tracing::debug!(path = %path, "Sitemap not found");
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            Self::Sitemap(e) => {
                tracing::error!(error = %e, "Failed to serve sitemap");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_codes() {
        let not_found = ServerError::NotFound("sitemap-9.xml".to_owned()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let internal = ServerError::Sitemap(sitemap_core::SitemapError::MissingIndex(
            PathBuf::from("public/sitemap_index.xml"),
        ))
        .into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
