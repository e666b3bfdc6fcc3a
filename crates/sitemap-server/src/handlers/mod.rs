//! HTTP request handlers.

pub(crate) mod sitemaps;

use axum::http::Uri;

use crate::error::ServerError;

/// Handle any path without a route.
pub(crate) async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_owned())
}
