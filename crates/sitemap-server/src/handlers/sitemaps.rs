//! Sitemap endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use sitemap_core::{INDEX_FILE_NAME, parse_file_name};

use crate::error::ServerError;
use crate::state::AppState;

const XML_CONTENT_TYPE: &str = "application/xml";

fn xml(body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
}

/// Handle GET /sitemap_index.xml.
pub(crate) async fn get_index(State(state): State<Arc<AppState>>) -> Result<Response, ServerError> {
    let body = state.sitemaps.index().await?;
    Ok(xml(body))
}

/// Handle GET /{file} for numbered sitemap files.
///
/// Anything that is not a canonical `sitemap-<n>.xml` name, or names a file
/// beyond the last one generated, is a 404.
pub(crate) async fn get_file(
    Path(file): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let index = parse_file_name(&file).ok_or_else(|| ServerError::NotFound(file.clone()))?;
    match state.sitemaps.file(index).await? {
        Some(body) => Ok(xml(body)),
        None => Err(ServerError::NotFound(file)),
    }
}

/// Handle GET /sitemap.xml.
pub(crate) async fn redirect_legacy() -> Redirect {
    Redirect::permanent(&format!("/{INDEX_FILE_NAME}"))
}
