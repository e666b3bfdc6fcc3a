//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// Static routes take priority over `/{file}`, so the index and the legacy
/// redirect never reach the numbered-file handler.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/sitemap_index.xml", get(handlers::sitemaps::get_index))
        .route("/{file}", get(handlers::sitemaps::get_file));

    if state.legacy_redirect {
        router = router.route("/sitemap.xml", get(handlers::sitemaps::redirect_legacy));
    }

    router
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use sitemap_core::{SitemapSettings, Sitemaps};
    use sitemap_source::{MockSource, PackageSource};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn settings(tmp: &TempDir, max_items: usize) -> SitemapSettings {
        SitemapSettings {
            directory: tmp.path().to_path_buf(),
            site_url: "https://data.example.org".to_owned(),
            package_type: "dataset".to_owned(),
            locales: sitemap_core::LocaleSet::default(),
            autorenew: true,
            ttl: std::time::Duration::from_secs(28800),
            max_items,
            resources: true,
            language_alternatives: false,
            custom_uris: Vec::new(),
        }
    }

    fn router(tmp: &TempDir, source: MockSource, legacy_redirect: bool) -> Router {
        let source: Arc<dyn PackageSource> = Arc::new(source);
        create_router(Arc::new(AppState {
            sitemaps: Sitemaps::new(settings(tmp, 3), source),
            legacy_redirect,
        }))
    }

    fn catalog() -> MockSource {
        let modified = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        // 4 static + 1 dataset + 1 resource = 6 entries → 3 files with max_items 3
        MockSource::new()
            .with_package("census", modified)
            .with_resource("census", "r-1", modified)
    }

    async fn send(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_served_as_xml() {
        let tmp = TempDir::new().unwrap();

        let response = send(router(&tmp, catalog(), true), "/sitemap_index.xml").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        let body = body_text(response).await;
        assert!(body.contains("<loc>https://data.example.org/sitemap-2.xml</loc>"));
    }

    #[tokio::test]
    async fn test_numbered_file_served() {
        let tmp = TempDir::new().unwrap();

        let response = send(router(&tmp, catalog(), true), "/sitemap-1.xml").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
        let body = body_text(response).await;
        assert!(body.contains("https://data.example.org/dataset/census"));
    }

    #[tokio::test]
    async fn test_out_of_range_file_is_not_found() {
        let tmp = TempDir::new().unwrap();

        let response = send(router(&tmp, catalog(), true), "/sitemap-5.xml").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Not Found");
    }

    #[tokio::test]
    async fn test_malformed_names_are_not_found() {
        let tmp = TempDir::new().unwrap();
        let router = router(&tmp, catalog(), true);

        for uri in ["/sitemap-01.xml", "/sitemap-x.xml", "/robots.txt", "/a/sitemap-0.xml"] {
            let response = send(router.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_legacy_path_redirects_to_index() {
        let tmp = TempDir::new().unwrap();

        let response = send(router(&tmp, catalog(), true), "/sitemap.xml").await;

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/sitemap_index.xml");
    }

    #[tokio::test]
    async fn test_legacy_path_disabled() {
        let tmp = TempDir::new().unwrap();

        let response = send(router(&tmp, catalog(), false), "/sitemap.xml").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generation_failure_is_internal_error() {
        let tmp = TempDir::new().unwrap();

        let response = send(
            router(&tmp, MockSource::failing("database is locked"), true),
            "/sitemap_index.xml",
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(body_text(response).await, "Internal Server Error");
    }
}
