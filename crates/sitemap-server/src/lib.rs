//! HTTP server for catalog sitemaps.
//!
//! This crate serves the files produced by `sitemap-core` with axum:
//! - `GET /sitemap_index.xml`: the sitemap index, regenerated on demand
//! - `GET /sitemap-<n>.xml`: numbered sitemap files
//! - `GET /sitemap.xml`: permanent redirect to the index (legacy clients)
//!
//! Every request runs the TTL check first, so a stale or missing index is
//! regenerated before it is served (subject to `autorenew`).
//!
//! # Quick Start
//!
//! ```ignore
//! use sitemap_server::{run_server, server_config_from_config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = sitemap_config::Config::load(None, None).unwrap();
//!     let server_config = server_config_from_config(&config).unwrap();
//!     run_server(server_config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Crawler ──HTTP──► axum server (sitemap-server)
//!                        │
//!                        └─► Sitemaps (sitemap-core)
//!                                │
//!                                ├─► TTL check on sitemap_index.xml
//!                                ├─► Generator ──► PackageSource (sqlite)
//!                                └─► read file from output directory
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use sitemap_config::{Config, ConfigError};
use sitemap_core::{SitemapSettings, Sitemaps};
use sitemap_source::{PackageSource, SqliteSource};
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Redirect `/sitemap.xml` to the index.
    pub legacy_redirect: bool,
    /// Catalog database URL.
    pub database_url: String,
    /// Generation and caching settings.
    pub sitemap: SitemapSettings,
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the server fails
/// to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source: Arc<dyn PackageSource> = Arc::new(SqliteSource::connect(&config.database_url).await?);
    let sitemaps = Sitemaps::new(config.sitemap.clone(), source);

    let state = Arc::new(AppState {
        sitemaps,
        legacy_redirect: config.legacy_redirect,
    });
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        directory = %config.sitemap.directory.display(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from the loaded configuration.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] if no database URL is configured.
pub fn server_config_from_config(config: &Config) -> Result<ServerConfig, ConfigError> {
    Ok(ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        legacy_redirect: config.server.legacy_redirect,
        database_url: config.require_database_url()?.to_owned(),
        sitemap: SitemapSettings::from_config(config),
    })
}
