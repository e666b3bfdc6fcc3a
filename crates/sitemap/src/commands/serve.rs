//! `sitemap serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use sitemap_config::{CliSettings, Config};
use sitemap_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover sitemap.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Output directory for the sitemap files (overrides config).
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Public site URL (overrides config).
    #[arg(long)]
    site_url: Option<String>,

    /// Catalog database URL (overrides config).
    #[arg(long, env = "SITEMAP_DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose output (request and regeneration logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            directory: self.directory,
            site_url: self.site_url,
            database_url: self.database_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let server_config = server_config_from_config(&config)?;

        output.info(&format!(
            "Starting server on {}:{}",
            server_config.host, server_config.port
        ));
        output.info(&format!("Site URL: {}", server_config.sitemap.site_url));
        output.info(&format!(
            "Sitemap directory: {}",
            server_config.sitemap.directory.display()
        ));
        if server_config.sitemap.autorenew {
            output.info(&format!(
                "Auto-renew: every {}s",
                server_config.sitemap.ttl.as_secs()
            ));
        } else {
            output.info("Auto-renew: disabled");
        }

        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
