//! `sitemap generate` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use sitemap_config::{CliSettings, Config};
use sitemap_core::{GenerationSummary, SitemapSettings, Sitemaps};
use sitemap_source::{PackageSource, SqliteSource};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to configuration file (default: auto-discover sitemap.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the sitemap files (overrides config).
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Public site URL (overrides config).
    #[arg(long)]
    site_url: Option<String>,

    /// Catalog database URL (overrides config).
    #[arg(long, env = "SITEMAP_DATABASE_URL")]
    database_url: Option<String>,

    /// Exit with a non-zero status when generation fails.
    #[arg(long)]
    strict: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// Configuration errors are returned. Generation errors are reported and
    /// only returned with `--strict`.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            directory: self.directory,
            site_url: self.site_url,
            database_url: self.database_url,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let database_url = config.require_database_url()?.to_owned();
        let settings = SitemapSettings::from_config(&config);

        output.info("Starting sitemap generation..");
        match generate(&database_url, settings).await {
            Ok(summary) => {
                tracing::info!(files = summary.files, urls = summary.urls, "Generation complete");
                output.success("Finished sitemap generation.");
                Ok(())
            }
            Err(e) => {
                output.error(&format!("Error during sitemap generation: {e}"));
                if self.strict {
                    Err(CliError::GenerationFailed)
                } else {
                    Ok(())
                }
            }
        }
    }
}

async fn generate(
    database_url: &str,
    settings: SitemapSettings,
) -> Result<GenerationSummary, CliError> {
    let source: Arc<dyn PackageSource> = Arc::new(SqliteSource::connect(database_url).await?);
    let summary = Sitemaps::new(settings, source).regenerate().await?;
    Ok(summary)
}
