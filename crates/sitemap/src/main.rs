//! Sitemap CLI - catalog sitemap generator.
//!
//! Provides commands for:
//! - `generate`: Run one full generation pass and exit
//! - `serve`: Serve the sitemaps over HTTP, regenerating them as they expire

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{GenerateArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Sitemap - catalog sitemap generator.
#[derive(Parser)]
#[command(name = "sitemap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the sitemap index and files.
    Generate(GenerateArgs),
    /// Start the sitemap server.
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(async {
            match cli.command {
                Commands::Generate(args) => args.execute().await,
                Commands::Serve(args) => args.execute().await,
            }
        }),
        Err(e) => Err(CliError::Io(e)),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
