//! Configuration management for the catalog sitemap generator.
//!
//! Parses `sitemap.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.url`
//! - `server.host`
//! - `database.url`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override sitemap output directory.
    pub directory: Option<PathBuf>,
    /// Override public site URL.
    pub site_url: Option<String>,
    /// Override database URL.
    pub database_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sitemap.toml";

/// Default time-to-live of generated sitemaps (8 hours).
pub const DEFAULT_TTL_SECS: u64 = 8 * 3600;

/// Default number of `<url>` entries per sitemap file.
pub const DEFAULT_MAX_ITEMS: usize = 5000;

/// Upper bound on entries per file imposed by the sitemaps.org protocol.
const PROTOCOL_MAX_ITEMS: usize = 50_000;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Public site configuration.
    pub site: SiteConfig,
    /// Locale configuration used for language alternates.
    pub locales: LocalesConfig,
    /// Sitemap generation configuration (paths are relative strings from TOML).
    sitemap: SitemapConfigRaw,
    /// Catalog database configuration.
    pub database: DatabaseConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Resolved sitemap configuration (set after loading).
    #[serde(skip)]
    pub sitemap_resolved: SitemapConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Public site configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute root URL of the catalog (e.g. `https://data.example.org`).
    pub url: String,
    /// URL segment datasets are published under.
    pub package_type: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            package_type: "dataset".to_owned(),
        }
    }
}

/// Locale configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocalesConfig {
    /// Default locale of the site; never emitted as an alternate.
    pub default: String,
    /// Locales the site is offered in.
    pub offered: Vec<String>,
    /// Locales to leave out of alternates even if offered.
    pub filtered_out: Vec<String>,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            default: "en".to_owned(),
            offered: Vec::new(),
            filtered_out: Vec::new(),
        }
    }
}

/// Raw sitemap configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SitemapConfigRaw {
    directory: Option<String>,
    autorenew: Option<bool>,
    ttl: Option<u64>,
    max_items: Option<usize>,
    resources: Option<bool>,
    language_alternatives: Option<bool>,
    #[serde(alias = "additional_uris")]
    custom_uris: Option<String>,
}

/// Resolved sitemap configuration with an absolute output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapConfig {
    /// Directory the sitemap files are written to.
    pub directory: PathBuf,
    /// Regenerate automatically once the index is older than `ttl`.
    pub autorenew: bool,
    /// Age after which generated files are stale.
    pub ttl: Duration,
    /// Maximum number of entries per sitemap file.
    pub max_items: usize,
    /// Include one entry per dataset resource.
    pub resources: bool,
    /// Emit `xhtml:link` language alternates.
    pub language_alternatives: bool,
    /// Extra URIs, absolute or relative to the site root.
    pub custom_uris: Vec<String>,
}

impl SitemapConfig {
    fn with_directory(directory: PathBuf) -> Self {
        Self {
            directory,
            autorenew: true,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_items: DEFAULT_MAX_ITEMS,
            resources: true,
            language_alternatives: true,
            custom_uris: Vec::new(),
        }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self::with_directory(PathBuf::from("public"))
    }
}

/// Catalog database configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL (e.g. `sqlite://catalog.db`).
    pub url: Option<String>,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Redirect the legacy `/sitemap.xml` path to the index.
    pub legacy_redirect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5050,
            legacy_redirect: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`database.url`").
        field: String,
        /// Error message (e.g., "${`CATALOG_DB`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sitemap.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. Validation runs
    /// last so that a CLI override can supply a value missing from the file.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(directory) = &settings.directory {
            self.sitemap_resolved.directory.clone_from(directory);
        }
        if let Some(site_url) = &settings.site_url {
            self.site.url.clone_from(site_url);
        }
        if let Some(database_url) = &settings.database_url {
            self.database.url = Some(database_url.clone());
        }
    }

    /// Get the database URL required by commands that read the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `database.url` is missing or empty.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        let url = self.database.url.as_deref().ok_or_else(|| {
            ConfigError::Validation("database.url required in config".into())
        })?;
        require_non_empty(url, "database.url")?;
        Ok(url)
    }

    /// Site URL without a trailing slash.
    #[must_use]
    pub fn site_root(&self) -> &str {
        self.site.url.trim_end_matches('/')
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            locales: LocalesConfig::default(),
            sitemap: SitemapConfigRaw::default(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            sitemap_resolved: SitemapConfig::with_directory(base.join("public")),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_sitemap()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.url, "site.url")?;
        require_http_url(&self.site.url, "site.url")?;
        require_non_empty(&self.site.package_type, "site.package_type")?;
        if self.site.package_type.contains('/') {
            return Err(ConfigError::Validation(
                "site.package_type cannot contain '/'".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_sitemap(&self) -> Result<(), ConfigError> {
        let sitemap = &self.sitemap_resolved;
        if sitemap.max_items == 0 {
            return Err(ConfigError::Validation(
                "sitemap.max_items must be greater than 0".to_owned(),
            ));
        }
        if sitemap.max_items > PROTOCOL_MAX_ITEMS {
            return Err(ConfigError::Validation(format!(
                "sitemap.max_items cannot exceed {PROTOCOL_MAX_ITEMS}"
            )));
        }
        if sitemap.ttl.is_zero() {
            return Err(ConfigError::Validation(
                "sitemap.ttl must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.url = expand::expand_env(&self.site.url, "site.url")?;
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        if let Some(ref url) = self.database.url {
            self.database.url = Some(expand::expand_env(url, "database.url")?);
        }
        Ok(())
    }

    /// Resolve raw sitemap values against defaults and the config directory.
    fn resolve(&mut self, config_dir: &Path) {
        let raw = &self.sitemap;
        let defaults = SitemapConfig::default();

        self.sitemap_resolved = SitemapConfig {
            directory: config_dir.join(raw.directory.as_deref().unwrap_or("public")),
            autorenew: raw.autorenew.unwrap_or(defaults.autorenew),
            ttl: raw.ttl.map_or(defaults.ttl, Duration::from_secs),
            max_items: raw.max_items.unwrap_or(defaults.max_items),
            resources: raw.resources.unwrap_or(defaults.resources),
            language_alternatives: raw
                .language_alternatives
                .unwrap_or(defaults.language_alternatives),
            custom_uris: raw
                .custom_uris
                .as_deref()
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
        };
    }
}
