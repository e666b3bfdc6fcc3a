//! SQLite-backed package source.
//!
//! Reads the `package` and `resource` tables of a CKAN-style catalog
//! database. Timestamps are stored as text and parsed leniently, since
//! catalogs written by different tools disagree on the exact format.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::source::{Package, PackageSource, Resource, SourceError, SourceErrorKind, SourceFuture};

const BACKEND: &str = "Sqlite";

/// Publishable packages: dataset-typed, active, not private.
const PACKAGES_QUERY: &str = "\
    SELECT id, name, metadata_modified \
    FROM package \
    WHERE type = 'dataset' AND state = 'active' AND COALESCE(private, 0) = 0 \
    ORDER BY name";

/// Active resources of publishable packages, in display order.
const RESOURCES_QUERY: &str = "\
    SELECT r.id, r.package_id, r.created \
    FROM resource r \
    JOIN package p ON p.id = r.package_id \
    WHERE r.state = 'active' \
      AND p.type = 'dataset' AND p.state = 'active' AND COALESCE(p.private, 0) = 0 \
    ORDER BY r.package_id, r.position, r.id";

/// Timestamp layouts accepted besides RFC 3339.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Package source reading a catalog SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pool: SqlitePool,
}

impl SqliteSource {
    /// Open the database at `url` read-only.
    ///
    /// The database file must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`SourceErrorKind::Unavailable`] if the URL is malformed or the
    /// database cannot be opened.
    pub async fn connect(url: &str) -> Result<Self, SourceError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| unavailable(e).with_message(format!("invalid database URL '{url}'")))?
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| unavailable(e).with_message(format!("cannot open '{url}'")))?;

        tracing::debug!(url, "Connected to catalog database");
        Ok(Self { pool })
    }

    /// Wrap an existing connection pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_packages(&self) -> Result<Vec<Package>, SourceError> {
        let mut resources = self.fetch_resources().await?;

        let rows = sqlx::query(PACKAGES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        let mut packages = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id").map_err(query_error)?;
            let name: String = row.try_get("name").map_err(query_error)?;
            let modified: Option<String> = row.try_get("metadata_modified").map_err(query_error)?;
            let metadata_modified = require_timestamp(modified.as_deref(), || {
                format!("package '{name}' has unreadable metadata_modified")
            })?;

            packages.push(Package {
                resources: resources.remove(&id).unwrap_or_default(),
                id,
                name,
                metadata_modified,
            });
        }

        tracing::debug!(count = packages.len(), "Loaded packages");
        Ok(packages)
    }

    async fn fetch_resources(&self) -> Result<HashMap<String, Vec<Resource>>, SourceError> {
        let rows = sqlx::query(RESOURCES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        let mut by_package: HashMap<String, Vec<Resource>> = HashMap::new();
        for row in rows {
            let id: String = row.try_get("id").map_err(query_error)?;
            let package_id: String = row.try_get("package_id").map_err(query_error)?;
            let created: Option<String> = row.try_get("created").map_err(query_error)?;
            let created = require_timestamp(created.as_deref(), || {
                format!("resource '{id}' has unreadable created")
            })?;

            by_package
                .entry(package_id)
                .or_default()
                .push(Resource { id, created });
        }
        Ok(by_package)
    }
}

impl PackageSource for SqliteSource {
    fn packages(&self) -> SourceFuture<'_> {
        Box::pin(self.fetch_packages())
    }
}

fn unavailable(err: sqlx::Error) -> SourceError {
    SourceError::new(SourceErrorKind::Unavailable)
        .with_backend(BACKEND)
        .with_source(err)
}

fn query_error(err: sqlx::Error) -> SourceError {
    SourceError::new(SourceErrorKind::Query)
        .with_backend(BACKEND)
        .with_source(err)
}

fn require_timestamp(
    value: Option<&str>,
    describe: impl FnOnce() -> String,
) -> Result<NaiveDateTime, SourceError> {
    value.and_then(parse_timestamp).ok_or_else(|| {
        SourceError::new(SourceErrorKind::InvalidData)
            .with_backend(BACKEND)
            .with_message(describe())
    })
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 (converted to UTC), ISO 8601 without offset (with `T` or
/// a space separator, optional fractional seconds) and bare dates.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
