//! Catalog record sources for the sitemap generator.
//!
//! This crate provides a [`PackageSource`] trait that abstracts over "all
//! publishable records" of the catalog: active, public, dataset-typed
//! packages together with their resources. The sitemap generator only ever
//! sees [`Package`] values, so it can be tested without a database.
//!
//! # Implementations
//!
//! - [`SqliteSource`]: reads CKAN-style `package` and `resource` tables via sqlx
//! - [`MockSource`]: in-memory source for tests (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use sitemap_source::{PackageSource, SqliteSource};
//!
//! let source = SqliteSource::connect("sqlite://catalog.db").await?;
//! for package in source.packages().await? {
//!     println!("{} ({} resources)", package.name, package.resources.len());
//! }
//! ```

#[cfg(feature = "mock")]
mod mock;
mod source;
mod sqlite;

#[cfg(feature = "mock")]
pub use mock::MockSource;
pub use source::{Package, PackageSource, Resource, SourceError, SourceErrorKind, SourceFuture};
pub use sqlite::SqliteSource;
