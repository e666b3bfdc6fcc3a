//! Time-to-live controller for generated sitemaps.
//!
//! Freshness is judged from the index file alone: the index is written last
//! in every pass, so its modification time is the time of the last complete
//! generation.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::error::SitemapError;

/// State of the on-disk sitemaps relative to the TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No index file.
    Missing,
    /// Index exists and is younger than the TTL.
    Fresh,
    /// Index exists and its age is at least the TTL.
    Stale,
}

impl CacheState {
    /// Inspect the index file at `index_path` at time `now`.
    pub fn of(index_path: &Path, ttl: Duration, now: SystemTime) -> Result<Self, SitemapError> {
        let modified = match fs::metadata(index_path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::Missing),
            Err(e) => return Err(SitemapError::io(index_path, e)),
        };
        Ok(Self::classify(modified, ttl, now))
    }

    /// Classify a file modified at `modified`.
    ///
    /// The boundary is inclusive: an age of exactly `ttl` is stale. A
    /// modification time in the future counts as fresh.
    #[must_use]
    pub fn classify(modified: SystemTime, ttl: Duration, now: SystemTime) -> Self {
        match now.duration_since(modified) {
            Ok(age) if age >= ttl => Self::Stale,
            _ => Self::Fresh,
        }
    }

    /// Whether a generation pass must run before serving.
    ///
    /// Missing output is always generated. Stale output is only regenerated
    /// with `autorenew`; otherwise it is served until regenerated externally.
    #[must_use]
    pub fn needs_regeneration(self, autorenew: bool) -> bool {
        match self {
            Self::Missing => true,
            Self::Stale => autorenew,
            Self::Fresh => false,
        }
    }
}
