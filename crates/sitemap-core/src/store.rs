//! On-disk storage of generated sitemap files.
//!
//! Files are written to a temporary file in the output directory and renamed
//! into place, so a concurrent reader sees either the previous or the new
//! content of a file, never a partial one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::SitemapError;

/// File name of the sitemap index.
pub const INDEX_FILE_NAME: &str = "sitemap_index.xml";

const FILE_PREFIX: &str = "sitemap-";
const FILE_SUFFIX: &str = ".xml";

/// File name of the numbered sitemap file `index`.
#[must_use]
pub fn file_name(index: usize) -> String {
    format!("{FILE_PREFIX}{index}{FILE_SUFFIX}")
}

/// Parse a numbered sitemap file name back into its index.
///
/// Only canonical names match: `sitemap-0.xml`, `sitemap-12.xml`. Leading
/// zeros, signs and empty numbers are rejected.
#[must_use]
pub fn parse_file_name(name: &str) -> Option<usize> {
    let digits = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse().ok()
}

/// Directory holding the index and numbered sitemap files.
#[derive(Debug, Clone)]
pub struct SitemapStore {
    dir: PathBuf,
}

impl SitemapStore {
    /// Create a store rooted at `dir`. Nothing is touched on disk.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the index file.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE_NAME)
    }

    /// Create the output directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<(), SitemapError> {
        fs::create_dir_all(&self.dir).map_err(|e| SitemapError::io(&self.dir, e))
    }

    /// Atomically replace the file `name` with `content`.
    pub fn write(&self, name: &str, content: &[u8]) -> Result<(), SitemapError> {
        let path = self.dir.join(name);
        let mut tmp = self.temp_file().map_err(|e| SitemapError::io(&self.dir, e))?;
        tmp.write_all(content)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| SitemapError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| SitemapError::io(&path, e.error))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote sitemap file");
        Ok(())
    }

    /// Read the file `name`, or `None` if it does not exist.
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SitemapError> {
        let path = self.dir.join(name);
        match fs::read(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SitemapError::io(path, e)),
        }
    }

    /// Indices of the numbered files present on disk, sorted ascending.
    ///
    /// A missing output directory yields an empty list.
    pub fn numbered_files(&self) -> Result<Vec<usize>, SitemapError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SitemapError::io(&self.dir, e)),
        };

        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SitemapError::io(&self.dir, e))?;
            if let Some(index) = entry.file_name().to_str().and_then(parse_file_name) {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Remove the index file. A missing index is not an error.
    pub fn remove_index(&self) -> Result<(), SitemapError> {
        let path = self.index_path();
        tracing::info!(path = %path.display(), "Removing sitemap index file");
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SitemapError::io(path, e)),
        }
    }

    /// Remove numbered files with an index of `count` or above.
    ///
    /// Returns the number of files removed.
    pub fn prune_from(&self, count: usize) -> Result<usize, SitemapError> {
        let mut removed = 0;
        for index in self.numbered_files()?.into_iter().filter(|&i| i >= count) {
            let path = self.dir.join(file_name(index));
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(SitemapError::io(path, e)),
            }
        }
        if removed > 0 {
            tracing::info!(removed, "Removed sitemap files from a previous, larger pass");
        }
        Ok(removed)
    }

    fn temp_file(&self) -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".sitemap-").suffix(".tmp");
        // Generated files are public; temp files default to owner-only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o644));
        }
        builder.tempfile_in(&self.dir)
    }
}
