//! Fixed-size batching of URL entries into numbered sitemap files.

use crate::entry::UrlEntry;
use crate::error::SitemapError;
use crate::store::{SitemapStore, file_name};
use crate::writer::render_urlset;

/// Accumulates entries and writes them as `sitemap-<n>.xml` files of at most
/// `max_items` entries each.
///
/// A batch is flushed as soon as it holds `max_items` entries, and a fresh
/// batch is opened in its place. [`close`](Self::close) always flushes the
/// open batch, so when the total number of entries is an exact positive
/// multiple of `max_items` the last file is an empty `<urlset>`.
pub struct BatchWriter<'a> {
    store: &'a SitemapStore,
    max_items: usize,
    current: Vec<UrlEntry>,
    written: usize,
    entries: usize,
}

impl<'a> BatchWriter<'a> {
    /// Open the first batch.
    ///
    /// A `max_items` of 0 is treated as 1.
    #[must_use]
    pub fn open(store: &'a SitemapStore, max_items: usize) -> Self {
        let max_items = max_items.max(1);
        Self {
            store,
            max_items,
            current: Vec::with_capacity(max_items.min(1024)),
            written: 0,
            entries: 0,
        }
    }

    /// Add an entry, flushing the batch to disk once it is full.
    pub fn add(&mut self, entry: UrlEntry) -> Result<(), SitemapError> {
        self.current.push(entry);
        self.entries += 1;
        if self.current.len() == self.max_items {
            self.flush()?;
        }
        Ok(())
    }

    /// Number of entries added so far.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Flush the open batch and return the total number of files written.
    pub fn close(mut self) -> Result<usize, SitemapError> {
        self.flush()?;
        Ok(self.written)
    }

    fn flush(&mut self) -> Result<(), SitemapError> {
        let name = file_name(self.written);
        let xml = render_urlset(&self.current)
            .map_err(|e| SitemapError::io(self.store.dir().join(&name), e))?;
        self.store.write(&name, &xml)?;
        self.written += 1;
        self.current.clear();
        Ok(())
    }
}
