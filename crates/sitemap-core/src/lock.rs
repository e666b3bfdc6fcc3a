//! Per-directory regeneration lock.
//!
//! Every [`Sitemaps`](crate::Sitemaps) writing to the same output directory
//! shares one async mutex, so only one generation pass per directory runs at
//! a time within the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

type DirectoryLock = Arc<tokio::sync::Mutex<()>>;

static LOCKS: LazyLock<Mutex<HashMap<PathBuf, DirectoryLock>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Get the lock guarding regeneration of `dir`.
///
/// Relative paths are made absolute against the current directory so that
/// two spellings of the same directory share a lock.
pub(crate) fn directory_lock(dir: &Path) -> DirectoryLock {
    let key = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
    let mut locks = LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}
