//! One JSON file per namespace in a directory every process can reach.

use super::{CacheEntry, CacheError, Clock, SnapshotCache, SystemClock};
use crate::snapshot::MetricSnapshot;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use url::form_urlencoded;

/// Directory name under the system temp dir when none is configured.
const DEFAULT_DIR_NAME: &str = "mariadb_snapshot";

/// File-backed [`SnapshotCache`].
///
/// Entries are replaced by writing a temporary file in the same directory and
/// renaming it over the old one, so a reader sees either the old or the new
/// entry. Concurrent writers race and the last rename wins.
#[derive(Debug)]
pub struct FileCache<C = SystemClock> {
    dir: PathBuf,
    clock: C,
}

impl FileCache<SystemClock> {
    /// Open (creating if needed) the cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Self::with_clock(dir, SystemClock)
    }

    /// `$TMPDIR/mariadb_snapshot`
    #[must_use]
    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join(DEFAULT_DIR_NAME)
    }
}

impl<C: Clock> FileCache<C> {
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the directory cannot be created.
    pub fn with_clock(dir: impl Into<PathBuf>, clock: C) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            CacheError::Unavailable(format!("failed to create {}: {e}", dir.display()))
        })?;

        Ok(Self { dir, clock })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `namespace`; the namespace is percent-encoded so
    /// any string maps to a single file inside the cache directory.
    #[must_use]
    pub fn entry_path(&self, namespace: &str) -> PathBuf {
        let encoded: String = form_urlencoded::byte_serialize(namespace.as_bytes()).collect();
        self.dir.join(format!("snapshot-{encoded}.json"))
    }

    fn read_entry(&self, path: &Path) -> Option<CacheEntry> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable snapshot cache entry");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt snapshot cache entry");
                None
            }
        }
    }
}

impl<C: Clock> SnapshotCache for FileCache<C> {
    fn get(&self, namespace: &str) -> Result<Option<MetricSnapshot>, CacheError> {
        if !self.dir.is_dir() {
            return Err(CacheError::Unavailable(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }

        let Some(entry) = self.read_entry(&self.entry_path(namespace)) else {
            return Ok(None);
        };

        if entry.namespace != namespace {
            debug!(namespace, found = %entry.namespace, "cache entry belongs to another namespace");
            return Ok(None);
        }

        if !entry.is_live(self.clock.now()) {
            debug!(namespace, created_at = %entry.created_at, "cache entry expired");
            return Ok(None);
        }

        Ok(Some(entry.payload))
    }

    fn put(
        &self,
        namespace: &str,
        snapshot: &MetricSnapshot,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry::new(namespace, snapshot.clone(), self.clock.now(), ttl_seconds);
        let json = serde_json::to_vec(&entry)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;

        let path = self.entry_path(namespace);
        tmp.persist(&path).map_err(|e| CacheError::Io(e.error))?;

        debug!(namespace, path = %path.display(), "stored snapshot");
        Ok(())
    }
}
