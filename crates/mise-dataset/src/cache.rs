//! JSON-file resolution cache.

use std::path::PathBuf;

use mise_core::CachedResolution;
use tokio::sync::Mutex;

use crate::DatasetError;

/// Append-only JSON array of externally-resolved barcodes.
///
/// The file is read on every lookup (it stays small: one entry per code
/// ever resolved online) and rewritten whole on insert. The mutex
/// serializes writers within this process; concurrent processes racing the
/// read-check-write are a known gap inherited from the original storage
/// layout.
pub struct JsonCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonCache {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Exact-code lookup. A missing or corrupt file reads as empty.
    pub async fn lookup(&self, codigo: &str) -> Option<CachedResolution> {
        self.read_all()
            .await
            .into_iter()
            .find(|entry| entry.codigo == codigo)
    }

    /// Appends an entry unless its codigo is already present.
    ///
    /// Idempotent: the first writer wins and later calls are silent
    /// no-ops. Returns whether the entry was written.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the rewritten file cannot be
    /// persisted.
    pub async fn insert_if_absent(&self, entry: CachedResolution) -> Result<bool, DatasetError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_all().await;
        if entries.iter().any(|existing| existing.codigo == entry.codigo) {
            return Ok(false);
        }
        entries.push(entry);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, serialized).await?;
        Ok(true)
    }

    /// Number of cached resolutions.
    pub async fn count(&self) -> usize {
        self.read_all().await.len()
    }

    async fn read_all(&self) -> Vec<CachedResolution> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache file unreadable; treating as empty");
                Vec::new()
            }
        }
    }
}
