//! In-memory catalog index with a time-to-live.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mise_core::{ProductRecord, SearchHit};
use tokio::sync::RwLock;

use crate::catalog::read_catalog;

struct IndexState {
    index: Arc<HashMap<String, ProductRecord>>,
    loaded_at: Option<Instant>,
}

/// Catalog reader owning its own staleness clock.
///
/// The index maps normalized barcode to record and is rebuilt lazily once
/// it is older than the TTL. Write-backs do not invalidate it; a freshly
/// cached online product is served from the resolution-cache tier until
/// the TTL lapses.
pub struct DatasetReader {
    csv_path: PathBuf,
    xlsx_path: PathBuf,
    ttl: Duration,
    state: RwLock<IndexState>,
}

impl DatasetReader {
    #[must_use]
    pub fn new(csv_path: PathBuf, xlsx_path: PathBuf, ttl: Duration) -> Self {
        Self {
            csv_path,
            xlsx_path,
            ttl,
            state: RwLock::new(IndexState {
                index: Arc::new(HashMap::new()),
                loaded_at: None,
            }),
        }
    }

    /// Returns the current index, reloading it when stale.
    ///
    /// The backing file is re-picked on every reload (delimited text
    /// preferred over the spreadsheet), so a catalog dropped in after
    /// startup is found at the next refresh. A missing or unreadable file
    /// yields an empty index, never an error.
    pub async fn index(&self) -> Arc<HashMap<String, ProductRecord>> {
        {
            let state = self.state.read().await;
            if let Some(loaded_at) = state.loaded_at {
                if loaded_at.elapsed() < self.ttl {
                    return Arc::clone(&state.index);
                }
            }
        }

        let mut state = self.state.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(loaded_at) = state.loaded_at {
            if loaded_at.elapsed() < self.ttl {
                return Arc::clone(&state.index);
            }
        }

        let path = if self.csv_path.exists() {
            self.csv_path.clone()
        } else {
            self.xlsx_path.clone()
        };

        let loaded = tokio::task::spawn_blocking(move || read_catalog(&path)).await;
        let records = match loaded {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "catalog load failed; serving empty index");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "catalog load task panicked; serving empty index");
                Vec::new()
            }
        };

        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            index.insert(record.codigo.clone(), record);
        }
        tracing::debug!(count = index.len(), "catalog index refreshed");

        state.index = Arc::new(index);
        state.loaded_at = Some(Instant::now());
        Arc::clone(&state.index)
    }

    /// Index lookup by normalized code.
    pub async fn lookup(&self, codigo: &str) -> Option<ProductRecord> {
        self.index().await.get(codigo).cloned()
    }

    /// Case-insensitive substring search over product names.
    pub async fn search(&self, termo: &str, limit: usize) -> Vec<SearchHit> {
        let termo = termo.to_lowercase();
        let index = self.index().await;
        let mut hits: Vec<SearchHit> = index
            .values()
            .filter(|record| record.nome.to_lowercase().contains(&termo))
            .map(|record| SearchHit {
                codigo: record.codigo.clone(),
                nome: record.nome.clone(),
                marca: record.marca.clone(),
                categoria: record.categoria.clone(),
            })
            .collect();
        hits.sort_by(|a, b| a.nome.cmp(&b.nome));
        hits.truncate(limit);
        hits
    }

    /// Number of records currently indexed.
    pub async fn count(&self) -> usize {
        self.index().await.len()
    }
}
