//! The backing-store seam the orchestrator talks to.
//!
//! One `Storage` value is built at startup: the relational catalog when the
//! SQLite file is present and openable, the file-backed stores otherwise.
//! Every method degrades a collaborator failure to "this tier yielded
//! nothing" after logging it; no store error crosses the seam.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use mise_core::{
    AppConfig, CachedResolution, InventoryRecord, OnlineProduct, ProductRecord, SearchHit,
};
use mise_dataset::{DatasetReader, InventoryFile, JsonCache};
use sqlx::SqlitePool;

const SEARCH_LIMIT: i64 = 10;

pub enum Storage {
    Relational {
        pool: SqlitePool,
        database_path: PathBuf,
    },
    Files {
        reader: DatasetReader,
        cache: JsonCache,
        inventory: InventoryFile,
        catalog_csv: PathBuf,
        catalog_xlsx: PathBuf,
        cache_path: PathBuf,
    },
}

/// Picks the backing store for this process.
///
/// The relational catalog wins when its file exists and opens; a corrupt
/// database degrades to the file-backed stores with a logged error rather
/// than failing startup.
pub async fn init_storage(config: &AppConfig) -> Storage {
    if config.database_path.exists() {
        match open_relational(config).await {
            Ok(storage) => {
                tracing::info!(path = %config.database_path.display(), "using relational catalog");
                return storage;
            }
            Err(e) => {
                tracing::error!(
                    path = %config.database_path.display(),
                    error = %e,
                    "relational catalog unusable; falling back to file-backed stores"
                );
            }
        }
    }

    tracing::info!(
        csv = %config.catalog_csv.display(),
        xlsx = %config.catalog_xlsx.display(),
        "using file-backed stores"
    );
    Storage::Files {
        reader: DatasetReader::new(
            config.catalog_csv.clone(),
            config.catalog_xlsx.clone(),
            Duration::from_secs(config.dataset_ttl_secs),
        ),
        cache: JsonCache::new(config.cache_path.clone()),
        inventory: InventoryFile::new(config.inventory_path.clone()),
        catalog_csv: config.catalog_csv.clone(),
        catalog_xlsx: config.catalog_xlsx.clone(),
        cache_path: config.cache_path.clone(),
    }
}

async fn open_relational(config: &AppConfig) -> Result<Storage, mise_db::DbError> {
    let pool = mise_db::connect_pool(&config.database_path).await?;
    mise_db::run_migrations(&pool).await?;
    mise_db::ping(&pool).await?;
    Ok(Storage::Relational {
        pool,
        database_path: config.database_path.clone(),
    })
}

impl Storage {
    /// Tier 1: the local catalog.
    ///
    /// Relational mode re-queries the database on every call, so a
    /// write-back is visible immediately; file mode serves the TTL index.
    pub async fn find_local(&self, codigo: &str) -> Option<ProductRecord> {
        match self {
            Storage::Relational { pool, .. } => match mise_db::find_produto(pool, codigo).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(codigo, error = %e, "catalog query failed");
                    None
                }
            },
            Storage::Files { reader, .. } => reader.lookup(codigo).await,
        }
    }

    /// Tier 2: the resolution cache.
    pub async fn find_cached(&self, codigo: &str) -> Option<CachedResolution> {
        match self {
            Storage::Relational { pool, .. } => {
                match mise_db::find_produto_online(pool, codigo).await {
                    Ok(found) => found,
                    Err(e) => {
                        tracing::warn!(codigo, error = %e, "resolution cache query failed");
                        None
                    }
                }
            }
            Storage::Files { cache, .. } => cache.lookup(codigo).await,
        }
    }

    /// Write-back after an external hit. Idempotent per codigo; failures
    /// are logged and swallowed so the response is never blocked on
    /// persistence.
    ///
    /// Relational mode additionally appends the product to the durable
    /// catalog, so the next lookup for the code is served by tier 1. The
    /// absent-check and the insert are not serialized across requests;
    /// the conflict clause keeps the race harmless within one database.
    pub async fn cache_resolution(&self, codigo: &str, product: &OnlineProduct) {
        let entry = CachedResolution {
            codigo: codigo.to_string(),
            nome: product.nome.clone(),
            fonte: product.fonte.clone(),
            consultado_em: Utc::now(),
        };

        let written = match self {
            Storage::Relational { pool, .. } => {
                let written = mise_db::insert_produto_online_if_absent(pool, &entry)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(codigo, error = %e, "resolution cache write-back failed");
                        false
                    });

                let mut record = ProductRecord::new(codigo, product.nome.clone());
                record.marca = product.marca.clone();
                record.categoria = product.categoria.clone();
                record.fonte = Some(product.fonte.clone());
                if let Err(e) = mise_db::insert_produto_if_absent(pool, &record).await {
                    tracing::warn!(codigo, error = %e, "durable catalog write-back failed");
                }

                written
            }
            Storage::Files { cache, .. } => {
                cache.insert_if_absent(entry).await.unwrap_or_else(|e| {
                    tracing::warn!(codigo, error = %e, "resolution cache write-back failed");
                    false
                })
            }
        };

        if written {
            tracing::info!(codigo, fonte = %product.fonte, "resolution cached for reuse");
        }
    }

    /// Case-insensitive substring search over names, capped at 10 results.
    pub async fn search_by_name(&self, termo: &str) -> Vec<SearchHit> {
        match self {
            Storage::Relational { pool, .. } => {
                mise_db::search_produtos_by_name(pool, termo, SEARCH_LIMIT)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(termo, error = %e, "name search failed");
                        Vec::new()
                    })
            }
            Storage::Files { reader, .. } => {
                let limit = usize::try_from(SEARCH_LIMIT).unwrap_or(10);
                reader.search(termo, limit).await
            }
        }
    }

    /// Upserts an inventory row, accumulating `quantidade`.
    pub async fn upsert_inventory(
        &self,
        codigo: &str,
        produto: &str,
        quantidade: i64,
        peso: Option<&str>,
        atualizado_em: &str,
    ) -> Option<InventoryRecord> {
        let result = match self {
            Storage::Relational { pool, .. } => {
                mise_db::upsert_inventario(pool, codigo, produto, quantidade, peso, atualizado_em)
                    .await
                    .map_err(|e| e.to_string())
            }
            Storage::Files { inventory, .. } => inventory
                .upsert(codigo, produto, quantidade, peso, atualizado_em)
                .await
                .map_err(|e| e.to_string()),
        };

        match result {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(codigo, error = %e, "inventory upsert failed");
                None
            }
        }
    }

    /// `(local, online)` record counts for the stats endpoint.
    pub async fn stats(&self) -> (i64, i64) {
        match self {
            Storage::Relational { pool, .. } => {
                let locais = mise_db::count_produtos(pool).await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "catalog count failed");
                    0
                });
                let online = mise_db::count_produtos_online(pool)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "cache count failed");
                        0
                    });
                (locais, online)
            }
            Storage::Files { reader, cache, .. } => {
                let locais = i64::try_from(reader.count().await).unwrap_or(i64::MAX);
                let online = i64::try_from(cache.count().await).unwrap_or(i64::MAX);
                (locais, online)
            }
        }
    }

    /// Files worth mirroring to the remote folder, existing or not.
    pub fn durable_paths(&self) -> Vec<PathBuf> {
        match self {
            Storage::Relational { database_path, .. } => vec![database_path.clone()],
            Storage::Files {
                catalog_csv,
                catalog_xlsx,
                cache_path,
                ..
            } => vec![catalog_csv.clone(), catalog_xlsx.clone(), cache_path.clone()],
        }
    }
}
