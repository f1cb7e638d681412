//! JSON-file inventory store.

use std::path::PathBuf;

use mise_core::InventoryRecord;
use tokio::sync::Mutex;

use crate::DatasetError;

/// Inventory records in a JSON array file, one row per barcode.
pub struct InventoryFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl InventoryFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Adds `quantidade` to the row for `codigo`, creating it when absent.
    ///
    /// Name, weight, and timestamp are replaced by the latest submission;
    /// only the quantity accumulates.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the rewritten file cannot be
    /// persisted.
    pub async fn upsert(
        &self,
        codigo: &str,
        produto: &str,
        quantidade: i64,
        peso: Option<&str>,
        atualizado_em: &str,
    ) -> Result<InventoryRecord, DatasetError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_all().await;
        let updated = match records.iter_mut().find(|r| r.codigo == codigo) {
            Some(existing) => {
                existing.quantidade += quantidade;
                existing.produto = produto.to_string();
                existing.peso = peso.map(str::to_string);
                existing.atualizado_em = atualizado_em.to_string();
                existing.clone()
            }
            None => {
                let record = InventoryRecord {
                    codigo: codigo.to_string(),
                    produto: produto.to_string(),
                    quantidade,
                    peso: peso.map(str::to_string),
                    atualizado_em: atualizado_em.to_string(),
                };
                records.push(record.clone());
                record
            }
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(&self.path, serialized).await?;
        Ok(updated)
    }

    async fn read_all(&self) -> Vec<InventoryRecord> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "inventory file unreadable; treating as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_creates_then_accumulates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = InventoryFile::new(dir.path().join("inventario.json"));

        let first = inventory
            .upsert("7891234567890", "Arroz", 2, Some("5kg"), "2026-08-01T10:00:00Z")
            .await
            .expect("first upsert");
        assert_eq!(first.quantidade, 2);

        let second = inventory
            .upsert("7891234567890", "Arroz", 3, None, "2026-08-01T11:00:00Z")
            .await
            .expect("second upsert");
        assert_eq!(second.quantidade, 5);
        assert_eq!(second.atualizado_em, "2026-08-01T11:00:00Z");
        assert!(second.peso.is_none(), "latest submission replaces weight");

        assert_eq!(inventory.read_all().await.len(), 1);
    }

    #[tokio::test]
    async fn distinct_codes_get_distinct_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = InventoryFile::new(dir.path().join("inventario.json"));

        inventory
            .upsert("11111111", "Arroz", 1, None, "2026-08-01T10:00:00Z")
            .await
            .expect("upsert");
        inventory
            .upsert("22222222", "Feijao", 1, None, "2026-08-01T10:00:00Z")
            .await
            .expect("upsert");

        assert_eq!(inventory.read_all().await.len(), 2);
    }
}
