//! Database operations for the `inventario` table.

use mise_core::InventoryRecord;
use sqlx::SqlitePool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct InventarioRow {
    codigo: String,
    produto: String,
    quantidade: i64,
    peso: Option<String>,
    atualizado_em: String,
}

/// Upserts an inventory row.
///
/// A conflicting codigo increments `quantidade` and replaces the name,
/// weight, and timestamp; repeated submissions never duplicate rows.
///
/// Returns the row as stored after the upsert.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_inventario(
    pool: &SqlitePool,
    codigo: &str,
    produto: &str,
    quantidade: i64,
    peso: Option<&str>,
    atualizado_em: &str,
) -> Result<InventoryRecord, DbError> {
    let row = sqlx::query_as::<_, InventarioRow>(
        "INSERT INTO inventario (codigo, produto, quantidade, peso, atualizado_em) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT (codigo) DO UPDATE SET \
             produto       = excluded.produto, \
             quantidade    = inventario.quantidade + excluded.quantidade, \
             peso          = excluded.peso, \
             atualizado_em = excluded.atualizado_em \
         RETURNING codigo, produto, quantidade, peso, atualizado_em",
    )
    .bind(codigo)
    .bind(produto)
    .bind(quantidade)
    .bind(peso)
    .bind(atualizado_em)
    .fetch_one(pool)
    .await?;

    Ok(InventoryRecord {
        codigo: row.codigo,
        produto: row.produto,
        quantidade: row.quantidade,
        peso: row.peso,
        atualizado_em: row.atualizado_em,
    })
}
