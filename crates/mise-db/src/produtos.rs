//! Database operations for `produtos` and `produtos_online`.

use chrono::{DateTime, Utc};
use mise_core::{CachedResolution, ProductRecord, SearchHit};
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `produtos` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProdutoRow {
    pub codigo: String,
    pub produto: String,
    pub marca: Option<String>,
    pub categoria: Option<String>,
    pub grupo: Option<String>,
    pub subgrupo: Option<String>,
    pub unidade: Option<String>,
    pub peso_bruto: Option<String>,
    pub peso_liquido: Option<String>,
    pub preco_medio: Option<String>,
    pub unidade_medida: Option<String>,
    pub fonte: String,
}

impl From<ProdutoRow> for ProductRecord {
    fn from(row: ProdutoRow) -> Self {
        ProductRecord {
            codigo: row.codigo,
            nome: row.produto,
            marca: row.marca,
            categoria: row.categoria,
            grupo: row.grupo,
            subgrupo: row.subgrupo,
            unidade: row.unidade,
            peso_bruto: row.peso_bruto,
            peso_liquido: row.peso_liquido,
            preco_medio: row.preco_medio,
            unidade_medida: row.unidade_medida,
            fonte: Some(row.fonte),
        }
    }
}

/// A row from the `produtos_online` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProdutoOnlineRow {
    pub codigo: String,
    pub nome: String,
    pub fonte: String,
    pub consultado_em: DateTime<Utc>,
}

impl From<ProdutoOnlineRow> for CachedResolution {
    fn from(row: ProdutoOnlineRow) -> Self {
        CachedResolution {
            codigo: row.codigo,
            nome: row.nome,
            fonte: row.fonte,
            consultado_em: row.consultado_em,
        }
    }
}

const PRODUTO_COLUMNS: &str = "codigo, produto, marca, categoria, grupo, subgrupo, unidade, \
     peso_bruto, peso_liquido, preco_medio, unidade_medida, fonte";

/// Looks up a catalog row by normalized barcode.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_produto(
    pool: &SqlitePool,
    codigo: &str,
) -> Result<Option<ProductRecord>, DbError> {
    let row = sqlx::query_as::<_, ProdutoRow>(&format!(
        "SELECT {PRODUTO_COLUMNS} FROM produtos WHERE codigo = ?"
    ))
    .bind(codigo)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ProductRecord::from))
}

/// Inserts a catalog row unless its codigo is already present.
///
/// Returns whether a row was written; a conflicting codigo is a silent no-op
/// (first writer wins).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_produto_if_absent(
    pool: &SqlitePool,
    record: &ProductRecord,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO produtos \
             (codigo, produto, marca, categoria, grupo, subgrupo, unidade, \
              peso_bruto, peso_liquido, preco_medio, unidade_medida, fonte) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (codigo) DO NOTHING",
    )
    .bind(&record.codigo)
    .bind(&record.nome)
    .bind(&record.marca)
    .bind(&record.categoria)
    .bind(&record.grupo)
    .bind(&record.subgrupo)
    .bind(&record.unidade)
    .bind(&record.peso_bruto)
    .bind(&record.peso_liquido)
    .bind(&record.preco_medio)
    .bind(&record.unidade_medida)
    .bind(record.fonte.as_deref().unwrap_or("local"))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Looks up a resolution-cache row by normalized barcode.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_produto_online(
    pool: &SqlitePool,
    codigo: &str,
) -> Result<Option<CachedResolution>, DbError> {
    let row = sqlx::query_as::<_, ProdutoOnlineRow>(
        "SELECT codigo, nome, fonte, consultado_em FROM produtos_online WHERE codigo = ?",
    )
    .bind(codigo)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(CachedResolution::from))
}

/// Records an externally-resolved barcode for reuse. Idempotent: a codigo
/// already present leaves the existing row untouched.
///
/// Returns whether a row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_produto_online_if_absent(
    pool: &SqlitePool,
    entry: &CachedResolution,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO produtos_online (codigo, nome, fonte, consultado_em) \
         VALUES (?, ?, ?, ?) \
         ON CONFLICT (codigo) DO NOTHING",
    )
    .bind(&entry.codigo)
    .bind(&entry.nome)
    .bind(&entry.fonte)
    .bind(entry.consultado_em)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Case-insensitive substring search over catalog and cached online names.
///
/// Catalog rows come first; cache rows fill any remaining slots up to
/// `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn search_produtos_by_name(
    pool: &SqlitePool,
    termo: &str,
    limit: i64,
) -> Result<Vec<SearchHit>, DbError> {
    let mut hits: Vec<SearchHit> = sqlx::query_as::<_, ProdutoRow>(&format!(
        "SELECT {PRODUTO_COLUMNS} FROM produtos \
         WHERE lower(produto) LIKE '%' || lower(?) || '%' \
         ORDER BY produto LIMIT ?"
    ))
    .bind(termo)
    .bind(limit)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| SearchHit {
        codigo: row.codigo,
        nome: row.produto,
        marca: row.marca,
        categoria: row.categoria,
    })
    .collect();

    let remaining = limit - i64::try_from(hits.len()).unwrap_or(limit);
    if remaining > 0 {
        let online = sqlx::query_as::<_, ProdutoOnlineRow>(
            "SELECT codigo, nome, fonte, consultado_em FROM produtos_online \
             WHERE lower(nome) LIKE '%' || lower(?) || '%' \
             ORDER BY nome LIMIT ?",
        )
        .bind(termo)
        .bind(remaining)
        .fetch_all(pool)
        .await?;

        hits.extend(online.into_iter().map(|row| SearchHit {
            codigo: row.codigo,
            nome: row.nome,
            marca: None,
            categoria: None,
        }));
    }

    Ok(hits)
}

/// Number of rows in the local catalog.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_produtos(pool: &SqlitePool) -> Result<i64, DbError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM produtos")
        .fetch_one(pool)
        .await?)
}

/// Number of rows in the resolution cache.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_produtos_online(pool: &SqlitePool) -> Result<i64, DbError> {
    Ok(
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM produtos_online")
            .fetch_one(pool)
            .await?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_memory_pool, run_migrations};
    use chrono::Utc;

    async fn test_pool() -> SqlitePool {
        let pool = connect_memory_pool().await.expect("open memory pool");
        run_migrations(&pool).await.expect("run migrations");
        pool
    }

    fn entry(codigo: &str, nome: &str) -> CachedResolution {
        CachedResolution {
            codigo: codigo.to_string(),
            nome: nome.to_string(),
            fonte: "openfoodfacts".to_string(),
            consultado_em: Utc::now(),
        }
    }

    #[tokio::test]
    async fn find_produto_misses_on_empty_catalog() {
        let pool = test_pool().await;
        let found = find_produto(&pool, "7891234567890").await.expect("query");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn insert_and_find_produto_round_trip() {
        let pool = test_pool().await;
        let mut record = ProductRecord::new("7891234567890", "Arroz Tipo 1");
        record.marca = Some("Tio Jorge".to_string());

        assert!(insert_produto_if_absent(&pool, &record).await.expect("insert"));

        let found = find_produto(&pool, "7891234567890")
            .await
            .expect("query")
            .expect("row present");
        assert_eq!(found.nome, "Arroz Tipo 1");
        assert_eq!(found.marca.as_deref(), Some("Tio Jorge"));
        assert_eq!(found.fonte.as_deref(), Some("local"));
    }

    #[tokio::test]
    async fn insert_produto_is_idempotent_per_codigo() {
        let pool = test_pool().await;
        let first = ProductRecord::new("7891234567890", "Arroz Tipo 1");
        let second = ProductRecord::new("7891234567890", "Arroz Renomeado");

        assert!(insert_produto_if_absent(&pool, &first).await.expect("insert"));
        assert!(!insert_produto_if_absent(&pool, &second).await.expect("insert"));

        let found = find_produto(&pool, "7891234567890")
            .await
            .expect("query")
            .expect("row present");
        assert_eq!(found.nome, "Arroz Tipo 1", "first writer wins");
        assert_eq!(count_produtos(&pool).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn insert_produto_online_is_idempotent() {
        let pool = test_pool().await;

        assert!(insert_produto_online_if_absent(&pool, &entry("123", "Leite"))
            .await
            .expect("insert"));
        assert!(!insert_produto_online_if_absent(&pool, &entry("123", "Outro"))
            .await
            .expect("insert"));

        assert_eq!(count_produtos_online(&pool).await.expect("count"), 1);
        let cached = find_produto_online(&pool, "123")
            .await
            .expect("query")
            .expect("row present");
        assert_eq!(cached.nome, "Leite");
    }

    #[tokio::test]
    async fn search_matches_substring_case_insensitively() {
        let pool = test_pool().await;
        insert_produto_if_absent(&pool, &ProductRecord::new("11111111", "Arroz Tipo 1"))
            .await
            .expect("insert");
        insert_produto_if_absent(&pool, &ProductRecord::new("22222222", "Feijao Preto"))
            .await
            .expect("insert");
        insert_produto_online_if_absent(&pool, &entry("33333333", "Arroz Integral"))
            .await
            .expect("insert");

        let hits = search_produtos_by_name(&pool, "ARROZ", 10).await.expect("search");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].nome, "Arroz Tipo 1");
        assert_eq!(hits[1].nome, "Arroz Integral");
    }

    #[tokio::test]
    async fn search_caps_results_at_limit() {
        let pool = test_pool().await;
        for i in 0..15 {
            let record = ProductRecord::new(format!("900000000{i:02}"), format!("Suco {i}"));
            insert_produto_if_absent(&pool, &record).await.expect("insert");
        }

        let hits = search_produtos_by_name(&pool, "suco", 10).await.expect("search");
        assert_eq!(hits.len(), 10);
    }
}
