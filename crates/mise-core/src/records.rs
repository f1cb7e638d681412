use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalog entry, keyed by normalized barcode.
///
/// Serde names mirror the catalog file headers so a local hit serializes as
/// the row the catalog carries, including the spaced `cod de barra` key.
/// Prices and weights are passed through as the raw catalog text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "cod de barra")]
    pub codigo: String,
    #[serde(rename = "produto")]
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grupo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgrupo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unidade: Option<String>,
    #[serde(default, rename = "peso bruto", skip_serializing_if = "Option::is_none")]
    pub peso_bruto: Option<String>,
    #[serde(default, rename = "peso liquido", skip_serializing_if = "Option::is_none")]
    pub peso_liquido: Option<String>,
    #[serde(default, rename = "preco medio", skip_serializing_if = "Option::is_none")]
    pub preco_medio: Option<String>,
    #[serde(default, rename = "unidade medida", skip_serializing_if = "Option::is_none")]
    pub unidade_medida: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonte: Option<String>,
}

impl ProductRecord {
    /// Minimal record with only the key and display name set.
    #[must_use]
    pub fn new(codigo: impl Into<String>, nome: impl Into<String>) -> Self {
        Self {
            codigo: codigo.into(),
            nome: nome.into(),
            marca: None,
            categoria: None,
            grupo: None,
            subgrupo: None,
            unidade: None,
            peso_bruto: None,
            peso_liquido: None,
            preco_medio: None,
            unidade_medida: None,
            fonte: None,
        }
    }
}

/// The common shape every external source adapter resolves into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineProduct {
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    pub fonte: String,
}

/// A barcode previously resolved through an external source and persisted
/// for reuse. At most one entry exists per codigo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResolution {
    pub codigo: String,
    pub nome: String,
    pub fonte: String,
    pub consultado_em: DateTime<Utc>,
}

/// Inventory row keyed by barcode; repeated submissions accumulate
/// `quantidade`. `atualizado_em` keeps the client-supplied timestamp text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub codigo: String,
    pub produto: String,
    pub quantidade: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peso: Option<String>,
    pub atualizado_em: String,
}

/// One name-search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub codigo: String,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
}

/// Where a resolved photo lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSource {
    Local,
    Remote,
}

/// A resolved product photo. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub source: PhotoSource,
    pub url: String,
    pub filename: String,
}
