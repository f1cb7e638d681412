//! Adapter for the Open Food Facts family of databases.
//!
//! Open Food Facts, Open Beauty Facts, and Open Pet Food Facts share the
//! same wire shape; only the base URL and source tag differ.

use mise_core::OnlineProduct;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::SourceError;

#[derive(Debug, Deserialize)]
struct OffResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    product: Option<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct OffProduct {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    categories: Option<String>,
}

/// Looks a barcode up in one Open-Facts-family database.
///
/// `status != 1`, a missing product object, an empty name, and HTTP 404 all
/// mean "not found".
///
/// # Errors
///
/// - [`SourceError::Http`] on network failure.
/// - [`SourceError::UnexpectedStatus`] on a non-2xx, non-404 status.
/// - [`SourceError::Deserialize`] if the body is not the expected JSON.
pub(crate) async fn lookup(
    client: &Client,
    base_url: &str,
    code: &str,
    fonte: &str,
) -> Result<Option<OnlineProduct>, SourceError> {
    let url = format!("{base_url}/api/v0/product/{code}.json");
    let response = client.get(&url).send().await?;

    match response.status() {
        StatusCode::NOT_FOUND => return Ok(None),
        status if !status.is_success() => return Err(SourceError::UnexpectedStatus(status)),
        _ => {}
    }

    let body = response.text().await?;
    let parsed: OffResponse =
        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: format!("{fonte}(code={code})"),
            source: e,
        })?;

    if parsed.status != 1 {
        return Ok(None);
    }
    let Some(product) = parsed.product else {
        return Ok(None);
    };
    let Some(nome) = product.product_name.filter(|name| !name.trim().is_empty()) else {
        return Ok(None);
    };

    // The categories field is a comma-joined list; keep the leading entry.
    let categoria = product
        .categories
        .as_deref()
        .and_then(|c| c.split(',').next())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok(Some(OnlineProduct {
        nome,
        marca: product.brands.filter(|b| !b.trim().is_empty()),
        categoria,
        fonte: fonte.to_string(),
    }))
}
