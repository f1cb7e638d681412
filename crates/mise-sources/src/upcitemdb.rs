//! Adapter for the UPCItemDB lookup endpoint.

use mise_core::OnlineProduct;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::SourceError;

#[derive(Debug, Deserialize)]
struct UpcResponse {
    #[serde(default)]
    items: Vec<UpcItem>,
}

#[derive(Debug, Deserialize)]
struct UpcItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Looks a barcode up in UPCItemDB; the first item wins.
///
/// The trial endpoint answers 404 for unknown codes and 429 when the daily
/// quota is spent; both read as "not found" here so the cascade moves on.
///
/// # Errors
///
/// - [`SourceError::Http`] on network failure.
/// - [`SourceError::UnexpectedStatus`] on an unhandled status.
/// - [`SourceError::Deserialize`] if the body is not the expected JSON.
pub(crate) async fn lookup(
    client: &Client,
    base_url: &str,
    code: &str,
    api_key: Option<&str>,
) -> Result<Option<OnlineProduct>, SourceError> {
    let url = format!("{base_url}/prod/trial/lookup?upc={code}");
    let mut request = client.get(&url);
    if let Some(key) = api_key {
        request = request.header("user_key", key);
    }
    let response = request.send().await?;

    match response.status() {
        StatusCode::NOT_FOUND | StatusCode::TOO_MANY_REQUESTS => return Ok(None),
        status if !status.is_success() => return Err(SourceError::UnexpectedStatus(status)),
        _ => {}
    }

    let body = response.text().await?;
    let parsed: UpcResponse =
        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: format!("upcitemdb(code={code})"),
            source: e,
        })?;

    let Some(item) = parsed.items.into_iter().next() else {
        return Ok(None);
    };
    let Some(nome) = item.title.filter(|title| !title.trim().is_empty()) else {
        return Ok(None);
    };

    Ok(Some(OnlineProduct {
        nome,
        marca: item.brand.filter(|b| !b.trim().is_empty()),
        categoria: item.category.filter(|c| !c.trim().is_empty()),
        fonte: "upcitemdb".to_string(),
    }))
}
