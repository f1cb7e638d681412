use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use mise_core::InventoryRecord;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct InventarioRequest {
    pub codigo: String,
    #[serde(default)]
    pub produto: Option<String>,
    #[serde(default)]
    pub quantidade: Option<i64>,
    /// Scales send weights as numbers, the app as text; accept both.
    #[serde(default)]
    pub peso: Option<serde_json::Value>,
    #[serde(default, rename = "dataHora")]
    pub data_hora: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct InventarioResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<InventoryRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensagem: Option<&'static str>,
}

pub(super) async fn registrar(
    State(state): State<AppState>,
    Json(body): Json<InventarioRequest>,
) -> Json<InventarioResponse> {
    let codigo = mise_core::normalize(&body.codigo);
    if !mise_core::is_valid_code(&codigo) {
        return Json(InventarioResponse {
            ok: false,
            item: None,
            mensagem: Some("Código inválido"),
        });
    }

    let produto = body
        .produto
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "Produto sem nome".to_string());
    let quantidade = body.quantidade.unwrap_or(1);
    let peso = body.peso.as_ref().and_then(peso_as_text);
    let atualizado_em = body
        .data_hora
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    match state
        .storage
        .upsert_inventory(&codigo, &produto, quantidade, peso.as_deref(), &atualizado_em)
        .await
    {
        Some(item) => Json(InventarioResponse {
            ok: true,
            item: Some(item),
            mensagem: None,
        }),
        None => Json(InventarioResponse {
            ok: false,
            item: None,
            mensagem: Some("Falha ao gravar inventário"),
        }),
    }
}

fn peso_as_text(peso: &serde_json::Value) -> Option<String> {
    match peso {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
