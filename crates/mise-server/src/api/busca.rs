use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use mise_core::SearchHit;

use super::AppState;

#[derive(Debug, Serialize)]
pub(super) struct BuscaResponse {
    pub ok: bool,
    pub produtos: Vec<SearchHit>,
}

/// Substring search over product names, capped at 10 results. An empty
/// result set is still `ok: true`.
pub(super) async fn buscar_por_nome(
    State(state): State<AppState>,
    Path(termo): Path<String>,
) -> Json<BuscaResponse> {
    let produtos = state.storage.search_by_name(termo.trim()).await;
    Json(BuscaResponse { ok: true, produtos })
}
