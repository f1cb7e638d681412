use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use mise_core::{OnlineProduct, PhotoRef, ProductRecord};

use super::AppState;
use crate::lookup::{self, LookupOutcome};
use crate::mirror;

/// Envelope for `/consulta/{codigo}`.
#[derive(Debug, Serialize)]
pub(super) struct ConsultaResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origem: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fonte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produto: Option<ProdutoPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto: Option<PhotoRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensagem: Option<&'static str>,
}

/// A local hit serializes as the catalog row; cache and online hits as the
/// common external shape.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum ProdutoPayload {
    Local(ProductRecord),
    Online(OnlineProduct),
}

impl ConsultaResponse {
    fn invalido() -> Self {
        Self {
            ok: false,
            origem: None,
            fonte: None,
            produto: None,
            foto: None,
            mensagem: Some("Código inválido"),
        }
    }

    fn nao_encontrado() -> Self {
        Self {
            ok: false,
            origem: None,
            fonte: None,
            produto: None,
            foto: None,
            mensagem: Some("Produto não encontrado em nenhuma fonte"),
        }
    }
}

pub(super) async fn consultar(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> Json<ConsultaResponse> {
    let normalizado = mise_core::normalize(&codigo);
    if !mise_core::is_valid_code(&normalizado) {
        tracing::debug!(codigo, "rejected invalid barcode");
        return Json(ConsultaResponse::invalido());
    }

    // The photo is independent of which tier answers; resolve it alongside
    // the cascade.
    let (outcome, foto) = tokio::join!(
        lookup::consultar(&state.storage, &state.sources, &normalizado),
        state.photos.resolve(&normalizado)
    );

    let response = match outcome {
        LookupOutcome::Local(record) => ConsultaResponse {
            ok: true,
            origem: Some("local"),
            fonte: None,
            produto: Some(ProdutoPayload::Local(record)),
            foto,
            mensagem: None,
        },
        LookupOutcome::Cached(entry) => ConsultaResponse {
            ok: true,
            origem: Some("cache"),
            fonte: Some(entry.fonte.clone()),
            produto: Some(ProdutoPayload::Online(OnlineProduct {
                nome: entry.nome,
                marca: None,
                categoria: None,
                fonte: entry.fonte,
            })),
            foto,
            mensagem: None,
        },
        LookupOutcome::Online(product) => {
            // Freshly resolved: push the durable files to the mirror in the
            // background; the response never waits on it.
            mirror::spawn_uploads(&state.mirror, &state.mirror_paths);
            ConsultaResponse {
                ok: true,
                origem: Some("online"),
                fonte: Some(product.fonte.clone()),
                produto: Some(ProdutoPayload::Online(product)),
                foto,
                mensagem: None,
            }
        }
        LookupOutcome::NotFound => ConsultaResponse::nao_encontrado(),
    };

    Json(response)
}
