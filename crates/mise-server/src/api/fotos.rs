use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use mise_core::PhotoRef;

use super::AppState;

#[derive(Debug, Serialize)]
pub(super) struct FotoResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto: Option<PhotoRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensagem: Option<&'static str>,
}

/// Runs the photo resolver for a code and reports where the photo lives.
pub(super) async fn foto_info(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> Json<FotoResponse> {
    let normalizado = mise_core::normalize(&codigo);
    if normalizado.is_empty() {
        return Json(FotoResponse {
            ok: false,
            foto: None,
            mensagem: Some("Código inválido"),
        });
    }

    match state.photos.resolve(&normalizado).await {
        Some(foto) => Json(FotoResponse {
            ok: true,
            foto: Some(foto),
            mensagem: None,
        }),
        None => Json(FotoResponse {
            ok: false,
            foto: None,
            mensagem: Some("Foto não encontrada"),
        }),
    }
}

/// Serves a photo straight from the local directory.
pub(super) async fn foto_local(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(safe_name) = sanitize_filename(&filename) else {
        return not_found();
    };

    let path = state.photos.local_dir().join(safe_name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type_for(safe_name))],
            bytes,
        )
            .into_response(),
        Err(_) => not_found(),
    }
}

/// Proxies a photo from the remote bucket's public URL.
pub(super) async fn foto_remota(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(safe_name) = sanitize_filename(&filename) else {
        return not_found();
    };

    match state.photos.fetch_remote(safe_name).await {
        Some((content_type, bytes)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type)],
            bytes,
        )
            .into_response(),
        None => not_found(),
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(FotoResponse {
            ok: false,
            foto: None,
            mensagem: Some("Foto não encontrada"),
        }),
    )
        .into_response()
}

/// Rejects traversal-prone names: separators, parent references, dotfiles.
fn sanitize_filename(filename: &str) -> Option<&str> {
    let trimmed = filename.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains("..")
    {
        return None;
    }
    Some(trimmed)
}

fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else {
        "application/octet-stream"
    }
}
