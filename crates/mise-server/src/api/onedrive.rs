use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::mirror;

#[derive(Debug, Serialize)]
pub(super) struct StatusResponse {
    pub ok: bool,
    pub configurado: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct SincronizarResponse {
    pub ok: bool,
    pub mensagem: &'static str,
}

pub(super) async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ok: true,
        configurado: state.mirror.is_configured(),
    })
}

/// Pushes the durable catalog files to the mirror. The uploads run as
/// detached tasks; this answers as soon as they are queued.
pub(super) async fn sincronizar(State(state): State<AppState>) -> Json<SincronizarResponse> {
    if !state.mirror.is_configured() {
        return Json(SincronizarResponse {
            ok: false,
            mensagem: "OneDrive não configurado",
        });
    }

    mirror::spawn_uploads(&state.mirror, &state.mirror_paths);
    Json(SincronizarResponse {
        ok: true,
        mensagem: "Sincronização iniciada",
    })
}
