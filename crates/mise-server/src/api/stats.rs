use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub(super) struct StatsResponse {
    pub ok: bool,
    pub locais: i64,
    pub online: i64,
}

/// Record counts: local catalog vs. online-resolved cache.
pub(super) async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let (locais, online) = state.storage.stats().await;
    Json(StatsResponse {
        ok: true,
        locais,
        online,
    })
}
