mod busca;
mod consulta;
mod fotos;
mod inventario;
mod onedrive;
mod stats;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id;
use crate::mirror::CatalogMirror;
use crate::photos::PhotoResolver;
use crate::storage::Storage;
use mise_sources::SourceRegistry;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub sources: Arc<SourceRegistry>,
    pub photos: Arc<PhotoResolver>,
    pub mirror: Arc<dyn CatalogMirror>,
    pub mirror_paths: Vec<PathBuf>,
    pub static_dir: PathBuf,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/consulta/{codigo}", get(consulta::consultar))
        .route("/api/buscar-por-nome/{termo}", get(busca::buscar_por_nome))
        .route("/api/inventario", post(inventario::registrar))
        .route("/api/stats", get(stats::stats))
        .route("/api/onedrive/status", get(onedrive::status))
        .route(
            "/api/onedrive/sincronizar",
            get(onedrive::sincronizar).post(onedrive::sincronizar),
        )
        .route("/api/foto/{codigo}", get(fotos::foto_info))
        .route("/fotos/{filename}", get(fotos::foto_local))
        .route("/foto-r2/{filename}", get(fotos::foto_remota))
        .fallback(spa_index)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

/// Minimal entry document served when the bundled front-end is absent.
const DEFAULT_INDEX: &str = "<!doctype html>\n<html lang=\"pt-BR\">\n<head><meta charset=\"utf-8\"><title>MISE Scanner</title></head>\n<body><h1>MISE Scanner</h1><p>Consulte um produto em <code>/consulta/{codigo}</code>.</p></body>\n</html>\n";

/// Catch-all: serves the single-page-app entry document.
async fn spa_index(State(state): State<AppState>) -> impl IntoResponse {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => Html(contents),
        Err(_) => Html(DEFAULT_INDEX.to_string()),
    }
}
