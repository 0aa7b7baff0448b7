mod assets;
mod error;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, info};

pub use error::ApiError;

use crate::{
    catalog::TileCatalog,
    chains::ResourceChains,
    filter::FilterCriteria,
    tile::Tile,
};

/// Shared, read-only state handed to every request.
pub struct AppState {
    catalog: TileCatalog,
    chains: ResourceChains,
}

impl AppState {
    pub fn new(catalog: TileCatalog, chains: ResourceChains) -> Self {
        Self { catalog, chains }
    }
}

pub struct WebServerConfig {
    pub catalog: TileCatalog,
    pub chains: ResourceChains,
    pub host: String,
    pub port: u16,
}

#[derive(Serialize)]
pub struct TilesResponse {
    pub count: usize,
    pub available: bool,
    pub tiles: Vec<Tile>,
}

#[derive(Serialize)]
pub struct FilterOptions {
    pub types: Vec<String>,
    pub generations: Vec<String>,
    pub chains: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tiles: usize,
    pub source: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(static_asset))
        .route("/styles.css", get(static_asset))
        .route("/app.js", get(static_asset))
        .route("/api/tiles", get(list_tiles))
        .route("/api/filters", get(filter_options))
        .route("/api/health", get(health))
        .with_state(state)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        catalog,
        chains,
        host,
        port,
    } = config;

    let state = Arc::new(AppState::new(catalog, chains));
    let router = build_router(state);

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    info!(%host, port, "tile catalog live at http://{host}:{port} (Ctrl+C to stop)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down tile catalog");
}

async fn static_asset(uri: Uri) -> Response {
    match assets::lookup(uri.path()) {
        Some(asset) => ([(header::CONTENT_TYPE, asset.content_type)], asset.body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_tiles(
    State(state): State<Arc<AppState>>,
    criteria: Result<Query<FilterCriteria>, QueryRejection>,
) -> Result<Json<TilesResponse>, ApiError> {
    let Query(criteria) = criteria.map_err(|err| ApiError::InvalidQuery(err.body_text()))?;
    let tiles: Vec<Tile> = criteria
        .apply(state.catalog.tiles(), &state.chains)
        .into_iter()
        .cloned()
        .collect();
    debug!(?criteria, visible = tiles.len(), "filtered tiles");

    Ok(Json(TilesResponse {
        count: tiles.len(),
        available: state.catalog.is_available(),
        tiles,
    }))
}

async fn filter_options(State(state): State<Arc<AppState>>) -> Json<FilterOptions> {
    Json(FilterOptions {
        types: state.catalog.types().into_iter().map(String::from).collect(),
        generations: state
            .catalog
            .generations()
            .into_iter()
            .map(String::from)
            .collect(),
        chains: state.chains.keys().map(String::from).collect(),
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let catalog = &state.catalog;
    Json(HealthResponse {
        status: if catalog.is_available() {
            "ok"
        } else {
            "unavailable"
        },
        tiles: catalog.len(),
        source: catalog.source().map(|path| path.display().to_string()),
        loaded_at: catalog.loaded_at(),
    })
}
