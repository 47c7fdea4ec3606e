//! HTTP layer exposing the artefacts of the last pipeline run.

pub mod routes;
pub mod types;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
}

pub fn router(settings: Settings) -> Router {
    Router::new()
        .route("/categories", get(routes::list_categories))
        .route("/regions", get(routes::list_regions))
        .route("/graph", get(routes::graph))
        .route("/summary", get(routes::summary))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { settings })
}

pub async fn serve(settings: Settings, host: String, port: u16) -> Result<()> {
    let router = router(settings);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving news-insights API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
