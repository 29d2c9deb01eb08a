pub mod index;
pub mod page;

use std::net::SocketAddr;
use std::sync::Arc;
use axum::{routing::get, Router};
use crate::api::alphavantage::AlphaVantageClient;
use crate::services::{SvgChartRenderer, SymbolCatalog};

/// Read-only state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<AlphaVantageClient>,
    pub renderer: Arc<SvgChartRenderer>,
    pub symbols: Arc<SymbolCatalog>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::show).post(index::submit))
        .with_state(state)
}

/// Start the axum server
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    tracing::info!("Registering routes:");
    tracing::info!("  GET  /  (chart form)");
    tracing::info!("  POST /  (symbol, series, chart_type, start, end)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, router(state)).await
}
