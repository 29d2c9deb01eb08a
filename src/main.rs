use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;
mod web;

use api::alphavantage::{AlphaVantageClient, ContainsSubstring};
use config::AppConfig;
use services::{SvgChartRenderer, SymbolCatalog};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("stock_chart=debug".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap()))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📊 Starting stock chart server...");

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    info!("Loading symbols from {}...", config.symbols_csv.display());
    let symbols = match SymbolCatalog::load(&config.symbols_csv) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load symbol list: {}", e);
            return;
        }
    };

    if symbols.is_empty() {
        warn!("Symbol list {} is empty, the form will have no choices", config.symbols_csv.display());
    }

    let client = match AlphaVantageClient::with_base_url(
        config.api_key.clone(),
        config.base_url.clone(),
        config.request_timeout,
    ) {
        Ok(c) => c.with_selector(Box::new(ContainsSubstring(config.series_key.clone()))),
        Err(e) => {
            error!("Failed to create provider client: {}", e);
            return;
        }
    };

    let state = web::AppState {
        client: Arc::new(client),
        renderer: Arc::new(SvgChartRenderer::new(config.chart_width, config.chart_height)),
        symbols: Arc::new(symbols),
    };

    if let Err(e) = web::serve(state, config.bind_addr).await {
        error!("Server error: {}", e);
    }
}
