mod config;
mod db;
mod errors;
mod extraction;
mod matching;
mod models;
mod repository;
mod routes;
mod state;

use anyhow::Result;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::ocr::{NoOcr, PageOcr, TesseractOcr};
use crate::extraction::TextExtractor;
use crate::matching::TfIdfScorer;
use crate::repository::SqlRepository;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Screener v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let pool = create_pool(&config.database_url, 5).await?;
    let repo = Arc::new(SqlRepository::new(pool));

    let ocr: Arc<dyn PageOcr> = if config.ocr_enabled {
        info!("OCR fallback enabled (lang: {}, {} dpi)", config.ocr_lang, config.ocr_dpi);
        Arc::new(TesseractOcr::new(config.ocr_lang.clone()))
    } else {
        info!("OCR fallback disabled");
        Arc::new(NoOcr)
    };

    let state = AppState {
        repo,
        extractor: TextExtractor::new(ocr, config.ocr_dpi),
        scorer: Arc::new(TfIdfScorer),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Restricts CORS to `CORS_ALLOWED_ORIGIN` when set, otherwise allows any origin.
fn cors_layer(config: &Config) -> Result<CorsLayer> {
    match &config.cors_allowed_origin {
        Some(origin) => {
            let origin: HeaderValue = origin.parse()?;
            Ok(CorsLayer::permissive().allow_origin(origin))
        }
        None => Ok(CorsLayer::permissive()),
    }
}
