mod analysis;
mod chat;
mod config;
mod errors;
mod extraction;
mod generation;
mod ingest;
mod llm_client;
mod markup;
mod models;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::generation::generator::ResumePipeline;
use crate::ingest::rasterizer::PdftoppmRasterizer;
use crate::ingest::scraper::JobPageFetcher;
use crate::ingest::text_extractor::TextExtractor;
use crate::llm_client::LlmClient;
use crate::render::compiler::LatexCompiler;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    for dir in config.directories() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    // Initialize LLM client (optional)
    let generator = LlmClient::from_key(config.anthropic_api_key.clone())?;
    match generator {
        Some(_) => info!("LLM client initialized (model: {})", llm_client::MODEL),
        None => warn!("ANTHROPIC_API_KEY not set; generative steps will run degraded"),
    }

    let compiler = Arc::new(LatexCompiler::new(
        config.pdf_output_dir.clone(),
        config.latex_program.clone(),
        config.compile_timeout,
    ));
    info!(
        "Compiling with {} into {}",
        config.latex_program,
        compiler.output_dir().display()
    );

    let rasterizer = Arc::new(PdftoppmRasterizer::new(
        config.rasterizer_program.clone(),
        config.compile_timeout,
    ));
    let text_extractor = Arc::new(TextExtractor::new(
        generator.clone(),
        rasterizer,
        config.temp_dir.clone(),
    ));
    let fetcher = JobPageFetcher::new()?;

    let state = AppState {
        pipeline: Arc::new(ResumePipeline::new(generator.clone(), compiler)),
        generator,
        text_extractor,
        fetcher,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_file_size))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
