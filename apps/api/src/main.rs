mod application;
mod config;
mod crew;
mod errors;
mod llm_client;
mod routes;
mod state;
mod tools;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{CompletionModel, GeminiClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // crate name as a filter target uses underscores
            let target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jobsmith API v{}", env!("CARGO_PKG_VERSION"));

    // The one model handle shared by every agent. A missing GOOGLE_API_KEY
    // surfaces on the first completion call, not here.
    let model: Arc<dyn CompletionModel> =
        Arc::new(GeminiClient::new(config.google_api_key.clone()));
    info!(
        "LLM client initialized (model: {}, temperature: {})",
        llm_client::MODEL,
        llm_client::TEMPERATURE
    );
    if config.serper_api_key.is_none() {
        info!("SERPER_API_KEY not set; web search will fail on first use");
    }

    let state = AppState {
        model,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
