mod config;
mod content;
mod enrichment;
mod errors;
mod llm_client;
mod markdown;
mod pipeline;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::content::projects::ProjectStore;
use crate::content::skills::SkillProfile;
use crate::content::store::FileContentStore;
use crate::enrichment::{CallLimiter, GenAiGateway};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize content store
    let store = Arc::new(FileContentStore::open(&config.content_dir).await?);

    // Initialize LLM client behind the shared limiter
    let llm = LlmClient::with_base_url(config.gemini_api_key.clone(), &config.ai_base_url)?;
    info!("LLM client initialized (text model: {})", llm_client::TEXT_MODEL);
    let limiter = Arc::new(CallLimiter::new(
        config.ai_max_concurrency,
        config.ai_min_interval,
    ));
    info!(
        "AI calls limited to {} concurrent, {:?} apart, {:?} timeout",
        config.ai_max_concurrency, config.ai_min_interval, config.ai_timeout
    );

    let skills = Arc::new(SkillProfile::default());
    let gateway = Arc::new(GenAiGateway::new(
        llm,
        limiter,
        config.ai_timeout,
        skills.clone(),
    ));

    // Build app state
    let state = AppState::new(
        config.clone(),
        store,
        gateway,
        Arc::new(ProjectStore::seeded()),
        skills,
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
