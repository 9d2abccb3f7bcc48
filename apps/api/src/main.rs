use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobscout::aggregator::Aggregator;
use jobscout::config::Config;
use jobscout::dedup::seen_store::SeenJobsStore;
use jobscout::llm_client::{self, LlmClient};
use jobscout::routes::build_router;
use jobscout::sources::{
    incruit::Incruit, jobkorea::JobKorea, jumpit::Jumpit, saramin::Saramin, wanted::Wanted,
    worknet::Worknet, JobSource,
};
use jobscout::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        // Bare level, not `jobscout=`: events from this bin carry the `api`
        // target, which a package-name directive would silence.
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobScout API v{}", env!("CARGO_PKG_VERSION"));

    let mut sources: Vec<Arc<dyn JobSource>> = vec![
        Arc::new(Saramin::new()),
        Arc::new(JobKorea::new()),
        Arc::new(Wanted::new()),
        Arc::new(Jumpit::new()),
        Arc::new(Incruit::new()),
    ];
    match &config.worknet_api_key {
        Some(key) => sources.push(Arc::new(Worknet::new(key.clone()))),
        None => info!("WORKNET_API_KEY not set, public-institution source disabled"),
    }
    info!("{} sources registered", sources.len());

    let aggregator = Arc::new(Aggregator::new(sources));
    let seen_jobs = Arc::new(SeenJobsStore::new(&config.data_dir));

    let llm = config.anthropic_api_key.clone().map(LlmClient::new);
    match &llm {
        Some(_) => info!("LLM client initialized (model: {})", llm_client::MODEL),
        None => info!("ANTHROPIC_API_KEY not set, running rule-based only"),
    }

    let state = AppState {
        config: config.clone(),
        aggregator,
        seen_jobs,
        llm,
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
