mod config;
mod dialogue;
mod errors;
mod job_search;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dialogue::orchestrator::DialogueOrchestrator;
use crate::dialogue::sessions::SessionRegistry;
use crate::job_search::JSearchClient;
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
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MentorMate API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize model gateway
    let llm = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_api_url.clone(),
    ));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize job search gateway
    let jobs = Arc::new(JSearchClient::new(
        config.rapidapi_key.clone(),
        config.jsearch_api_url.clone(),
    ));
    info!("Job search client initialized ({})", config.jsearch_api_url);

    let sessions = SessionRegistry::with_limits(
        Duration::from_secs(config.session_idle_ttl_secs),
        config.max_sessions,
    );
    spawn_session_sweeper(sessions.clone());
    info!(
        "Session registry initialized (idle ttl: {}s, max sessions: {})",
        config.session_idle_ttl_secs, config.max_sessions
    );

    let state = AppState {
        orchestrator: DialogueOrchestrator::new(llm, jobs.clone()),
        sessions,
        jobs,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops idle sessions that no request has touched.
fn spawn_session_sweeper(sessions: SessionRegistry) {
    let period = (sessions.idle_ttl() / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = sessions.sweep_expired().await;
            if removed > 0 {
                debug!("Swept {removed} idle sessions");
            }
        }
    });
}
