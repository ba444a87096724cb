mod config;
mod errors;
mod llm_client;
mod routes;
mod servicenow;
mod state;
mod summary;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::{build_router, cors_layer};
use crate::servicenow::ServiceNowClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},tower_http={level}",
                env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HSE Bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("SN_INSTANCE: {}", config.sn_instance);
    info!("SN_USERNAME: {}", config.sn_username);
    info!("SN_PASSWORD loaded: {}", !config.sn_password.is_empty());

    // One connection pool shared by both outbound clients
    let http = reqwest::Client::builder()
        .user_agent(concat!("hse-bridge/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let records = ServiceNowClient::new(http.clone(), &config);
    let llm = LlmClient::new(http, &config);
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm.model(),
        config.openai_base_url
    );

    let state = AppState {
        records: Arc::new(records),
        llm: Arc::new(llm),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("HSE Bridge listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
