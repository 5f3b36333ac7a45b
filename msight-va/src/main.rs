//! msight-va - Match Video Analysis Microservice
//!
//! Drives the match-video analysis pipeline: uploads a local match
//! recording to the external media-understanding service, fans out the
//! structured extraction tasks, and serves results plus live progress
//! over HTTP REST + SSE.

use anyhow::Result;
use msight_common::events::EventBus;
use msight_va::services::{GeminiClient, MediaService};
use msight_va::AppState;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting msight-va (Match Video Analysis) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration: ENV over TOML over defaults
    let toml_config = msight_common::config::load_toml_config("msight-va")?;
    let config = msight_va::config::resolve(&toml_config)?;
    info!(sport = %config.sport, port = config.port, "Configuration resolved");

    // External media-understanding service client
    let media: Arc<dyn MediaService> = Arc::new(GeminiClient::new(
        config.media_api_key.clone(),
        config.media_base_url.clone(),
        config.media_model.clone(),
    )?);

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    // Create application state
    let state = AppState::new(media, &config, event_bus);

    // Build router
    let app = msight_va::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
