use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use orchestrated::adapters::gemini::{DisabledGenerator, GeminiClient};
use orchestrated::adapters::unipile::UnipileClient;
use orchestrated::adapters::SuggestionBackend;
use orchestrated::sync::engine::{EngineConfig, InboxEngine};
use orchestrated::sync::poller::PollConfig;
use orchestrated::sync::state::ActiveView;
use orchestrated::{config, OrchestratedError};

#[tokio::main]
async fn main() -> Result<(), OrchestratedError> {
    // Initialize tracing for logging
    // Can be overridden with the RUST_LOG environment variable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("orchestrated=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting orchestrated ...");

    config::init_config()?;
    let app_config = config::get_config();

    let gateway = Arc::new(UnipileClient::new(&app_config.gateway)?);

    let generator: Arc<dyn SuggestionBackend> = match GeminiClient::new(&app_config.generator) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!("Reply suggestions disabled: {}", e);
            Arc::new(DisabledGenerator)
        }
    };

    let engine_config = EngineConfig {
        poll: PollConfig {
            poll_interval_seconds: app_config.sync.poll_interval_seconds,
        },
        redirect_origin: app_config.gateway.redirect_origin.clone(),
    };

    let (engine, events) = InboxEngine::new(gateway, generator, engine_config);

    // Log state changes as they stream out of the engine
    tokio::spawn(async move {
        while let Ok(event) = events.recv_async().await {
            info!("sync event: {:?}", event);
        }
    });

    engine.clone().activate_view(ActiveView::Messages).await;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| OrchestratedError::Io(e.to_string()))?;

    info!("Shutting down ...");
    engine.shutdown().await;

    Ok(())
}
