//! genui-chat - weather and flight assistant with generated UI
//!
//! Serves a chat page whose assistant answers are rendered as text, flight
//! cards, or weather cards depending on the tool the model picks.

mod api;
mod conversation;
mod llm;
mod orchestrator;
mod tools;

#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use llm::LlmConfig;
use orchestrator::TurnOrchestrator;
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{RapidApiWeather, ToolResolver, WeatherConfig};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genui_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let port: u16 = std::env::var("GENUI_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Model client
    let llm_config = LlmConfig::from_env();
    if !llm_config.has_api_key() {
        tracing::warn!("OPENAI_API_KEY is not set; every turn will fail until it is.");
    }
    let llm = llm::build_service(&llm_config)?;
    tracing::info!(model = %llm.model_id(), base_url = %llm_config.base_url, "LLM client ready");

    // Weather source
    let weather_config = WeatherConfig::from_env();
    if weather_config.api_key.is_none() {
        tracing::warn!("WEATHER_API_KEY is not set; weather lookups will report an error.");
    }
    let weather = RapidApiWeather::new(weather_config)?;

    let mut orchestrator = TurnOrchestrator::new(llm, ToolResolver::new(Arc::new(weather)));
    if let Ok(prompt) = std::env::var("GENUI_SYSTEM_PROMPT") {
        orchestrator = orchestrator.with_system_prompt(prompt);
    }

    let state = AppState::new(orchestrator);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("genui-chat listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
