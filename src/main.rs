//! Clinic scheduling assistant backend
//!
//! An LLM-driven appointment agent: free text in, tool-use against the
//! clinic calendar in the middle, a natural-language reply out.

mod agent;
mod api;
mod config;
mod db;
mod insights;
mod llm;
mod scheduling;
mod tools;

use agent::{Dispatcher, SchedulingAgent, SqliteStore};
use api::{create_router, AppState};
use async_trait::async_trait;
use config::Config;
use db::Database;
use llm::{Gateway, LlmConfig, LlmError, LlmRequest, LlmResponse, LlmService, ModelRegistry};
use scheduling::ComposioProvider;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tools::ToolRegistry;
use tower_http::{
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
                .unwrap_or_else(|_| "clinic_agent=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path, "Opening database");
    let db = Database::open(&config.db_path)?;

    // LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));
    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No LLM API keys configured. Set GEMINI_API_KEY.");
    }

    // Scheduling provider
    if config.composio_api_key.is_none() {
        tracing::warn!("COMPOSIO_API_KEY not set; calendar tools will fail");
    }
    let provider = Arc::new(ComposioProvider::new(
        config.composio_api_key.clone().unwrap_or_default(),
        config.composio_base_url.clone(),
        config.composio_entity_id.clone(),
    ));

    // Agent assembly: store, tools, gateway, dispatcher
    let tool_registry = Arc::new(ToolRegistry::new(
        provider,
        db.clone(),
        config.timezone.clone(),
    ));

    let model: Arc<dyn LlmService> = llm_registry
        .default()
        .unwrap_or_else(|| Arc::new(UnconfiguredService));
    let gateway = Gateway::new(
        model,
        config.model_retries,
        config.backoff_base,
        config.model_timeout,
    );
    let dispatcher = Dispatcher::new(
        tool_registry.clone(),
        config.tool_retries,
        config.backoff_base,
        config.tool_timeout,
    );
    let agent = Arc::new(SchedulingAgent::new(
        SqliteStore::new(db.clone()),
        gateway,
        dispatcher,
        tool_registry,
        config.timezone.clone(),
        config.max_rounds,
    ));

    let state = AppState::new(agent, db, llm_registry);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Clinic agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Stand-in used when no model key is configured; every turn surfaces as
/// agent-unavailable instead of the process refusing to start.
struct UnconfiguredService;

#[async_trait]
impl LlmService for UnconfiguredService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::auth("no model provider configured"))
    }

    fn model_id(&self) -> &str {
        "unconfigured"
    }
}
