//! Process configuration
//!
//! Read once from the environment in `main` and passed down explicitly;
//! nothing in the core reaches for env vars at runtime.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: String,
    /// IANA timezone used for the prompt, availability queries and event
    /// creation.
    pub timezone: String,
    /// Model rounds per turn before the runaway guard trips
    pub max_rounds: u32,
    pub model_retries: u32,
    pub tool_retries: u32,
    pub backoff_base: Duration,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
    pub composio_api_key: Option<String>,
    pub composio_base_url: Option<String>,
    pub composio_entity_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = std::env::var("CLINIC_DB_PATH").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            format!("{home}/.clinic-agent/agent.db")
        });

        Self {
            port: env_parsed("CLINIC_PORT", 8000),
            db_path,
            timezone: std::env::var("CLINIC_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            max_rounds: env_parsed("CLINIC_MAX_ROUNDS", 25),
            model_retries: env_parsed("CLINIC_MODEL_RETRIES", 2),
            tool_retries: env_parsed("CLINIC_TOOL_RETRIES", 2),
            backoff_base: Duration::from_millis(env_parsed("CLINIC_BACKOFF_MS", 500)),
            model_timeout: Duration::from_secs(env_parsed("CLINIC_MODEL_TIMEOUT_SECS", 120)),
            tool_timeout: Duration::from_secs(env_parsed("CLINIC_TOOL_TIMEOUT_SECS", 60)),
            composio_api_key: std::env::var("COMPOSIO_API_KEY").ok(),
            composio_base_url: std::env::var("COMPOSIO_BASE_URL").ok(),
            composio_entity_id: std::env::var("COMPOSIO_ENTITY_ID").ok(),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
