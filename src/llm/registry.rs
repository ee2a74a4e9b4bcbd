//! Model registry for the available LLM providers

use super::{GeminiModel, GeminiService, LlmService, OpenAIModel, OpenAIService};
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            groq_api_key: std::env::var("GROQ_API_KEY").ok(),
            default_model: std::env::var("DEFAULT_MODEL").ok(),
        }
    }
}

/// Registry of available LLM models. Built once at startup, read-only after.
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        if let Some(key) = config.gemini_api_key.as_ref().filter(|k| !k.is_empty()) {
            for model in [GeminiModel::Flash2, GeminiModel::Pro15] {
                services.insert(
                    model.model_id().to_string(),
                    Arc::new(GeminiService::new(key.clone(), model)),
                );
            }
        }

        if let Some(key) = config.openai_api_key.as_ref().filter(|k| !k.is_empty()) {
            services.insert(
                OpenAIModel::Gpt4oMini.model_id().to_string(),
                Arc::new(OpenAIService::new(key.clone(), OpenAIModel::Gpt4oMini)),
            );
        }

        if let Some(key) = config.groq_api_key.as_ref().filter(|k| !k.is_empty()) {
            services.insert(
                OpenAIModel::LlamaGroq.model_id().to_string(),
                Arc::new(OpenAIService::new(key.clone(), OpenAIModel::LlamaGroq)),
            );
        }

        let default_model = config
            .default_model
            .clone()
            .or_else(|| {
                // The scheduling agent runs on Gemini flash when available.
                if services.contains_key("gemini-2.0-flash") {
                    Some("gemini-2.0-flash".to_string())
                } else {
                    let mut ids: Vec<_> = services.keys().cloned().collect();
                    ids.sort();
                    ids.into_iter().next()
                }
            })
            .unwrap_or_else(|| "gemini-2.0-flash".to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    /// Get the default model ID
    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Check if any models are available
    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }

    /// Services to try in order when a text generation must succeed if at
    /// all possible: default first, then every other configured provider.
    pub fn fallback_chain(&self) -> Vec<Arc<dyn LlmService>> {
        let mut chain = Vec::new();
        if let Some(default) = self.default() {
            chain.push(default);
        }
        let mut rest: Vec<_> = self
            .services
            .iter()
            .filter(|(id, _)| **id != self.default_model)
            .collect();
        rest.sort_by(|a, b| a.0.cmp(b.0));
        chain.extend(rest.into_iter().map(|(_, s)| s.clone()));
        chain
    }
}
