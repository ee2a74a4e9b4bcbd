//! API request/response types

use serde::{Deserialize, Serialize};

/// Chat request. The thread is addressed either directly by `thread_key` or
/// by a caller-supplied user identity; with neither, a fresh thread starts.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_input: String,
    #[serde(default)]
    pub thread_key: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    /// Echoed back so the client can continue the same conversation.
    pub thread_key: String,
}

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub insight: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
