//! HTTP request handlers

use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, HealthResponse, InsightRequest, InsightResponse,
};
use super::AppState;
use crate::agent::AgentError;
use crate::insights::generate_insight;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/appointment/chat_with_agent", post(chat_with_agent))
        .route("/appointment/booked/:thread_key", get(booked_appointments))
        .route("/insights", post(insights))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn chat_with_agent(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.user_input.trim().is_empty() {
        return Err(AppError::BadRequest("user_input must not be empty".to_string()));
    }

    let thread_key = resolve_thread_key(request.thread_key, request.user_id.as_deref());

    // Run the turn in its own task: a disconnecting client must not abort
    // in-flight calendar writes, and the appends must still land.
    let agent = state.agent.clone();
    let turn_key = thread_key.clone();
    let turn = tokio::spawn(async move { agent.run_turn(&turn_key, &request.user_input).await });

    let reply = turn
        .await
        .map_err(|e| AppError::Internal(format!("turn task failed: {e}")))??;

    Ok(Json(ChatResponse {
        response: reply,
        thread_key,
    }))
}

/// Appointments booked from a thread, with their calendar integration
/// status (`calendar_event_id` is null until the calendar write confirmed).
async fn booked_appointments(
    State(state): State<AppState>,
    Path(thread_key): Path<String>,
) -> Result<Json<Vec<crate::db::Appointment>>, AppError> {
    let appointments = state
        .db
        .appointments_for_thread(&thread_key)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(appointments))
}

async fn insights(
    State(state): State<AppState>,
    Json(request): Json<InsightRequest>,
) -> Result<Json<InsightResponse>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".to_string()));
    }

    let insight = generate_insight(&state.llm_registry, &request.question).await;
    Ok(Json(InsightResponse { insight }))
}

/// One stable thread per user identity, or a fresh thread for anonymous
/// one-off conversations.
fn resolve_thread_key(thread_key: Option<String>, user_id: Option<&str>) -> String {
    thread_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| user_id.map(|id| format!("appointment-thread-{id}")))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Handler-level errors. Internal tool identities and raw provider errors
/// never reach the client; the agent taxonomy collapses to coarse kinds.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    AgentUnavailable,
    Internal(String),
}

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::ModelUnavailable(detail) => {
                tracing::error!(detail = %detail, "Agent unavailable");
                AppError::AgentUnavailable
            }
            AgentError::ModelProtocol(detail) => {
                tracing::error!(detail = %detail, "Model protocol violation");
                AppError::AgentUnavailable
            }
            AgentError::TurnLimit(limit) => {
                tracing::error!(limit = limit, "Turn limit exceeded");
                AppError::Internal("conversation did not converge".to_string())
            }
            AgentError::EmptyResponse => {
                AppError::Internal("agent produced no reply".to_string())
            }
            AgentError::Store(detail) => AppError::Internal(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "bad_request", message)
            }
            AppError::AgentUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "agent_unavailable",
                "The assistant is unavailable right now. Please try again in a moment."
                    .to_string(),
            ),
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
