//! Agent error taxonomy

use crate::llm::{LlmError, LlmErrorKind};
use thiserror::Error;

/// Failures a turn can surface to the caller. Tool failures are not here:
/// they are reported back into the conversation so the model can react.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model provider unavailable: {0}")]
    ModelUnavailable(String),

    #[error("model response violated the wire contract: {0}")]
    ModelProtocol(String),

    #[error("model finished the turn without a textual reply")]
    EmptyResponse,

    #[error("turn aborted after {0} model rounds")]
    TurnLimit(u32),

    #[error("conversation store failure: {0}")]
    Store(String),
}

impl From<LlmError> for AgentError {
    fn from(err: LlmError) -> Self {
        match err.kind {
            LlmErrorKind::Protocol => AgentError::ModelProtocol(err.message),
            _ => AgentError::ModelUnavailable(err.message),
        }
    }
}
