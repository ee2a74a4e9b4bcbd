//! Test doubles and helpers for the agent core

use crate::llm::{
    ContentBlock, LlmError, LlmRequest, LlmResponse, LlmService, Message, Role, Usage,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// LLM double that pops one scripted outcome per call. When the script runs
/// dry it serves the configured repeat response, if any.
pub struct ScriptedLlm {
    script: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    repeat: Option<LlmResponse>,
    delay: Option<Duration>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(script: Vec<Result<LlmResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            repeat: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve this response forever once the script is exhausted.
    pub fn with_repeat(mut self, response: LlmResponse) -> Self {
        self.repeat = Some(response);
        self
    }

    /// Hold each completion for this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => match &self.repeat {
                Some(response) => Ok(response.clone()),
                None => Err(LlmError::protocol("script exhausted")),
            },
        }
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// Plain-text model response
pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        content: vec![ContentBlock::text(text)],
        usage: Usage::default(),
    }
}

/// Model response carrying one tool call per (name, input) pair, each with
/// a fresh call id.
pub fn tool_call_response(calls: &[(&str, Value)]) -> LlmResponse {
    LlmResponse {
        content: calls
            .iter()
            .map(|(name, input)| {
                ContentBlock::tool_use(
                    format!("call_{}", uuid::Uuid::new_v4().simple()),
                    *name,
                    input.clone(),
                )
            })
            .collect(),
        usage: Usage::default(),
    }
}

/// Assert the conversation-ordering invariant: every tool-result message
/// answers a call id emitted by the closest preceding assistant message.
pub fn assert_tool_results_correlated(history: &[Message]) {
    let mut pending: Vec<String> = Vec::new();
    for message in history {
        match message.role {
            Role::Assistant => {
                pending = message
                    .tool_uses()
                    .iter()
                    .map(|(id, _, _)| (*id).to_string())
                    .collect();
            }
            Role::Tool => {
                for block in &message.content {
                    if let ContentBlock::ToolResult { tool_use_id, .. } = block {
                        assert!(
                            pending.contains(tool_use_id),
                            "tool result {tool_use_id} answers no pending call"
                        );
                    }
                }
            }
            Role::User => {}
        }
    }
}
