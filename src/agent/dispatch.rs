//! Tool dispatch
//!
//! Classifies and executes the tool calls one assistant message carries.
//! Reads run inline; writes run under the bounded retry policy, and a
//! failure after retries becomes an error payload the model sees on the
//! next round. Nothing dispatched here ever aborts the turn.

use crate::llm::{backoff_delay, Message};
use crate::tools::{Tool, ToolKind, ToolOutput, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    max_retries: u32,
    backoff_base: Duration,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        max_retries: u32,
        backoff_base: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            max_retries,
            backoff_base,
            call_timeout,
        }
    }

    /// Execute every tool call in the assistant message, in order. Returns
    /// one tool-result message per call, tagged with the originating call
    /// id so the model can correlate them on the next round.
    pub async fn dispatch(&self, thread_key: &str, assistant: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for (id, name, input) in assistant.tool_uses() {
            let Some(tool) = self.registry.get(name) else {
                tracing::warn!(tool = name, "Model requested unknown tool");
                results.push(Message::tool_result(
                    id,
                    name,
                    json!({"error": format!("Unknown tool: {name}")}).to_string(),
                    true,
                ));
                continue;
            };

            let mut input = input.clone();
            if let Value::Object(map) = &mut input {
                map.insert("thread_key".to_string(), json!(thread_key));
            }

            tracing::info!(
                tool = name,
                call_id = id,
                kind = ?tool.kind(),
                "Executing tool call"
            );
            let output = self.run_with_retry(&tool, input).await;
            results.push(Message::tool_result(id, name, output.output, !output.success));
        }

        results
    }

    async fn run_with_retry(&self, tool: &Arc<dyn Tool>, input: Value) -> ToolOutput {
        let mut attempt = 0;
        loop {
            let output = match tokio::time::timeout(self.call_timeout, tool.run(input.clone()))
                .await
            {
                Ok(output) => output,
                Err(_) => ToolOutput::transient("tool call timed out"),
            };

            if output.success {
                return output;
            }
            if !output.retryable || attempt >= self.max_retries {
                tracing::error!(
                    tool = tool.name(),
                    kind = ?tool.kind(),
                    attempts = attempt + 1,
                    error = %output.output,
                    "Tool call failed"
                );
                return output;
            }

            let delay = backoff_delay(self.backoff_base, attempt);
            tracing::warn!(
                tool = tool.name(),
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Retrying tool call"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
