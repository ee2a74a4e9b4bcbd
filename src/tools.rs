//! Tool implementations for the scheduling agent
//!
//! Three capabilities are exposed to the model, named after the calendar
//! actions they execute. `FIND_FREE_SLOTS` is a read; the other two produce
//! external side effects and are dispatched under the write retry policy.

mod create_event;
mod draft_email;
mod find_slots;

pub use create_event::CreateEventTool;
pub use draft_email::DraftEmailTool;
pub use find_slots::FindSlotsTool;

use crate::db::Database;
use crate::scheduling::SchedulingProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Whether invoking a tool only observes external state or mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Side-effect free, safe to run silently
    Read,
    /// Produces an external side effect, must never be silently lost
    Write,
}

/// Result from tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
    /// Whether a failed call is worth retrying. Always false on success.
    #[serde(skip)]
    pub retryable: bool,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            retryable: false,
        }
    }

    /// Terminal failure: bad input, auth, anything a retry cannot fix.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            retryable: false,
        }
    }

    /// Transient failure worth retrying under the dispatch policy.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            retryable: true,
        }
    }
}

/// Trait for tools the agent can invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as presented to the model
    fn name(&self) -> &str;

    /// Tool description for the model
    fn description(&self) -> String;

    /// Read/write classification
    fn kind(&self) -> ToolKind;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn run(&self, input: Value) -> ToolOutput;
}

/// Collection of tools available to the agent. Assembled once at startup.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Standard registry: availability lookup plus the two write tools.
    pub fn new(provider: Arc<dyn SchedulingProvider>, db: Database, timezone: String) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(FindSlotsTool::new(provider.clone(), timezone.clone())),
            Arc::new(CreateEventTool::new(provider.clone(), db, timezone)),
            Arc::new(DraftEmailTool::new(provider)),
        ];
        Self { tools }
    }

    /// Get all tool definitions for the model
    pub fn definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        self.tools
            .iter()
            .map(|t| crate::llm::ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }
}
