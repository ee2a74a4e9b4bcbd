//! Turn loop
//!
//! One turn: append the user message, then alternate model completions and
//! tool dispatch until the model replies in plain text. Turns for the same
//! thread key are serialized; different threads run in parallel.

use super::dispatch::Dispatcher;
use super::error::AgentError;
use super::prompt::build_system_prompt;
use super::store::ConversationStore;
use crate::llm::{Gateway, Message};
use crate::tools::ToolRegistry;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Per-thread turn locks. A lock is created on first use and kept for the
/// process lifetime; the set of active threads is small.
#[derive(Default)]
struct ThreadLocks {
    inner: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl ThreadLocks {
    async fn acquire(&self, thread_key: &str) -> OwnedMutexGuard<()> {
        let existing = self.inner.read().await.get(thread_key).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => self
                .inner
                .write()
                .await
                .entry(thread_key.to_string())
                .or_default()
                .clone(),
        };
        lock.lock_owned().await
    }
}

/// The scheduling agent: turn loop over a store, a model gateway and the
/// tool dispatcher.
pub struct SchedulingAgent<S: ConversationStore> {
    store: S,
    gateway: Gateway,
    dispatcher: Dispatcher,
    registry: Arc<ToolRegistry>,
    locks: ThreadLocks,
    timezone: String,
    max_rounds: u32,
}

impl<S: ConversationStore> SchedulingAgent<S> {
    pub fn new(
        store: S,
        gateway: Gateway,
        dispatcher: Dispatcher,
        registry: Arc<ToolRegistry>,
        timezone: String,
        max_rounds: u32,
    ) -> Self {
        Self {
            store,
            gateway,
            dispatcher,
            registry,
            locks: ThreadLocks::default(),
            timezone,
            max_rounds,
        }
    }

    /// Run one turn: free text in, final assistant reply out.
    pub async fn run_turn(&self, thread_key: &str, user_text: &str) -> Result<String, AgentError> {
        let _turn = self.locks.acquire(thread_key).await;
        tracing::info!(thread = thread_key, "Turn started");

        self.store
            .append(thread_key, Message::user(user_text))
            .await
            .map_err(AgentError::Store)?;

        for round in 0..self.max_rounds {
            let system = build_system_prompt(Utc::now(), &self.timezone);
            let history = self
                .store
                .history(thread_key)
                .await
                .map_err(AgentError::Store)?;

            let assistant = self
                .gateway
                .complete(&system, &history, self.registry.definitions())
                .await?;
            self.store
                .append(thread_key, assistant.clone())
                .await
                .map_err(AgentError::Store)?;

            if assistant.tool_uses().is_empty() {
                let reply = assistant.text();
                if reply.trim().is_empty() {
                    return Err(AgentError::EmptyResponse);
                }
                tracing::info!(thread = thread_key, rounds = round + 1, "Turn finished");
                return Ok(reply);
            }

            for (id, name, _) in assistant.tool_uses() {
                tracing::info!(thread = thread_key, tool = name, call_id = id, "Model requested tool");
            }
            for result in self.dispatcher.dispatch(thread_key, &assistant).await {
                self.store
                    .append(thread_key, result)
                    .await
                    .map_err(AgentError::Store)?;
            }
        }

        tracing::error!(
            thread = thread_key,
            limit = self.max_rounds,
            "Turn limit exceeded"
        );
        Err(AgentError::TurnLimit(self.max_rounds))
    }
}
