//! Conversation state store
//!
//! Append and full-history retrieval keyed by thread key. Only the turn
//! loop appends. The sqlite-backed store is the production implementation;
//! the in-memory store backs tests.

use crate::db::Database;
use crate::llm::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for conversation histories
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append one message to a thread's history
    async fn append(&self, thread_key: &str, message: Message) -> Result<(), String>;

    /// Full ordered history for a thread; empty for unknown threads
    async fn history(&self, thread_key: &str) -> Result<Vec<Message>, String>;
}

#[async_trait]
impl<T: ConversationStore + ?Sized> ConversationStore for Arc<T> {
    async fn append(&self, thread_key: &str, message: Message) -> Result<(), String> {
        (**self).append(thread_key, message).await
    }

    async fn history(&self, thread_key: &str) -> Result<Vec<Message>, String> {
        (**self).history(thread_key).await
    }
}

/// Production store over the sqlite database
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn append(&self, thread_key: &str, message: Message) -> Result<(), String> {
        self.db
            .append_message(thread_key, &message)
            .map_err(|e| e.to_string())
    }

    async fn history(&self, thread_key: &str) -> Result<Vec<Message>, String> {
        self.db.get_messages(thread_key).map_err(|e| e.to_string())
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    threads: std::sync::Mutex<std::collections::HashMap<String, Vec<Message>>>,
}

#[cfg(test)]
#[async_trait]
impl ConversationStore for MemoryStore {
    async fn append(&self, thread_key: &str, message: Message) -> Result<(), String> {
        self.threads
            .lock()
            .unwrap()
            .entry(thread_key.to_string())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn history(&self, thread_key: &str) -> Result<Vec<Message>, String> {
        Ok(self
            .threads
            .lock()
            .unwrap()
            .get(thread_key)
            .cloned()
            .unwrap_or_default())
    }
}
