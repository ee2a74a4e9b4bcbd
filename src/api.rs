//! HTTP API
//!
//! One chat endpoint for the scheduling agent, the insights endpoint, and a
//! health probe. Everything else about the service is internal.

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::agent::{SchedulingAgent, SqliteStore};
use crate::db::Database;
use crate::llm::ModelRegistry;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<SchedulingAgent<SqliteStore>>,
    pub db: Database,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(
        agent: Arc<SchedulingAgent<SqliteStore>>,
        db: Database,
        llm_registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            agent,
            db,
            llm_registry,
        }
    }
}
