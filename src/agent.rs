//! Core scheduling agent
//!
//! The turn loop drives repeated model-gateway/dispatch cycles for one
//! conversation until the model answers in plain text. Dispatch classifies
//! and executes the tool calls a model response carries. Conversation state
//! lives behind the store seam so tests run against an in-memory double.

mod dispatch;
mod error;
mod prompt;
mod store;
mod turn;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use dispatch::Dispatcher;
pub use error::AgentError;
pub use prompt::build_system_prompt;
pub use store::{ConversationStore, SqliteStore};
pub use turn::SchedulingAgent;
