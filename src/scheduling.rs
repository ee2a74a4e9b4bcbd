//! Scheduling provider abstraction
//!
//! The agent's tools need three external capabilities: free-slot lookup on
//! the clinic calendar, event creation, and confirmation-email drafting.
//! This module defines the provider seam; `composio` implements it over the
//! Composio action API fronting Google Calendar and Gmail.

mod composio;
#[cfg(test)]
pub mod testing;
mod types;

pub use composio::ComposioProvider;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Scheduling provider error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SchedulingError {
    pub kind: SchedulingErrorKind,
    pub message: String,
}

impl SchedulingError {
    pub fn new(kind: SchedulingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SchedulingErrorKind::Network, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(SchedulingErrorKind::Provider, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(SchedulingErrorKind::Auth, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(SchedulingErrorKind::InvalidInput, message)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            SchedulingErrorKind::Network | SchedulingErrorKind::Provider
        )
    }
}

/// Error classification for the dispatch retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingErrorKind {
    /// Network issues, timeouts - retryable
    Network,
    /// Provider-side failure (5xx, quota) - retryable
    Provider,
    /// Authentication failed - not retryable
    Auth,
    /// Rejected input - not retryable
    InvalidInput,
}

/// External calendar/email capabilities consumed by the tools
#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    /// Free intervals on the clinic calendar in the queried window.
    async fn find_free_slots(&self, query: &FreeSlotQuery)
        -> Result<Vec<FreeSlot>, SchedulingError>;

    /// Create a calendar event. The only calendar-side effect this service
    /// produces.
    async fn create_event(&self, draft: &EventDraft) -> Result<CreatedEvent, SchedulingError>;

    /// Prepare a confirmation email draft in the clinic mailbox.
    async fn create_email_draft(
        &self,
        draft: &EmailDraft,
    ) -> Result<CreatedDraft, SchedulingError>;
}
