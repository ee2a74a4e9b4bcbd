//! Confirmation email draft tool

use super::{Tool, ToolKind, ToolOutput};
use crate::scheduling::{EmailDraft, SchedulingProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct DraftEmailTool {
    provider: Arc<dyn SchedulingProvider>,
}

#[derive(Debug, Deserialize)]
struct DraftEmailInput {
    recipient: String,
    subject: String,
    body: String,
}

impl DraftEmailTool {
    pub fn new(provider: Arc<dyn SchedulingProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for DraftEmailTool {
    fn name(&self) -> &str {
        "GMAIL_CREATE_EMAIL_DRAFT"
    }

    fn description(&self) -> String {
        "Prepare a confirmation email draft for the user after a booking. \
         Provide recipient address, subject and body."
            .to_string()
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Write
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["recipient", "subject", "body"],
            "properties": {
                "recipient": {
                    "type": "string",
                    "description": "Recipient email address"
                },
                "subject": {"type": "string"},
                "body": {"type": "string"}
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: DraftEmailInput = match serde_json::from_value(input) {
            Ok(i) => i,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        if !input.recipient.contains('@') {
            return ToolOutput::error(format!("Not an email address: {}", input.recipient));
        }

        let draft = EmailDraft {
            recipient: input.recipient,
            subject: input.subject,
            body: input.body,
        };

        match self.provider.create_email_draft(&draft).await {
            Ok(created) => {
                ToolOutput::success(json!({"draft_id": created.draft_id}).to_string())
            }
            Err(e) if e.is_retryable() => {
                ToolOutput::transient(format!("Email draft failed: {e}"))
            }
            Err(e) => ToolOutput::error(format!("Email draft failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::testing::RecordingProvider;

    #[tokio::test]
    async fn drafts_confirmation_email() {
        let provider = Arc::new(RecordingProvider::default());
        let tool = DraftEmailTool::new(provider.clone());

        let result = tool
            .run(json!({
                "recipient": "a@b.com",
                "subject": "Your appointment",
                "body": "See you Tuesday at 2pm.",
            }))
            .await;
        assert!(result.success);

        let emails = provider.emails();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].recipient, "a@b.com");
    }

    #[tokio::test]
    async fn rejects_non_address_recipient() {
        let provider = Arc::new(RecordingProvider::default());
        let tool = DraftEmailTool::new(provider.clone());

        let result = tool
            .run(json!({
                "recipient": "not-an-address",
                "subject": "s",
                "body": "b",
            }))
            .await;
        assert!(!result.success);
        assert!(!result.retryable);
        assert!(provider.emails().is_empty());
    }

    #[tokio::test]
    async fn missing_field_is_invalid_input() {
        let provider = Arc::new(RecordingProvider::default());
        let tool = DraftEmailTool::new(provider);

        let result = tool.run(json!({"recipient": "a@b.com"})).await;
        assert!(!result.success);
    }
}
