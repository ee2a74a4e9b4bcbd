//! Availability lookup tool
//!
//! Always queries a fixed 3-day window starting at the requested date. The
//! model may ask for any span; the window is clamped here so result size
//! stays bounded and downstream date math stays simple.

use super::{Tool, ToolKind, ToolOutput};
use crate::scheduling::{FreeSlotQuery, SchedulingProvider};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Window applied to every availability query.
pub const AVAILABILITY_WINDOW_DAYS: u32 = 3;

pub struct FindSlotsTool {
    provider: Arc<dyn SchedulingProvider>,
    timezone: String,
}

#[derive(Debug, Deserialize)]
struct FindSlotsInput {
    /// First day of the window, YYYY-MM-DD
    date: NaiveDate,
    /// Accepted but ignored; the window is fixed.
    #[serde(default)]
    #[allow(dead_code)]
    span_days: Option<u32>,
    /// Accepted but ignored; the configured timezone wins.
    #[serde(default)]
    #[allow(dead_code)]
    timezone: Option<String>,
}

impl FindSlotsTool {
    pub fn new(provider: Arc<dyn SchedulingProvider>, timezone: String) -> Self {
        Self { provider, timezone }
    }
}

#[async_trait]
impl Tool for FindSlotsTool {
    fn name(&self) -> &str {
        "GOOGLECALENDAR_FIND_FREE_SLOTS"
    }

    fn description(&self) -> String {
        "Check free slots on the clinic calendar. Provide the requested date \
         (YYYY-MM-DD); availability is returned for three days starting there."
            .to_string()
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Read
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["date"],
            "properties": {
                "date": {
                    "type": "string",
                    "description": "First day to check, formatted YYYY-MM-DD"
                },
                "span_days": {
                    "type": "integer",
                    "description": "Number of days to check"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: FindSlotsInput = match serde_json::from_value(input) {
            Ok(i) => i,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let query = FreeSlotQuery {
            start_date: input.date,
            span_days: AVAILABILITY_WINDOW_DAYS,
            timezone: self.timezone.clone(),
        };

        match self.provider.find_free_slots(&query).await {
            Ok(slots) => ToolOutput::success(
                json!({
                    "timezone": self.timezone,
                    "slots": slots,
                })
                .to_string(),
            ),
            Err(e) if e.is_retryable() => {
                ToolOutput::transient(format!("Availability lookup failed: {e}"))
            }
            Err(e) => ToolOutput::error(format!("Availability lookup failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::testing::RecordingProvider;
    use crate::scheduling::FreeSlot;
    use chrono::NaiveDateTime;

    fn slot(start: &str, end: &str) -> FreeSlot {
        let fmt = "%Y-%m-%dT%H:%M:%S";
        FreeSlot {
            start: NaiveDateTime::parse_from_str(start, fmt).unwrap(),
            end: NaiveDateTime::parse_from_str(end, fmt).unwrap(),
        }
    }

    #[tokio::test]
    async fn clamps_window_to_three_days() {
        let provider = Arc::new(RecordingProvider::default());
        let tool = FindSlotsTool::new(provider.clone(), "UTC".to_string());

        // Model asks for one day; the query still spans three.
        let result = tool
            .run(json!({"date": "2025-03-04", "span_days": 1}))
            .await;
        assert!(result.success);

        let queries = provider.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].span_days, AVAILABILITY_WINDOW_DAYS);
        assert_eq!(
            queries[0].start_date,
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
        );
    }

    #[tokio::test]
    async fn configured_timezone_overrides_model_supplied_one() {
        let provider = Arc::new(RecordingProvider::default());
        let tool = FindSlotsTool::new(provider.clone(), "UTC".to_string());

        tool.run(json!({"date": "2025-03-04", "timezone": "Asia/Kolkata"}))
            .await;

        assert_eq!(provider.queries()[0].timezone, "UTC");
    }

    #[tokio::test]
    async fn reports_slots_as_json() {
        let provider = Arc::new(RecordingProvider::default());
        provider.set_slots(vec![slot("2025-03-04T14:00:00", "2025-03-04T15:00:00")]);
        let tool = FindSlotsTool::new(provider, "UTC".to_string());

        let result = tool.run(json!({"date": "2025-03-04"})).await;
        assert!(result.success);
        let parsed: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(parsed["slots"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn provider_outage_is_transient() {
        let provider = Arc::new(RecordingProvider::default());
        provider.fail_next_finds(1);
        let tool = FindSlotsTool::new(provider, "UTC".to_string());

        let result = tool.run(json!({"date": "2025-03-04"})).await;
        assert!(!result.success);
        assert!(result.retryable);
    }

    #[tokio::test]
    async fn malformed_date_is_a_terminal_error() {
        let provider = Arc::new(RecordingProvider::default());
        let tool = FindSlotsTool::new(provider.clone(), "UTC".to_string());

        let result = tool.run(json!({"date": "tomorrow"})).await;
        assert!(!result.success);
        assert!(!result.retryable);
        assert!(provider.queries().is_empty());
    }
}
