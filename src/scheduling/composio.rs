//! Composio-backed scheduling provider
//!
//! Executes the Google Calendar / Gmail actions through the Composio action
//! API. One HTTP shape for every action: POST
//! `{base}/api/v2/actions/{action}/execute` with the action input under
//! `input`, result payload under `data`.

use super::types::{
    CreatedDraft, CreatedEvent, EmailDraft, EventDraft, FreeSlot, FreeSlotQuery, ReminderPolicy,
};
use super::{SchedulingError, SchedulingProvider};
use async_trait::async_trait;
use chrono::{Days, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://backend.composio.dev";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct ComposioProvider {
    client: Client,
    api_key: String,
    base_url: String,
    entity_id: String,
}

impl ComposioProvider {
    pub fn new(api_key: String, base_url: Option<String>, entity_id: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            entity_id: entity_id.unwrap_or_else(|| "default".to_string()),
        }
    }

    async fn execute_action(&self, action: &str, input: Value) -> Result<Value, SchedulingError> {
        let url = format!(
            "{}/api/v2/actions/{action}/execute",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&json!({
                "entityId": self.entity_id,
                "input": input,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SchedulingError::network(format!("{action} timed out: {e}"))
                } else {
                    SchedulingError::network(format!("{action} request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SchedulingError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => SchedulingError::auth(format!("{action}: {body}")),
                400 | 404 | 422 => SchedulingError::invalid_input(format!("{action}: {body}")),
                _ => SchedulingError::provider(format!("{action}: HTTP {status}: {body}")),
            });
        }

        let envelope: ActionEnvelope = serde_json::from_str(&body).map_err(|e| {
            SchedulingError::provider(format!("{action}: unparseable response: {e}"))
        })?;

        if !envelope.successful {
            let detail = envelope.error.unwrap_or_else(|| "action failed".to_string());
            return Err(SchedulingError::provider(format!("{action}: {detail}")));
        }

        Ok(envelope.data)
    }

    fn parse_slots(data: &Value) -> Result<Vec<FreeSlot>, SchedulingError> {
        let raw = data
            .get("slots")
            .and_then(Value::as_array)
            .ok_or_else(|| SchedulingError::provider("free-slot response missing slots"))?;

        raw.iter()
            .map(|slot| {
                let start = Self::parse_datetime(slot.get("start"))?;
                let end = Self::parse_datetime(slot.get("end"))?;
                Ok(FreeSlot { start, end })
            })
            .collect()
    }

    fn parse_datetime(value: Option<&Value>) -> Result<NaiveDateTime, SchedulingError> {
        let text = value
            .and_then(Value::as_str)
            .ok_or_else(|| SchedulingError::provider("slot boundary missing"))?;
        NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
            .map_err(|e| SchedulingError::provider(format!("bad slot datetime {text:?}: {e}")))
    }

    fn extract_id(data: &Value, keys: &[&str]) -> Result<String, SchedulingError> {
        keys.iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str))
            .map(String::from)
            .ok_or_else(|| SchedulingError::provider("response carried no identifier"))
    }
}

#[async_trait]
impl SchedulingProvider for ComposioProvider {
    async fn find_free_slots(
        &self,
        query: &FreeSlotQuery,
    ) -> Result<Vec<FreeSlot>, SchedulingError> {
        let time_min = query
            .start_date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid");
        let time_max = query
            .start_date
            .checked_add_days(Days::new(u64::from(query.span_days)))
            .ok_or_else(|| SchedulingError::invalid_input("window end out of range"))?
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid");

        let data = self
            .execute_action(
                "GOOGLECALENDAR_FIND_FREE_SLOTS",
                json!({
                    "time_min": time_min.format(DATETIME_FORMAT).to_string(),
                    "time_max": time_max.format(DATETIME_FORMAT).to_string(),
                    "timezone": query.timezone,
                }),
            )
            .await?;

        Self::parse_slots(&data)
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<CreatedEvent, SchedulingError> {
        let reminders = match draft.reminders {
            ReminderPolicy::Default => json!({"useDefault": true}),
            ReminderPolicy::PopupMinutesBefore(minutes) => json!({
                "useDefault": false,
                "overrides": [{"method": "popup", "minutes": minutes}],
            }),
        };

        let data = self
            .execute_action(
                "GOOGLECALENDAR_CREATE_EVENT",
                json!({
                    "summary": draft.title,
                    "location": draft.location,
                    "description": draft.description,
                    "start": {
                        "dateTime": draft.start.date_time.format(DATETIME_FORMAT).to_string(),
                        "timeZone": draft.start.timezone,
                    },
                    "end": {
                        "dateTime": draft.end.date_time.format(DATETIME_FORMAT).to_string(),
                        "timeZone": draft.end.timezone,
                    },
                    "reminders": reminders,
                }),
            )
            .await?;

        Ok(CreatedEvent {
            event_id: Self::extract_id(&data, &["id", "event_id"])?,
        })
    }

    async fn create_email_draft(
        &self,
        draft: &EmailDraft,
    ) -> Result<CreatedDraft, SchedulingError> {
        let data = self
            .execute_action(
                "GMAIL_CREATE_EMAIL_DRAFT",
                json!({
                    "recipient_email": draft.recipient,
                    "subject": draft.subject,
                    "body": draft.body,
                }),
            )
            .await?;

        Ok(CreatedDraft {
            draft_id: Self::extract_id(&data, &["id", "draft_id"])?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    #[serde(default)]
    data: Value,
    #[serde(default, alias = "successfull")]
    successful: bool,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slot_list() {
        let data = json!({
            "slots": [
                {"start": "2025-03-04T14:00:00", "end": "2025-03-04T15:00:00"},
                {"start": "2025-03-04T16:00:00", "end": "2025-03-04T17:00:00"},
            ]
        });
        let slots = ComposioProvider::parse_slots(&data).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(
            slots[0].start,
            NaiveDateTime::parse_from_str("2025-03-04T14:00:00", DATETIME_FORMAT).unwrap()
        );
    }

    #[test]
    fn missing_slots_is_a_provider_error() {
        let err = ComposioProvider::parse_slots(&json!({})).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn extracts_event_id_under_either_key() {
        let by_id = json!({"id": "evt_1"});
        let by_event_id = json!({"event_id": "evt_2"});
        assert_eq!(
            ComposioProvider::extract_id(&by_id, &["id", "event_id"]).unwrap(),
            "evt_1"
        );
        assert_eq!(
            ComposioProvider::extract_id(&by_event_id, &["id", "event_id"]).unwrap(),
            "evt_2"
        );
    }

    #[test]
    fn action_envelope_accepts_both_spellings() {
        let canonical: ActionEnvelope =
            serde_json::from_str(r#"{"data": {}, "successful": true}"#).unwrap();
        assert!(canonical.successful);
        let legacy: ActionEnvelope =
            serde_json::from_str(r#"{"data": {}, "successfull": true}"#).unwrap();
        assert!(legacy.successful);
    }
}
