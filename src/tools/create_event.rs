//! Calendar event creation tool
//!
//! The start and end times always carry the service's configured timezone;
//! whatever timezone the model supplies is discarded. Confirmed bookings are
//! recorded locally with the external event identifier.

use super::{Tool, ToolKind, ToolOutput};
use crate::db::{Database, NewAppointment};
use crate::scheduling::{EventDraft, EventTime, ReminderPolicy, SchedulingProvider};
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const DEFAULT_DURATION_MINUTES: i64 = 60;

pub struct CreateEventTool {
    provider: Arc<dyn SchedulingProvider>,
    db: Database,
    timezone: String,
}

#[derive(Debug, Deserialize)]
struct CreateEventInput {
    title: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// Event start, YYYY-MM-DDTHH:MM:SS
    start_datetime: NaiveDateTime,
    /// Defaults to one hour after the start
    #[serde(default)]
    end_datetime: Option<NaiveDateTime>,
    /// Accepted but ignored; the configured timezone wins.
    #[serde(default)]
    #[allow(dead_code)]
    timezone: Option<String>,
    /// Conversation thread this booking belongs to, injected by dispatch
    #[serde(default)]
    thread_key: Option<String>,
}

impl CreateEventTool {
    pub fn new(provider: Arc<dyn SchedulingProvider>, db: Database, timezone: String) -> Self {
        Self {
            provider,
            db,
            timezone,
        }
    }
}

#[async_trait]
impl Tool for CreateEventTool {
    fn name(&self) -> &str {
        "GOOGLECALENDAR_CREATE_EVENT"
    }

    fn description(&self) -> String {
        "Create the appointment on the clinic calendar once the user has \
         confirmed a specific time. Provide title and start time; the end \
         time defaults to one hour later."
            .to_string()
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Write
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["title", "start_datetime"],
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Event title, e.g. 'Checkup with Dr. Lee'"
                },
                "location": {"type": "string"},
                "description": {"type": "string"},
                "start_datetime": {
                    "type": "string",
                    "description": "Start time, formatted YYYY-MM-DDTHH:MM:SS"
                },
                "end_datetime": {
                    "type": "string",
                    "description": "End time; omit for a one-hour appointment"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: CreateEventInput = match serde_json::from_value(input) {
            Ok(i) => i,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let end = input
            .end_datetime
            .unwrap_or(input.start_datetime + Duration::minutes(DEFAULT_DURATION_MINUTES));
        if end <= input.start_datetime {
            return ToolOutput::error("Event must end after it starts");
        }

        let draft = EventDraft {
            title: input.title.clone(),
            location: input.location.clone(),
            description: input.description.clone(),
            start: EventTime {
                date_time: input.start_datetime,
                timezone: self.timezone.clone(),
            },
            end: EventTime {
                date_time: end,
                timezone: self.timezone.clone(),
            },
            reminders: ReminderPolicy::PopupMinutesBefore(30),
        };

        let created = match self.provider.create_event(&draft).await {
            Ok(created) => created,
            Err(e) if e.is_retryable() => {
                return ToolOutput::transient(format!("Event creation failed: {e}"));
            }
            Err(e) => return ToolOutput::error(format!("Event creation failed: {e}")),
        };

        let recorded = self.db.record_appointment(&NewAppointment {
            thread_key: input.thread_key.as_deref().unwrap_or(""),
            title: &input.title,
            starts_at: &input.start_datetime.format("%Y-%m-%dT%H:%M:%S").to_string(),
            ends_at: &end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            location: input.location.as_deref(),
            description: input.description.as_deref(),
            calendar_event_id: Some(&created.event_id),
        });
        if let Err(e) = recorded {
            // The calendar write already happened; losing the local record
            // must not fail the booking.
            tracing::warn!(error = %e, event_id = %created.event_id, "Failed to record appointment");
        }

        ToolOutput::success(
            json!({
                "event_id": created.event_id,
                "timezone": self.timezone,
            })
            .to_string(),
        )
    }
}
