//! Scheduling provider data types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Availability query. `span_days` is fixed by the dispatch policy, not by
/// the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeSlotQuery {
    pub start_date: NaiveDate,
    pub span_days: u32,
    pub timezone: String,
}

/// One free interval on the calendar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FreeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Event time with its timezone, as the calendar API expects it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventTime {
    pub date_time: NaiveDateTime,
    pub timezone: String,
}

/// Reminder policy attached to created events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderPolicy {
    /// Calendar-default reminders
    #[default]
    Default,
    /// Single popup reminder this many minutes before the event
    PopupMinutesBefore(u32),
}

/// Calendar event to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub reminders: ReminderPolicy,
}

/// Created event handle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedEvent {
    pub event_id: String,
}

/// Confirmation email draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Created draft handle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedDraft {
    pub draft_id: String,
}
