//! Recording provider double for tests

use super::types::{
    CreatedDraft, CreatedEvent, EmailDraft, EventDraft, FreeSlot, FreeSlotQuery,
};
use super::{SchedulingError, SchedulingProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Records every call and lets tests script failures. Failure counters are
/// consumed per call, so "fail twice then succeed" is a single setup line.
#[derive(Default)]
pub struct RecordingProvider {
    slots: Mutex<Vec<FreeSlot>>,
    queries: Mutex<Vec<FreeSlotQuery>>,
    events: Mutex<Vec<EventDraft>>,
    emails: Mutex<Vec<EmailDraft>>,
    find_failures: AtomicU32,
    event_failures: AtomicU32,
    email_failures: AtomicU32,
    event_attempts: AtomicU32,
    email_attempts: AtomicU32,
}

impl RecordingProvider {
    pub fn set_slots(&self, slots: Vec<FreeSlot>) {
        *self.slots.lock().unwrap() = slots;
    }

    pub fn fail_next_finds(&self, count: u32) {
        self.find_failures.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_events(&self, count: u32) {
        self.event_failures.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_emails(&self, count: u32) {
        self.email_failures.store(count, Ordering::SeqCst);
    }

    pub fn queries(&self) -> Vec<FreeSlotQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<EventDraft> {
        self.events.lock().unwrap().clone()
    }

    pub fn emails(&self) -> Vec<EmailDraft> {
        self.emails.lock().unwrap().clone()
    }

    pub fn event_attempts(&self) -> u32 {
        self.event_attempts.load(Ordering::SeqCst)
    }

    pub fn email_attempts(&self) -> u32 {
        self.email_attempts.load(Ordering::SeqCst)
    }

    fn should_fail(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SchedulingProvider for RecordingProvider {
    async fn find_free_slots(
        &self,
        query: &FreeSlotQuery,
    ) -> Result<Vec<FreeSlot>, SchedulingError> {
        self.queries.lock().unwrap().push(query.clone());
        if Self::should_fail(&self.find_failures) {
            return Err(SchedulingError::provider("calendar unavailable"));
        }
        Ok(self.slots.lock().unwrap().clone())
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<CreatedEvent, SchedulingError> {
        self.event_attempts.fetch_add(1, Ordering::SeqCst);
        if Self::should_fail(&self.event_failures) {
            return Err(SchedulingError::provider("calendar write failed"));
        }
        self.events.lock().unwrap().push(draft.clone());
        Ok(CreatedEvent {
            event_id: format!("evt_{}", self.events.lock().unwrap().len()),
        })
    }

    async fn create_email_draft(
        &self,
        draft: &EmailDraft,
    ) -> Result<CreatedDraft, SchedulingError> {
        self.email_attempts.fetch_add(1, Ordering::SeqCst);
        if Self::should_fail(&self.email_failures) {
            return Err(SchedulingError::provider("mailbox unavailable"));
        }
        self.emails.lock().unwrap().push(draft.clone());
        Ok(CreatedDraft {
            draft_id: format!("draft_{}", self.emails.lock().unwrap().len()),
        })
    }
}
