//! Database module
//!
//! Persists conversation history per thread key and the appointments the
//! agent has booked.

mod schema;

pub use schema::*;

use crate::llm::{Message, Role};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt message payload: {0}")]
    CorruptMessage(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Conversation Operations ====================

    /// Append one message to a thread's history. Creates the conversation
    /// row on first append.
    pub fn append_message(&self, thread_key: &str, message: &Message) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO conversations (thread_key, created_at, updated_at)
             VALUES (?1, ?2, ?2)
             ON CONFLICT(thread_key) DO UPDATE SET updated_at = ?2",
            params![thread_key, now],
        )?;

        let next_seq: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sequence_id), 0) + 1 FROM messages WHERE thread_key = ?1",
            params![thread_key],
            |row| row.get(0),
        )?;

        let content = serde_json::to_string(&message.content)?;
        conn.execute(
            "INSERT INTO messages (id, thread_key, sequence_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                uuid::Uuid::new_v4().to_string(),
                thread_key,
                next_seq,
                role_to_str(message.role),
                content,
                now
            ],
        )?;

        Ok(())
    }

    /// Full ordered history for a thread. Empty for unknown threads.
    pub fn get_messages(&self, thread_key: &str) -> DbResult<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT role, content FROM messages
             WHERE thread_key = ?1 ORDER BY sequence_id ASC",
        )?;

        let rows = stmt.query_map(params![thread_key], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (role, content) = row?;
            messages.push(Message {
                role: role_from_str(&role),
                content: serde_json::from_str(&content)?,
            });
        }
        Ok(messages)
    }

    // ==================== Appointment Operations ====================

    /// Record a booked appointment. `calendar_event_id` stays NULL until the
    /// calendar write is confirmed, so retried bookings can report the same
    /// integration status.
    pub fn record_appointment(&self, appointment: &NewAppointment<'_>) -> DbResult<Appointment> {
        let conn = self.conn.lock().unwrap();
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO appointments
               (id, thread_key, title, starts_at, ends_at, location, description,
                calendar_event_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                appointment.thread_key,
                appointment.title,
                appointment.starts_at,
                appointment.ends_at,
                appointment.location,
                appointment.description,
                appointment.calendar_event_id,
                now.to_rfc3339()
            ],
        )?;

        Ok(Appointment {
            id,
            thread_key: appointment.thread_key.to_string(),
            title: appointment.title.to_string(),
            starts_at: appointment.starts_at.to_string(),
            ends_at: appointment.ends_at.to_string(),
            location: appointment.location.map(String::from),
            description: appointment.description.map(String::from),
            calendar_event_id: appointment.calendar_event_id.map(String::from),
            created_at: now,
        })
    }

    /// Appointments booked from a given thread, newest first.
    pub fn appointments_for_thread(&self, thread_key: &str) -> DbResult<Vec<Appointment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, thread_key, title, starts_at, ends_at, location, description,
                    calendar_event_id, created_at
             FROM appointments WHERE thread_key = ?1
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![thread_key], |row| {
            Ok(Appointment {
                id: row.get(0)?,
                thread_key: row.get(1)?,
                title: row.get(2)?,
                starts_at: row.get(3)?,
                ends_at: row.get(4)?,
                location: row.get(5)?,
                description: row.get(6)?,
                calendar_event_id: row.get(7)?,
                created_at: parse_datetime(&row.get::<_, String>(8)?),
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn role_from_str(role: &str) -> Role {
    match role {
        "assistant" => Role::Assistant,
        "tool" => Role::Tool,
        _ => Role::User,
    }
}
