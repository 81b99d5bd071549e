//! Audit event table operations
//!
//! Append-only: events are never updated or deleted.

use rusqlite::Result as SqliteResult;

use super::super::Database;
use super::super::sqlite::{parse_db_time, to_db_time};
use crate::models::{AuditEvent, AuditEventType};

impl Database {
    pub fn insert_audit_event(&self, event: &AuditEvent) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO audit_events (id, note_id, type, at, meta)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                event.id,
                event.note_id,
                event.event_type.as_str(),
                to_db_time(&event.at),
                event.meta.as_ref().map(|m| m.to_string()),
            ],
        )?;

        Ok(())
    }

    /// All events, or only those for `note_id`, newest first.
    /// Ties on `at` resolve to the most recently inserted event.
    pub fn list_audit_events(&self, note_id: Option<&str>) -> SqliteResult<Vec<AuditEvent>> {
        let conn = self.conn.lock().unwrap();

        let sql_all = "SELECT id, note_id, type, at, meta FROM audit_events
             ORDER BY at DESC, rowid DESC";
        let sql_one = "SELECT id, note_id, type, at, meta FROM audit_events
             WHERE note_id = ?1 ORDER BY at DESC, rowid DESC";

        let mut stmt = conn.prepare(if note_id.is_some() { sql_one } else { sql_all })?;

        let events = if let Some(note_id) = note_id {
            stmt.query_map([note_id], |row| Self::row_to_audit_event(row))?
                .collect::<SqliteResult<Vec<_>>>()?
        } else {
            stmt.query_map([], |row| Self::row_to_audit_event(row))?
                .collect::<SqliteResult<Vec<_>>>()?
        };

        Ok(events)
    }

    fn row_to_audit_event(row: &rusqlite::Row) -> rusqlite::Result<AuditEvent> {
        let type_str: String = row.get(2)?;
        let at_str: String = row.get(3)?;
        let meta_str: Option<String> = row.get(4)?;

        Ok(AuditEvent {
            id: row.get(0)?,
            note_id: row.get(1)?,
            event_type: AuditEventType::from_str(&type_str)
                .unwrap_or(AuditEventType::NoteDeleted),
            at: parse_db_time(&at_str),
            meta: meta_str.and_then(|s| serde_json::from_str(&s).ok()),
        })
    }
}
