//! In-memory storage backends.
//!
//! Used by tests as a faithful proxy for the SQLite backend and as the
//! fallback when the database cannot be opened. Filtering and pagination
//! behave exactly like the SQL queries in `db::tables`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{AuditRepository, ListNotesParams, NotesRepository};
use crate::error::ServiceError;
use crate::identity::IdentityProvider;
use crate::models::{AuditEvent, AuditEventType, Note, NotesPage};

#[derive(Default)]
pub struct InMemoryNotesRepository {
    notes: Mutex<HashMap<String, Note>>,
}

impl InMemoryNotesRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(note: &Note, params: &ListNotesParams) -> bool {
    if let Some(published) = params.published {
        if note.published != published {
            return false;
        }
    }
    if let Some(tag) = &params.tag {
        if !note.tags.iter().any(|t| t == tag) {
            return false;
        }
    }
    if let Some(q) = &params.q {
        // SQLite LIKE folds ASCII case only; match that here
        let q = q.to_ascii_lowercase();
        let hay = format!("{}\n{}", note.title, note.content).to_ascii_lowercase();
        if !hay.contains(&q) {
            return false;
        }
    }
    true
}

impl NotesRepository for InMemoryNotesRepository {
    fn list(&self, params: &ListNotesParams) -> Result<NotesPage, ServiceError> {
        let notes = self.notes.lock().unwrap();

        let mut filtered: Vec<Note> = notes.values().filter(|n| matches(n, params)).cloned().collect();
        // same order as the SQL query: created_at desc, id desc
        filtered.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = filtered.len() as i64;
        let items = filtered
            .into_iter()
            .skip(params.offset.max(0) as usize)
            .take(params.limit.max(0) as usize)
            .collect();

        Ok(NotesPage { total, items })
    }

    fn get(&self, id: &str) -> Result<Option<Note>, ServiceError> {
        let notes = self.notes.lock().unwrap();
        Ok(notes.get(id).cloned())
    }

    fn create(&self, note: &Note) -> Result<(), ServiceError> {
        let mut notes = self.notes.lock().unwrap();
        if notes.contains_key(&note.id) {
            return Err(ServiceError::Storage(format!(
                "note {} already exists",
                note.id
            )));
        }
        notes.insert(note.id.clone(), note.clone());
        Ok(())
    }

    fn update(&self, note: &Note) -> Result<(), ServiceError> {
        let mut notes = self.notes.lock().unwrap();
        notes.insert(note.id.clone(), note.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), ServiceError> {
        let mut notes = self.notes.lock().unwrap();
        notes.remove(id);
        Ok(())
    }
}

/// Append-only in-memory audit log, newest first
pub struct InMemoryAuditRepository {
    events: Mutex<Vec<AuditEvent>>,
    identity: Arc<dyn IdentityProvider>,
}

impl InMemoryAuditRepository {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            identity,
        }
    }
}

impl AuditRepository for InMemoryAuditRepository {
    fn record(
        &self,
        note_id: &str,
        event_type: AuditEventType,
        meta: Option<serde_json::Value>,
    ) -> Result<AuditEvent, ServiceError> {
        let event = AuditEvent {
            id: self.identity.new_id(),
            note_id: note_id.to_string(),
            event_type,
            at: self.identity.now(),
            meta,
        };
        let mut events = self.events.lock().unwrap();
        events.insert(0, event.clone());
        Ok(event)
    }

    fn list(&self, note_id: Option<&str>) -> Result<Vec<AuditEvent>, ServiceError> {
        let events = self.events.lock().unwrap();
        match note_id {
            Some(note_id) => Ok(events.iter().filter(|e| e.note_id == note_id).cloned().collect()),
            None => Ok(events.clone()),
        }
    }
}
