//! SQLite-backed storage.
//!
//! `Database` owns the connection and the schema; the per-table operations
//! live in `db::tables`. `SqliteNotesRepository` and `SqliteAuditRepository`
//! adapt those operations to the repository traits the services depend on.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

use super::{AuditRepository, ListNotesParams, NotesRepository};
use crate::error::ServiceError;
use crate::identity::IdentityProvider;
use crate::models::{AuditEvent, AuditEventType, Note, NotesPage};

/// Database wrapping a SQLite connection
pub struct Database {
    pub(super) conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at `path` and initialize the schema.
    ///
    /// No foreign key from audit_events.note_id to notes.id: audit events
    /// outlive deleted notes.
    pub fn new(path: &str) -> SqliteResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                tags TEXT NOT NULL,
                published INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS audit_events (
                id TEXT PRIMARY KEY,
                note_id TEXT NOT NULL,
                type TEXT NOT NULL,
                at TEXT NOT NULL,
                meta TEXT
            );",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Timestamps are stored fixed-width (microseconds, Z suffix) so that
/// lexicographic ORDER BY on the column is chronological.
pub(super) fn to_db_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn parse_db_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .unwrap()
        .with_timezone(&Utc)
}

/// Durable notes store over the shared `Database`
pub struct SqliteNotesRepository {
    db: Arc<Database>,
}

impl SqliteNotesRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl NotesRepository for SqliteNotesRepository {
    fn list(&self, params: &ListNotesParams) -> Result<NotesPage, ServiceError> {
        Ok(self.db.list_notes(params)?)
    }

    fn get(&self, id: &str) -> Result<Option<Note>, ServiceError> {
        Ok(self.db.get_note(id)?)
    }

    fn create(&self, note: &Note) -> Result<(), ServiceError> {
        Ok(self.db.create_note(note)?)
    }

    fn update(&self, note: &Note) -> Result<(), ServiceError> {
        Ok(self.db.update_note(note)?)
    }

    fn remove(&self, id: &str) -> Result<(), ServiceError> {
        Ok(self.db.remove_note(id)?)
    }
}

/// Durable audit store over the shared `Database`
pub struct SqliteAuditRepository {
    db: Arc<Database>,
    identity: Arc<dyn IdentityProvider>,
}

impl SqliteAuditRepository {
    pub fn new(db: Arc<Database>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, identity }
    }
}

impl AuditRepository for SqliteAuditRepository {
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
        self.db.insert_audit_event(&event)?;
        Ok(event)
    }

    fn list(&self, note_id: Option<&str>) -> Result<Vec<AuditEvent>, ServiceError> {
        Ok(self.db.list_audit_events(note_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SystemIdentity;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn open_db(dir: &tempfile::TempDir) -> Arc<Database> {
        let db_path = dir.path().join("test.db");
        Arc::new(Database::new(db_path.to_str().unwrap()).expect("Failed to open db"))
    }

    fn note_at(id: &str, seconds: i64) -> Note {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds);
        Note {
            id: id.to_string(),
            title: format!("Note {}", id),
            content: "content".to_string(),
            tags: vec!["a".to_string(), "a".to_string(), "b".to_string()],
            published: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_note_roundtrip() {
        let dir = tempdir().unwrap();
        let repo = SqliteNotesRepository::new(open_db(&dir));

        let note = note_at("n1", 0);
        repo.create(&note).expect("Failed to create note");

        let stored = repo.get("n1").expect("Failed to get note").expect("Note missing");
        assert_eq!(stored.title, note.title);
        assert_eq!(stored.content, note.content);
        // order and duplicates preserved
        assert_eq!(stored.tags, vec!["a", "a", "b"]);
        assert!(!stored.published);
        assert_eq!(stored.created_at, note.created_at);

        let mut next = stored.clone();
        next.title = "Renamed".to_string();
        next.published = true;
        next.tags = vec![];
        repo.update(&next).expect("Failed to update note");

        let stored = repo.get("n1").expect("Failed to get note").expect("Note missing");
        assert_eq!(stored.title, "Renamed");
        assert!(stored.published);
        assert!(stored.tags.is_empty());

        repo.remove("n1").expect("Failed to remove note");
        assert!(repo.get("n1").expect("Failed to get note").is_none());
        // removing again is a no-op
        repo.remove("n1").expect("Failed to remove absent note");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let dir = tempdir().unwrap();
        let repo = SqliteNotesRepository::new(open_db(&dir));

        repo.create(&note_at("n1", 0)).expect("Failed to create note");
        let err = repo.create(&note_at("n1", 1));
        assert!(matches!(err, Err(ServiceError::Storage(_))));
    }

    #[test]
    fn test_list_orders_newest_first() {
        let dir = tempdir().unwrap();
        let repo = SqliteNotesRepository::new(open_db(&dir));

        repo.create(&note_at("n1", 0)).expect("Failed to create note");
        repo.create(&note_at("n2", 10)).expect("Failed to create note");
        repo.create(&note_at("n3", 5)).expect("Failed to create note");

        let page = repo
            .list(&ListNotesParams { limit: 20, offset: 0, ..Default::default() })
            .expect("Failed to list");
        let ids: Vec<&str> = page.items.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n2", "n3", "n1"]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_q_wildcards_are_literal() {
        let dir = tempdir().unwrap();
        let repo = SqliteNotesRepository::new(open_db(&dir));

        let mut note = note_at("n1", 0);
        note.content = "100% done".to_string();
        repo.create(&note).expect("Failed to create note");
        repo.create(&note_at("n2", 1)).expect("Failed to create note");

        let page = repo
            .list(&ListNotesParams {
                limit: 20,
                offset: 0,
                q: Some("100%".to_string()),
                ..Default::default()
            })
            .expect("Failed to list");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "n1");
    }

    #[test]
    fn test_audit_events_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("audit.db");
        let identity: Arc<dyn IdentityProvider> = Arc::new(SystemIdentity);

        {
            let db = Arc::new(Database::new(db_path.to_str().unwrap()).expect("Failed to open db"));
            let repo = SqliteAuditRepository::new(db, identity.clone());
            repo.record("note-1", AuditEventType::NotePublished, Some(serde_json::json!({"title": "T"})))
                .expect("Failed to record event");
            repo.record("note-2", AuditEventType::NoteDeleted, None)
                .expect("Failed to record event");
        }

        let db = Arc::new(Database::new(db_path.to_str().unwrap()).expect("Failed to reopen db"));
        let repo = SqliteAuditRepository::new(db, identity);

        let all = repo.list(None).expect("Failed to list events");
        assert_eq!(all.len(), 2);
        // newest first
        assert_eq!(all[0].note_id, "note-2");
        assert_eq!(all[0].event_type, AuditEventType::NoteDeleted);
        assert!(all[0].meta.is_none());
        assert_eq!(all[1].meta, Some(serde_json::json!({"title": "T"})));

        let filtered = repo.list(Some("note-1")).expect("Failed to list events");
        assert_eq!(filtered.len(), 1);

        let unknown = repo.list(Some("never-existed")).expect("Failed to list events");
        assert!(unknown.is_empty());
    }
}
