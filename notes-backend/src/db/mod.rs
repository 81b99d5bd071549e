pub mod memory;
pub mod sqlite;
pub mod tables;

pub use sqlite::Database;

use crate::error::ServiceError;
use crate::models::{AuditEvent, AuditEventType, Note, NotesPage};

/// Filter and pagination parameters for a note listing.
/// All filter fields are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct ListNotesParams {
    pub limit: i64,
    pub offset: i64,
    /// Case-insensitive substring match against title and content
    pub q: Option<String>,
    /// Membership test against the note's tags
    pub tag: Option<String>,
    /// Exact match on the publish state
    pub published: Option<bool>,
}

/// Keyed collection of note records.
///
/// The SQLite and in-memory implementations must produce identical
/// filtering and pagination results so tests can run against either.
pub trait NotesRepository: Send + Sync {
    fn list(&self, params: &ListNotesParams) -> Result<NotesPage, ServiceError>;
    fn get(&self, id: &str) -> Result<Option<Note>, ServiceError>;
    /// Persists a fully-formed record; errors if the id already exists
    fn create(&self, note: &Note) -> Result<(), ServiceError>;
    /// Full-record replace. Partial-patch semantics live in the service layer.
    fn update(&self, note: &Note) -> Result<(), ServiceError>;
    /// Removing an absent id is not an error; callers check existence first
    fn remove(&self, id: &str) -> Result<(), ServiceError>;
}

/// Append-only log of lifecycle events keyed by note id.
pub trait AuditRepository: Send + Sync {
    /// Synthesizes id and timestamp server-side, appends, returns the stored
    /// event. Never checks that the referenced note exists.
    fn record(
        &self,
        note_id: &str,
        event_type: AuditEventType,
        meta: Option<serde_json::Value>,
    ) -> Result<AuditEvent, ServiceError>;

    /// All events, or only those for `note_id`, newest first
    fn list(&self, note_id: Option<&str>) -> Result<Vec<AuditEvent>, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryNotesRepository;
    use super::sqlite::{Database, SqliteNotesRepository};
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn sample_note(n: i64, title: &str, content: &str, tags: &[&str], published: bool) -> Note {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(n);
        Note {
            id: format!("note-{:03}", n),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published,
            created_at: at,
            updated_at: at,
        }
    }

    fn seed(repo: &dyn NotesRepository) {
        let notes = vec![
            sample_note(1, "Shopping list", "milk and eggs", &["home"], false),
            sample_note(2, "Release notes", "hello world", &["work", "dev"], true),
            sample_note(3, "Meeting minutes", "quarterly HELLO review", &["work"], true),
            sample_note(4, "Scratch", "", &[], false),
            sample_note(5, "Hello again", "draft", &["home", "dev"], false),
        ];
        for note in &notes {
            repo.create(note).expect("Failed to seed note");
        }
    }

    /// The portability invariant: both backends page and filter identically.
    #[test]
    fn test_sqlite_and_memory_backends_list_identically() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("parity.db");
        let db = Arc::new(Database::new(db_path.to_str().unwrap()).expect("Failed to open db"));
        let durable = SqliteNotesRepository::new(db);
        let in_memory = InMemoryNotesRepository::new();

        seed(&durable);
        seed(&in_memory);

        let cases = vec![
            ListNotesParams { limit: 20, offset: 0, ..Default::default() },
            ListNotesParams { limit: 2, offset: 0, ..Default::default() },
            ListNotesParams { limit: 2, offset: 2, ..Default::default() },
            ListNotesParams { limit: 20, offset: 10, ..Default::default() },
            ListNotesParams { limit: 20, offset: 0, published: Some(true), ..Default::default() },
            ListNotesParams { limit: 20, offset: 0, tag: Some("dev".to_string()), ..Default::default() },
            ListNotesParams { limit: 20, offset: 0, q: Some("hello".to_string()), ..Default::default() },
            ListNotesParams {
                limit: 20,
                offset: 0,
                q: Some("hello".to_string()),
                tag: Some("work".to_string()),
                published: Some(true),
                ..Default::default()
            },
        ];

        for params in cases {
            let a = durable.list(&params).expect("Failed to list from sqlite");
            let b = in_memory.list(&params).expect("Failed to list from memory");
            assert_eq!(a.total, b.total, "total mismatch for {:?}", params);
            let ids_a: Vec<&str> = a.items.iter().map(|n| n.id.as_str()).collect();
            let ids_b: Vec<&str> = b.items.iter().map(|n| n.id.as_str()).collect();
            assert_eq!(ids_a, ids_b, "page mismatch for {:?}", params);
        }
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let repo = InMemoryNotesRepository::new();
        seed(&repo);

        let page = repo
            .list(&ListNotesParams {
                limit: 20,
                offset: 0,
                q: Some("hello".to_string()),
                tag: Some("work".to_string()),
                published: Some(true),
                ..Default::default()
            })
            .expect("Failed to list");

        // note-2 (content "hello world") and note-3 (content contains HELLO)
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|n| n.published));
        assert!(page.items.iter().all(|n| n.tags.contains(&"work".to_string())));
    }

    #[test]
    fn test_pagination_bounds() {
        let repo = InMemoryNotesRepository::new();
        seed(&repo);

        // N = 5 matching records: min(L, max(0, N - O)) items, total always N
        let page = repo
            .list(&ListNotesParams { limit: 3, offset: 4, ..Default::default() })
            .expect("Failed to list");
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 1);

        let page = repo
            .list(&ListNotesParams { limit: 3, offset: 5, ..Default::default() })
            .expect("Failed to list");
        assert_eq!(page.total, 5);
        assert!(page.items.is_empty());
    }
}
