//! Audit recorder - pass-through over the audit store abstraction.
//!
//! Exists so the notes service depends on a stable call contract rather than
//! a storage concrete type; the SQLite and in-memory stores swap underneath
//! without touching lifecycle logic.

use std::sync::Arc;

use crate::db::AuditRepository;
use crate::error::ServiceError;
use crate::models::{AuditEvent, AuditEventType};

pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    pub fn record(
        &self,
        note_id: &str,
        event_type: AuditEventType,
        meta: Option<serde_json::Value>,
    ) -> Result<AuditEvent, ServiceError> {
        self.repo.record(note_id, event_type, meta)
    }

    pub fn list(&self, note_id: Option<&str>) -> Result<Vec<AuditEvent>, ServiceError> {
        self.repo.list(note_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryAuditRepository;
    use crate::identity::{IdentityProvider, SystemIdentity};

    fn test_service() -> AuditService {
        let identity: Arc<dyn IdentityProvider> = Arc::new(SystemIdentity);
        AuditService::new(Arc::new(InMemoryAuditRepository::new(identity)))
    }

    #[test]
    fn test_records_and_lists_events() {
        let service = test_service();

        service
            .record("note-1", AuditEventType::NotePublished, Some(serde_json::json!({"user": "dev"})))
            .expect("Failed to record event");

        let list = service.list(None).expect("Failed to list events");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].note_id, "note-1");
        assert_eq!(list[0].event_type, AuditEventType::NotePublished);
        assert_eq!(list[0].meta, Some(serde_json::json!({"user": "dev"})));
    }

    #[test]
    fn test_filters_by_note_id() {
        let service = test_service();

        service
            .record("note-1", AuditEventType::NotePublished, None)
            .expect("Failed to record event");
        service
            .record("note-2", AuditEventType::NoteDeleted, None)
            .expect("Failed to record event");

        let list = service.list(Some("note-2")).expect("Failed to list events");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].note_id, "note-2");
    }

    #[test]
    fn test_unknown_note_id_yields_empty_list() {
        let service = test_service();
        let list = service.list(Some("never-existed")).expect("Failed to list events");
        assert!(list.is_empty());
    }

    #[test]
    fn test_events_listed_newest_first() {
        let service = test_service();

        service
            .record("note-1", AuditEventType::NotePublished, None)
            .expect("Failed to record event");
        service
            .record("note-1", AuditEventType::NoteUnpublished, None)
            .expect("Failed to record event");

        let list = service.list(Some("note-1")).expect("Failed to list events");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].event_type, AuditEventType::NoteUnpublished);
        assert_eq!(list[1].event_type, AuditEventType::NotePublished);
    }
}
