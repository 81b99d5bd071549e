use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle transitions that get audited. Creation and update are
/// intentionally silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    NotePublished,
    NoteUnpublished,
    NoteDeleted,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::NotePublished => "NOTE_PUBLISHED",
            AuditEventType::NoteUnpublished => "NOTE_UNPUBLISHED",
            AuditEventType::NoteDeleted => "NOTE_DELETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NOTE_PUBLISHED" => Some(AuditEventType::NotePublished),
            "NOTE_UNPUBLISHED" => Some(AuditEventType::NoteUnpublished),
            "NOTE_DELETED" => Some(AuditEventType::NoteDeleted),
            _ => None,
        }
    }
}

/// Immutable record of a lifecycle transition on a note.
///
/// `note_id` carries no foreign key - events outlive deleted notes.
/// `meta` is opaque JSON, never validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub note_id: String,
    #[serde(rename = "type")]
    pub event_type: AuditEventType,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}
