use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note record as stored and served.
///
/// `title` and `content` are never stored with surrounding whitespace; tags
/// never contain empty strings. `updated_at` is always >= `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a note. `published` is always false at creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Sparse patch for a note. A `None` field means "leave unchanged";
/// `tags: Some(vec![])` explicitly clears all tags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

/// One page of a note listing. `total` counts every record matching the
/// filter, ignoring pagination.
#[derive(Debug, Clone, Serialize)]
pub struct NotesPage {
    pub total: i64,
    pub items: Vec<Note>,
}
