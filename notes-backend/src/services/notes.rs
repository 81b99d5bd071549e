//! Notes lifecycle manager.
//!
//! Owns all note mutation: input normalization, sparse-patch updates, and
//! the audit events that publish/unpublish/delete transitions append.
//! Creation and update are intentionally not audited.

use std::sync::Arc;

use crate::db::{ListNotesParams, NotesRepository};
use crate::error::ServiceError;
use crate::identity::IdentityProvider;
use crate::models::{AuditEventType, CreateNoteRequest, Note, NotesPage, UpdateNoteRequest};
use crate::services::AuditService;

const DEFAULT_LIST_LIMIT: i64 = 20;

/// Listing parameters as they arrive from the boundary; limit and offset
/// defaults are applied here.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub q: Option<String>,
    pub tag: Option<String>,
    pub published: Option<bool>,
}

pub struct NotesService {
    notes_repo: Arc<dyn NotesRepository>,
    audit: Arc<AuditService>,
    identity: Arc<dyn IdentityProvider>,
}

impl NotesService {
    pub fn new(
        notes_repo: Arc<dyn NotesRepository>,
        audit: Arc<AuditService>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            notes_repo,
            audit,
            identity,
        }
    }

    pub fn list(&self, req: ListNotesRequest) -> Result<NotesPage, ServiceError> {
        self.notes_repo.list(&ListNotesParams {
            limit: req.limit.unwrap_or(DEFAULT_LIST_LIMIT).max(0),
            offset: req.offset.unwrap_or(0).max(0),
            q: req.q,
            tag: req.tag,
            published: req.published,
        })
    }

    /// The single not-found point every other operation reuses
    pub fn get(&self, id: &str) -> Result<Note, ServiceError> {
        self.notes_repo.get(id)?.ok_or(ServiceError::NotFound)
    }

    pub fn create(&self, req: CreateNoteRequest) -> Result<Note, ServiceError> {
        let now = self.identity.now();
        let note = Note {
            id: self.identity.new_id(),
            title: req.title.trim().to_string(),
            content: req.content.trim().to_string(),
            tags: normalize_tags(req.tags),
            published: false,
            created_at: now,
            updated_at: now,
        };
        self.notes_repo.create(&note)?;
        Ok(note)
    }

    /// Apply a sparse patch. `known_current` lets internal callers that have
    /// already fetched the note skip the second read. `updated_at` advances
    /// even when no field changed.
    pub fn update(
        &self,
        id: &str,
        patch: UpdateNoteRequest,
        known_current: Option<Note>,
    ) -> Result<Note, ServiceError> {
        let current = match known_current {
            Some(note) => note,
            None => self.get(id)?,
        };

        let next = Note {
            id: current.id,
            title: patch
                .title
                .map(|t| t.trim().to_string())
                .unwrap_or(current.title),
            content: patch
                .content
                .map(|c| c.trim().to_string())
                .unwrap_or(current.content),
            tags: patch.tags.map(normalize_tags).unwrap_or(current.tags),
            published: patch.published.unwrap_or(current.published),
            created_at: current.created_at,
            updated_at: self.identity.now(),
        };

        self.notes_repo.update(&next)?;
        Ok(next)
    }

    /// Delete the note, then append a NOTE_DELETED event carrying its title.
    /// The deletion is the source of truth: an audit failure after a
    /// successful delete surfaces to the caller but is not rolled back.
    pub fn remove(&self, id: &str) -> Result<(), ServiceError> {
        let note = self.get(id)?;
        self.notes_repo.remove(id)?;
        self.audit.record(
            id,
            AuditEventType::NoteDeleted,
            Some(serde_json::json!({ "title": note.title })),
        )?;
        Ok(())
    }

    /// Set the publish state and append the matching event. The event
    /// reflects the new state, not a diff: republishing an already-published
    /// note records NOTE_PUBLISHED again.
    pub fn set_published(&self, id: &str, published: bool) -> Result<Note, ServiceError> {
        let note = self.get(id)?;
        let title = note.title.clone();

        let updated = self.update(
            id,
            UpdateNoteRequest {
                published: Some(published),
                ..Default::default()
            },
            Some(note),
        )?;

        let event_type = if published {
            AuditEventType::NotePublished
        } else {
            AuditEventType::NoteUnpublished
        };
        self.audit
            .record(id, event_type, Some(serde_json::json!({ "title": title })))?;

        Ok(updated)
    }
}

/// Trim each tag and drop the ones that end up empty; survivor order is
/// preserved and duplicates are permitted.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
