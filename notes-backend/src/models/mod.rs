pub mod audit;
pub mod note;

pub use audit::{AuditEvent, AuditEventType};
pub use note::{CreateNoteRequest, Note, NotesPage, UpdateNoteRequest};
