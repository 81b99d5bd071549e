use thiserror::Error;

/// Errors surfaced by the notes and audit services.
///
/// `NotFound` is a client error; everything coming out of a store propagates
/// unchanged as `Storage` with no retry or local recovery.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("note not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(e: rusqlite::Error) -> Self {
        ServiceError::Storage(e.to_string())
    }
}
