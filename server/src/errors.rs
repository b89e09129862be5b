use thiserror::Error;
use warp::reject;

use crate::audiofile::{AudioKind, Id};
use crate::validation::FieldErrors;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a metadata payload that failed field validation.
    #[error("invalid metadata fields")]
    Validation(FieldErrors),

    /// Represents a reference to a record that does not exist.
    #[error("no {kind} record with ID {id}")]
    NonExistentRecord { kind: AudioKind, id: Id },
}

impl BackendError {
    /// Shorthand for a validation failure on a single field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        BackendError::Validation(FieldErrors::single(field, message))
    }
}

impl reject::Reject for BackendError {}
