//! # Store Error Types
//!
//! Error types for persistence operations.
//!
//! ## Error Flow
//! ```text
//! std::io::Error / serde_json::Error      (backend failures)
//!        │
//!        ▼
//! StoreError (this module) ← adds the entity / key context
//!        │
//!        ▼
//! anyhow context in the host binary
//! ```

use thiserror::Error;

use schetovod_core::{TemplateError, ValidationError};

/// Persistence layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot failed to parse or serialize.
    #[error("snapshot error for key '{key}': {source}")]
    Snapshot {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reference data rejected by validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A user-authored template failed structural validation.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Entity not found in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
