//! Error types for the entity store

use thiserror::Error;

/// Errors returned by [`EntityStore`](crate::EntityStore) and its backends
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record with this id already exists
    #[error("{entity} '{id}' already exists")]
    AlreadyExists { entity: &'static str, id: String },

    /// No record with this id is stored
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Index operations were requested on a singleton entity type
    #[error("{0} is not an indexed entity")]
    NotIndexed(&'static str),

    /// Records must carry a non-empty id
    #[error("{0} record has an empty id")]
    EmptyId(&'static str),

    /// The storage backend failed
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A record or index could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether the error describes caller input rather than a storage fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::AlreadyExists { .. }
                | StoreError::NotFound { .. }
                | StoreError::NotIndexed(_)
                | StoreError::EmptyId(_)
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
