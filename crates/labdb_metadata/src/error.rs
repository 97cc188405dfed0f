//! Error types for the metadata layer.

use labdb_store::StoreError;
use thiserror::Error;

/// Result alias used throughout the metadata layer.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors surfaced by metadata operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The requested record does not exist.
    #[error("{entity} {id:?}: not found")]
    NotFound {
        /// Entity kind, e.g. `"scenario"`.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A record with the same identifier already exists.
    #[error("{entity} {id:?}: already exists")]
    AlreadyExists {
        /// Entity kind, e.g. `"scenario"`.
        entity: &'static str,
        /// Identifier that collided.
        id: String,
    },

    /// The caller supplied an unusable argument.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable description of the problem.
        message: String,
    },

    /// A stored record no longer decodes cleanly.
    #[error("corrupt record: {message}")]
    Corrupt {
        /// Human-readable description of the problem.
        message: String,
    },

    /// A lower-level error annotated with the record it occurred on.
    #[error("{entity} {id:?}: {source}")]
    Entity {
        /// Entity kind, e.g. `"scenario"`.
        entity: &'static str,
        /// Identifier of the record being worked on.
        id: String,
        /// The underlying failure.
        #[source]
        source: Box<MetadataError>,
    },

    /// Underlying store failure.
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

impl MetadataError {
    /// Creates a [`MetadataError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a [`MetadataError::AlreadyExists`].
    pub fn already_exists(entity: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.into(),
        }
    }

    /// Creates a [`MetadataError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a [`MetadataError::Corrupt`].
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Annotates a lower-level error with the record it occurred on.
    ///
    /// Domain errors that already name the record pass through unchanged.
    pub fn with_entity(self, entity: &'static str, id: &str) -> Self {
        match self {
            err @ (Self::NotFound { .. } | Self::AlreadyExists { .. } | Self::Entity { .. }) => err,
            other => Self::Entity {
                entity,
                id: id.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Returns `true` if this error means the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this error means the identifier is already taken.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns `true` if this error means the caller's input was unusable.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
