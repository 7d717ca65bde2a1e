use thiserror::Error;

use crate::kind::EntityKind;

/// Core error type shared across Catalchemy crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A single entity violates a required-field, type or range rule.
    #[error("invalid {kind} '{id}': {message}")]
    InvalidEntity {
        kind: EntityKind,
        id: String,
        message: String,
    },
    /// An entity kind name could not be resolved.
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),
}

impl Error {
    pub(crate) fn invalid(kind: EntityKind, id: &str, message: impl Into<String>) -> Self {
        Error::InvalidEntity {
            kind,
            id: id.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience alias for results returned by Catalchemy crates.
pub type Result<T> = std::result::Result<T, Error>;
