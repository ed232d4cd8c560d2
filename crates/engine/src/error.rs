//! The module contains the errors the engine can return.
//!
//! Every failure that leaves the engine is one of three kinds:
//!
//! - [`NotFound`] the entity, or an entity it references, does not exist.
//! - [`Conflict`] a uniqueness or referential-integrity rule was violated.
//! - [`Internal`] anything else. The storage error is kept as the source for
//!   logs and never shown to callers.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`Conflict`]: EngineError::Conflict
//!  [`Internal`]: EngineError::Internal
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::StorageError;

/// Engine errors, already classified.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error")]
    Internal {
        #[source]
        source: StorageError,
    },
}

/// Tag of an [`EngineError`], also used by the constraint rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Internal,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Build an error of the given kind carrying a caller-safe message.
    ///
    /// `Internal` cannot be built from a message alone, so a message asked
    /// for as `Internal` is wrapped as an opaque storage failure.
    pub(crate) fn with_kind(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::Internal => Self::Internal {
                source: StorageError::Rejected(message),
            },
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Internal { source: a }, Self::Internal { source: b }) => {
                a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}
