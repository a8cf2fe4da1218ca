//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`InvalidInput`] when a name is empty or a number cannot be used.
//! - [`DuplicateName`] when a person or item name is already taken.
//! - [`NotFound`] when an id or name does not match anything.
//! - [`Storage`] when the persistence collaborator fails.
//! - [`MalformedImport`] when a snapshot cannot be accepted as a whole.
//!
//! None of them is fatal: the store keeps its previous valid state.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`DuplicateName`]: EngineError::DuplicateName
//!  [`NotFound`]: EngineError::NotFound
//!  [`Storage`]: EngineError::Storage
//!  [`MalformedImport`]: EngineError::MalformedImport
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" already present!")]
    DuplicateName(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Malformed import: {0}")]
    MalformedImport(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedImport(value.to_string())
    }
}
