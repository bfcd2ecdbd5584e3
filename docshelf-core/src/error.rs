//! Error types and result types for docshelf operations.
//!
//! Every fallible operation returns a [`ShelfResult<T>`]. The variants are kept small on
//! purpose: callers mostly care whether the backend rejected a request (and with which
//! status), whether a document was missing, or whether the request never completed.

use serde_json::{Error as SerdeJsonError, Value};
use thiserror::Error;

/// Represents all possible errors that can occur when talking to a document backend.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// The backend answered with a status outside the success range.
    ///
    /// `body` holds the parsed error payload returned by the backend.
    #[error("Received status {status} from server when {operation}: {body}")]
    Backend {
        operation: &'static str,
        status: u16,
        body: Value,
    },
    /// A document could not be found when loading it.
    #[error("Could not find document '{0}'")]
    NotFound(String),
    /// Serialization/deserialization error when encoding a request or decoding a response.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The request never produced a response (DNS, connection, IO).
    #[error("Transport error: {0}")]
    Transport(String),
    /// A `regex:` criterion could not be parsed back into a pattern.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl ShelfError {
    /// Returns the HTTP status carried by a [`ShelfError::Backend`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ShelfError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A specialized `Result` type for docshelf operations.
pub type ShelfResult<T> = Result<T, ShelfError>;

impl From<SerdeJsonError> for ShelfError {
    fn from(err: SerdeJsonError) -> Self {
        ShelfError::Serialization(err.to_string())
    }
}
