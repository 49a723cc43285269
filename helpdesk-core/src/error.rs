//! Error types for helpdesk-core

use crate::types::{CustomerId, TicketId};
use thiserror::Error;

/// Main error type for the helpdesk-core library
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was missing or a value was out of range
    #[error("validation error: {0}")]
    Validation(String),

    /// Ticket not found
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// Customer not found
    #[error("customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Durable slot failure
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

/// Failure reading or writing a durable slot.
///
/// The ticket store never lets one of these abort an operation; it logs it and
/// keeps the most recent one around so callers can report it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The slot could not be read
    #[error("failed to read slot '{key}': {message}")]
    Read { key: String, message: String },

    /// The slot could not be written (quota, locked database, ...)
    #[error("failed to write slot '{key}': {message}")]
    Write { key: String, message: String },

    /// The slot holds data that does not decode or fails its checksum
    #[error("slot '{key}' is corrupt: {message}")]
    Corrupt { key: String, message: String },

    /// The in-memory value could not be serialized
    #[error("failed to serialize slot '{key}': {message}")]
    Serialize { key: String, message: String },
}

impl PersistenceError {
    /// The slot key this error refers to
    pub fn key(&self) -> &str {
        match self {
            PersistenceError::Read { key, .. }
            | PersistenceError::Write { key, .. }
            | PersistenceError::Corrupt { key, .. }
            | PersistenceError::Serialize { key, .. } => key,
        }
    }
}

/// Result type alias for helpdesk-core
pub type Result<T> = std::result::Result<T, Error>;
