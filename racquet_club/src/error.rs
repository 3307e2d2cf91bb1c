//! Error taxonomy shared by every domain module.
//!
//! Each module keeps its own `thiserror` enum; this module only classifies
//! those errors so the HTTP layer can pick a status code and a stable code
//! string without knowing every variant.

use std::fmt;
use thiserror::Error;

/// Coarse classification of a domain failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input, or a request the current state rejects
    InvalidInput,
    /// Missing, invalid or expired credential
    Unauthenticated,
    /// Role or ownership mismatch
    Forbidden,
    /// Referenced record does not exist
    NotFound,
    /// Duplicate record or exhausted capacity
    Conflict,
    /// Storage, hashing or signing failure
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Implemented by every domain error so callers can render it uniformly
pub trait ClassifiedError: std::error::Error {
    /// Coarse classification
    fn kind(&self) -> ErrorKind;

    /// Stable snake_case identifier for API clients
    fn code(&self) -> &'static str;

    /// Message that is safe to show to a client.
    ///
    /// Internal failures are replaced by a generic message.
    fn client_message(&self) -> String {
        if self.kind() == ErrorKind::Internal {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// A text column held a value outside of its enum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
