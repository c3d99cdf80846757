//! Typed error handling for the staysync data layer
//!
//! Every store operation resolves to one of three error categories:
//!
//! - [`ValidationError`]: a required field was missing or empty, caught
//!   before any network call is made
//! - [`RemoteError`]: the remote store reported a failure for the call
//! - `Connectivity`: the pre-flight check call failed, distinguished from a
//!   data error so callers can tell "the backend is unreachable" apart from
//!   "the backend rejected this record"
//!
//! Errors are plain data (`Clone + Serialize`) so they can be recorded in
//! the store's status state and carried inside [`StoreEvent`]s without
//! reference juggling.
//!
//! [`StoreEvent`]: crate::core::events::StoreEvent
//!
//! # Example
//!
//! ```rust,ignore
//! match guests.add(draft).await {
//!     Ok(guest) => println!("created {}", guest.id),
//!     Err(DataError::Validation(e)) => form.show_field_error(e),
//!     Err(e) => form.show_banner(e.to_string()),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// The error type returned by every store operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum DataError {
    /// A required field was missing or empty; no network call was made
    Validation(ValidationError),

    /// The remote call itself failed
    Remote(RemoteError),

    /// The pre-flight connectivity check failed
    Connectivity(RemoteError),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Validation(e) => write!(f, "{}", e),
            DataError::Remote(e) => write!(f, "{}", e),
            DataError::Connectivity(e) => {
                write!(f, "Connection to the data store failed: {}", e)
            }
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Validation(e) => Some(e),
            DataError::Remote(e) | DataError::Connectivity(e) => Some(e),
        }
    }
}

impl DataError {
    /// The best-effort presentation category for this error.
    ///
    /// Validation failures are always [`ErrorKind::InvalidData`]; remote
    /// failures are classified from their message, code and status.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::Validation(_) => ErrorKind::InvalidData,
            DataError::Remote(e) => e.kind(),
            DataError::Connectivity(_) => ErrorKind::Connectivity,
        }
    }
}

impl From<ValidationError> for DataError {
    fn from(err: ValidationError) -> Self {
        DataError::Validation(err)
    }
}

impl From<RemoteError> for DataError {
    fn from(err: RemoteError) -> Self {
        DataError::Remote(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A required-field check failed on an entity draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// The offending field
    pub field: String,
    /// What the check expected
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation error for field '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// Remote Errors
// =============================================================================

/// A failure reported by the remote store
///
/// The remote surface is opaque, so this carries whatever diagnostic fields
/// the transport exposed: a message, an optional backend error code and an
/// optional HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteError {
    /// Human-readable failure description from the backend
    pub message: String,

    /// Backend error code (e.g. "PGRST301"), when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status of the failed call, when the transport exposed one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Backend error code meaning the data store is not configured for the
/// requested schema. Surfaced by PostgREST-style backends.
const NOT_CONFIGURED_CODE: &str = "PGRST301";

impl RemoteError {
    /// A remote error carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: None,
        }
    }

    /// A remote error with an HTTP status attached
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: Some(status),
        }
    }

    /// Classify this error for presentation.
    ///
    /// Best-effort substring/code matching, checked in order: message
    /// content first, then backend code, then status class. This drives the
    /// wording of user-facing notices only and must never influence control
    /// flow.
    pub fn kind(&self) -> ErrorKind {
        let message = self.message.to_lowercase();
        if message.contains("duplicate") {
            ErrorKind::Duplicate
        } else if message.contains("violates") {
            ErrorKind::InvalidData
        } else if message.contains("connect") {
            ErrorKind::Connectivity
        } else if self.code.as_deref() == Some(NOT_CONFIGURED_CODE) {
            ErrorKind::NotConfigured
        } else if self.status.is_some_and(|s| (400..500).contains(&s)) {
            ErrorKind::Client
        } else if self.status.is_some_and(|s| s >= 500) {
            ErrorKind::Server
        } else {
            ErrorKind::Unknown
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code {})", code)?;
        }
        if let Some(status) = self.status {
            write!(f, " (status {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

// =============================================================================
// Presentation classification
// =============================================================================

/// Presentation category of a failure, used to pick the wording of the
/// user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A unique constraint was hit (the record already exists)
    Duplicate,
    /// The backend rejected the data (constraint violation or failed
    /// required-field check)
    InvalidData,
    /// The backend could not be reached
    Connectivity,
    /// The backend is not configured for this schema
    NotConfigured,
    /// Some other 4xx response
    Client,
    /// Some 5xx response
    Server,
    /// Nothing matched
    Unknown,
}

impl ErrorKind {
    /// Short user-facing phrase for this category
    pub fn user_phrase(&self) -> &'static str {
        match self {
            ErrorKind::Duplicate => "duplicate record",
            ErrorKind::InvalidData => "invalid data",
            ErrorKind::Connectivity => "connection problem",
            ErrorKind::NotConfigured => "database misconfigured",
            ErrorKind::Client => "client error",
            ErrorKind::Server => "server error",
            ErrorKind::Unknown => "unknown error",
        }
    }
}

/// A specialized Result type for store operations
pub type DataResult<T> = Result<T, DataError>;

// =============================================================================
// Tests
// =============================================================================
