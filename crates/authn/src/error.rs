//! Authentication error types.
//!
//! This module defines errors that can occur while obtaining or validating
//! repository tickets.

use std::sync::Arc;

use edusharing_storage::{BoxError, StorageError};
use thiserror::Error;

/// Ticket issuance and validation errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`: new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The repository refused or failed to issue a ticket.
    #[error("Ticket could not be retrieved: {message}")]
    TicketRequestFailed {
        /// What went wrong, including the HTTP status when there was one.
        message: String,
        /// The underlying transport or decoding error.
        #[source]
        source: Option<BoxError>,
    },

    /// The validity check of a cached ticket could not be completed.
    #[error("Ticket validation failed: {message}")]
    TicketValidationFailed {
        /// What went wrong.
        message: String,
        /// The underlying transport or decoding error.
        #[source]
        source: Option<BoxError>,
    },

    /// The configured auth key field is empty for this user.
    #[error("Missing auth key: user {user} has no {field}")]
    MissingAuthKey {
        /// User whose identity could not be derived.
        user: String,
        /// Name of the configured field.
        field: &'static str,
    },

    /// Reading or writing the session ticket failed.
    #[error("Session store error: {0}")]
    SessionStore(
        /// The underlying storage error.
        #[source]
        StorageError,
    ),
}

impl AuthError {
    /// Creates a [`AuthError::TicketRequestFailed`] without a source.
    #[must_use]
    pub fn ticket_request_failed(message: impl Into<String>) -> Self {
        Self::TicketRequestFailed { message: message.into(), source: None }
    }

    /// Creates a [`AuthError::TicketRequestFailed`] wrapping `source`.
    #[must_use]
    pub fn ticket_request_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TicketRequestFailed { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a [`AuthError::TicketValidationFailed`] without a source.
    #[must_use]
    pub fn ticket_validation_failed(message: impl Into<String>) -> Self {
        Self::TicketValidationFailed { message: message.into(), source: None }
    }

    /// Creates a [`AuthError::TicketValidationFailed`] wrapping `source`.
    #[must_use]
    pub fn ticket_validation_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TicketValidationFailed { message: message.into(), source: Some(Arc::new(source)) }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::SessionStore(err)
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
