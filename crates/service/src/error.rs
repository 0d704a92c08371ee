//! Service error types.
//!
//! Two kinds of failure leave the service:
//!
//! - [`ServiceError`]: the operation could not run (missing record, missing
//!   input, unreachable store). Always returned as `Err`.
//! - [`LinkFailure`]: `add_instance` / `update_instance` ran, but linking the
//!   record to the repository failed. Local changes were compensated before
//!   it is returned, inside an `Ok`.

use edusharing_authn::AuthError;
use edusharing_client::ClientError;
use edusharing_storage::{RecordId, StorageError};
use thiserror::Error;

/// Errors from service operations.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`: new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// No resource record with this id.
    #[error("Resource record {id} not found")]
    RecordNotFound {
        /// The missing record id.
        id: RecordId,
    },

    /// The repository has no usage for the given node, course and resource.
    #[error("No usage found")]
    UsageNotFound,

    /// A usage deletion was requested without a usage id.
    #[error("No usage id provided, deletion cannot be performed")]
    MissingUsageId,

    /// A field the operation needs is absent or empty.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The object URL does not name a repository node.
    #[error("Invalid object URL '{url}': {message}")]
    InvalidObjectUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// Obtaining a ticket failed.
    #[error("Authentication error: {0}")]
    Auth(#[source] AuthError),

    /// A repository call failed.
    #[error("Repository error: {0}")]
    Registry(#[source] ClientError),

    /// A record store call failed.
    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),
}

impl ServiceError {
    /// Creates a [`ServiceError::InvalidObjectUrl`].
    #[must_use]
    pub fn invalid_object_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidObjectUrl { url: url.into(), message: message.into() }
    }

    /// Returns `true` if the repository reported the node as deleted.
    #[must_use]
    pub fn is_node_deleted(&self) -> bool {
        matches!(self, ServiceError::Registry(ClientError::NodeDeleted { .. }))
    }

    /// Returns `true` if the repository reported the usage as deleted.
    #[must_use]
    pub fn is_usage_deleted(&self) -> bool {
        matches!(self, ServiceError::Registry(ClientError::UsageDeleted { .. }))
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        ServiceError::Auth(err)
    }
}

impl From<ClientError> for ServiceError {
    fn from(err: ClientError) -> Self {
        ServiceError::Registry(err)
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// A record could not be linked to a repository usage.
///
/// The local change has already been undone: a new record was deleted, an
/// updated one restored. `compensated` is `false` if undoing it failed too.
#[derive(Debug, Error)]
#[error("Linking record {record_id} to the repository failed: {source}")]
pub struct LinkFailure {
    /// The record the link was attempted for.
    pub record_id: RecordId,
    /// Why the link failed.
    #[source]
    pub source: ServiceError,
    /// Whether the local change was undone.
    pub compensated: bool,
}

/// Outcome of a step that links a record to the repository.
pub type LinkResult<T> = std::result::Result<T, LinkFailure>;
