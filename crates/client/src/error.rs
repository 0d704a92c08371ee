//! Client error types.

use std::sync::Arc;

use edusharing_storage::BoxError;
use serde::Deserialize;
use thiserror::Error;

/// Errors talking to the repository.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`: new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("Transport error {code}: {message}")]
    Transport {
        /// Non-zero transport error code.
        code: u32,
        /// Description from the transport.
        message: String,
    },

    /// The repository answered with a status the operation does not accept.
    #[error("Unexpected HTTP status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Error text from the response body.
        message: String,
    },

    /// The repository refused to create a usage.
    #[error("Creating usage failed {status}: {message}")]
    UsageCreationFailed {
        /// HTTP status code.
        status: u16,
        /// Error text from the response body.
        message: String,
    },

    /// The repository refused to delete a usage.
    #[error("Deleting usage failed {status}: {message}")]
    UsageDeletionFailed {
        /// HTTP status code.
        status: u16,
        /// Error text from the response body.
        message: String,
    },

    /// The node behind a usage no longer exists.
    #[error("Node {node_id} was deleted")]
    NodeDeleted {
        /// Repository node id.
        node_id: String,
    },

    /// The usage no longer exists or is not accessible.
    #[error("Usage was deleted: {message}")]
    UsageDeleted {
        /// Error text from the response body.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// What could not be decoded.
        message: String,
        /// The decoding error.
        #[source]
        source: Option<BoxError>,
    },

    /// The configured private key cannot be parsed.
    #[error("Invalid private key: {message}")]
    InvalidPrivateKey {
        /// Parser error.
        message: String,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong.
        message: String,
    },
}

impl ClientError {
    /// Creates a [`ClientError::InvalidResponse`] wrapping `source`.
    #[must_use]
    pub fn invalid_response(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidResponse { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a [`ClientError::Config`].
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Creates a [`ClientError::InvalidPrivateKey`].
    #[must_use]
    pub fn invalid_private_key(message: impl Into<String>) -> Self {
        Self::InvalidPrivateKey { message: message.into() }
    }

    /// Returns `true` if the error means the remote usage or node is gone.
    #[must_use]
    pub fn is_gone(&self) -> bool {
        matches!(self, ClientError::NodeDeleted { .. } | ClientError::UsageDeleted { .. })
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extracts the `error` and `message` fields of a repository error body.
///
/// Falls back to the raw content when it is not a JSON error object.
pub(crate) fn error_message(content: &str) -> String {
    match serde_json::from_str::<ErrorBody>(content) {
        Ok(body) => {
            let parts: Vec<String> = [body.error, body.message].into_iter().flatten().collect();
            if parts.is_empty() { content.to_owned() } else { parts.join(" ") }
        },
        Err(_) => content.to_owned(),
    }
}
