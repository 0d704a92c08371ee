//! Configuration for [`RepositoryClient`](crate::RepositoryClient).
//!
//! [`RepositoryConfig`] identifies the repository, this application's
//! registration with it, and the key requests are signed with.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{ClientError, Result};

/// Default request timeout (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (5 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Repository connection settings.
///
/// The private key is never serialized and never shown by `Debug`.
///
/// # Example
///
/// ```no_run
/// use edusharing_client::RepositoryConfig;
///
/// let config = RepositoryConfig::builder()
///     .base_url("https://repo.example.org/edu-sharing/")
///     .app_id("moodle-course-platform")
///     .private_key(std::fs::read_to_string("private.pem")?)
///     .build()?;
/// assert_eq!(config.base_url(), "https://repo.example.org/edu-sharing");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Repository root, e.g. `https://repo.example.org/edu-sharing`.
    pub(crate) base_url: String,

    /// Application id registered with the repository.
    pub(crate) app_id: String,

    /// PEM-encoded RSA private key (PKCS#8 or PKCS#1).
    #[serde(skip_serializing, default)]
    pub(crate) private_key: Zeroizing<String>,

    /// Request timeout.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub(crate) timeout: Duration,

    /// Connection timeout.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub(crate) connect_timeout: Duration,

    /// User agent for requests that do not carry the caller's.
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

#[bon::bon]
impl RepositoryConfig {
    /// Creates a new configuration, validating all required fields.
    ///
    /// A trailing `/` on `base_url` is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL, app id or private key is empty.
    #[builder]
    pub fn new(
        #[builder(into)] base_url: String,
        #[builder(into)] app_id: String,
        #[builder(with = |key: impl Into<String>| Zeroizing::new(key.into()))]
        private_key: Zeroizing<String>,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
        #[builder(default = DEFAULT_CONNECT_TIMEOUT)] connect_timeout: Duration,
        #[builder(into)] user_agent: Option<String>,
    ) -> Result<Self> {
        let config =
            Self { base_url, app_id, private_key, timeout, connect_timeout, user_agent };
        config.validated()
    }

    /// Checks required fields and normalizes the base URL.
    ///
    /// Deserialized configurations must pass through here before use.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if a required field is empty.
    pub fn validated(mut self) -> Result<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ClientError::config("base_url cannot be empty"));
        }
        self.base_url = trimmed.to_owned();

        if self.app_id.trim().is_empty() {
            return Err(ClientError::config("app_id cannot be empty"));
        }

        if self.private_key.trim().is_empty() {
            return Err(ClientError::config("private_key cannot be empty"));
        }

        Ok(self)
    }

    /// Returns the repository root without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the application id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the default user agent, if configured.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub(crate) fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl std::fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("private_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn builder_result(base_url: &str, app_id: &str, key: &str) -> Result<RepositoryConfig> {
        RepositoryConfig::builder().base_url(base_url).app_id(app_id).private_key(key).build()
    }

    #[test]
    fn test_valid_config() {
        let config = builder_result("https://repo.example.org/edu-sharing/", "app", "KEY")
            .expect("valid config");

        assert_eq!(config.base_url(), "https://repo.example.org/edu-sharing");
        assert_eq!(config.app_id(), "app");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert!(config.user_agent().is_none());
    }

    #[test]
    fn test_validation_empty_base_url() {
        let result = builder_result("/", "app", "KEY");
        assert!(matches!(result, Err(ClientError::Config { .. })));
    }

    #[test]
    fn test_validation_empty_app_id() {
        let result = builder_result("https://repo", " ", "KEY");
        assert!(matches!(result, Err(ClientError::Config { message }) if message.contains("app_id")));
    }

    #[test]
    fn test_validation_empty_key() {
        let result = builder_result("https://repo", "app", "");
        assert!(matches!(result, Err(ClientError::Config { message }) if message.contains("private_key")));
    }

    #[test]
    fn test_deserialize_then_validate() {
        let config: RepositoryConfig = serde_json::from_str(
            r#"{"base_url":"http://localhost:8080/edu-sharing/","app_id":"app","private_key":"KEY","timeout":"10s"}"#,
        )
        .expect("deserialize");
        let config = config.validated().expect("valid");

        assert_eq!(config.base_url(), "http://localhost:8080/edu-sharing");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_private_key_not_serialized_or_printed() {
        let config = builder_result("https://repo", "app", "SUPER_SECRET").expect("valid");

        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("SUPER_SECRET"));
        assert!(!format!("{config:?}").contains("SUPER_SECRET"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<RepositoryConfig>(
            r#"{"base_url":"http://x","app_id":"a","private_key":"k","verify":false}"#,
        );
        assert!(result.is_err());
    }
}
