//! Shared plumbing for the repository helpers.

use std::sync::Arc;

use chrono::Utc;
use url::Url;

use crate::{
    config::RepositoryConfig,
    error::{ClientError, Result},
    signing::RequestSigner,
    transport::{HttpTransport, ReqwestTransport, RequestOptions, TransportResult},
};

/// Header carrying the application id.
pub const HEADER_APP_ID: &str = "X-Edu-App-Id";
/// Header carrying the signed string.
pub const HEADER_APP_SIGNED: &str = "X-Edu-App-Signed";
/// Header carrying the signature.
pub const HEADER_APP_SIG: &str = "X-Edu-App-Sig";
/// Header carrying the signing timestamp in Unix milliseconds.
pub const HEADER_APP_TS: &str = "X-Edu-App-Ts";

const APPLICATION_JSON: &str = "application/json";

/// Holds what every repository call needs: configuration, signer and transport.
///
/// [`AuthHelper`](crate::AuthHelper) and [`NodeHelper`](crate::NodeHelper)
/// share one `RepositoryClient` through an `Arc`.
pub struct RepositoryClient {
    config: RepositoryConfig,
    signer: RequestSigner,
    transport: Arc<dyn HttpTransport>,
}

impl RepositoryClient {
    /// Creates a client sending requests through `transport`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Config`] if the configuration is invalid
    /// - [`ClientError::InvalidPrivateKey`] if the private key cannot be parsed
    pub fn new(config: RepositoryConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let config = config.validated()?;
        let signer = RequestSigner::from_pem(config.private_key())?;
        Ok(Self { config, signer, transport })
    }

    /// Creates a client with a [`ReqwestTransport`] using the configured timeouts.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new), plus [`ClientError::Config`] if the HTTP
    /// client cannot be built.
    pub fn from_config(config: RepositoryConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout(), config.connect_timeout())?;
        Self::new(config, Arc::new(transport))
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Signs `data` with the application key, base64 encoded.
    #[must_use]
    pub fn sign(&self, data: &str) -> String {
        self.signer.sign(data)
    }

    /// Signature headers for `sign_string`, timestamped now.
    #[must_use]
    pub fn signature_headers(&self, sign_string: &str) -> Vec<(String, String)> {
        self.signature_headers_at(sign_string, Utc::now().timestamp_millis())
    }

    /// Signature headers for `sign_string` at `timestamp_ms`.
    #[must_use]
    pub fn signature_headers_at(&self, sign_string: &str, timestamp_ms: i64) -> Vec<(String, String)> {
        let app_id = self.config.app_id();
        let signed = format!("{app_id}{sign_string}{timestamp_ms}");
        let signature = self.sign(&signed);
        vec![
            ("Accept".to_owned(), APPLICATION_JSON.to_owned()),
            ("Content-Type".to_owned(), APPLICATION_JSON.to_owned()),
            (HEADER_APP_ID.to_owned(), app_id.to_owned()),
            (HEADER_APP_SIGNED.to_owned(), signed),
            (HEADER_APP_SIG.to_owned(), signature),
            (HEADER_APP_TS.to_owned(), timestamp_ms.to_string()),
        ]
    }

    /// The `Authorization` header authenticating as the ticket's user.
    #[must_use]
    pub fn ticket_header(ticket: &str) -> (String, String) {
        ("Authorization".to_owned(), format!("EDU-TICKET {ticket}"))
    }

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(self.config.base_url())
            .map_err(|e| ClientError::config(format!("invalid base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::config("base_url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request, filling in the configured user agent when the
    /// options carry none.
    #[tracing::instrument(skip(self, options), fields(method = ?options.method, url = %url))]
    pub async fn handle_request(&self, url: &Url, mut options: RequestOptions) -> TransportResult {
        if options.user_agent.is_none() {
            options.user_agent = self.config.user_agent().map(str::to_owned);
        }
        let result = self.transport.execute(url.as_str(), &options).await;
        tracing::debug!(
            status = result.http_status,
            error_code = result.error_code,
            "repository call finished"
        );
        result
    }
}

impl std::fmt::Debug for RepositoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryClient")
            .field("base_url", &self.config.base_url())
            .field("app_id", &self.config.app_id())
            .finish_non_exhaustive()
    }
}
