//! The HTTP seam.
//!
//! Every repository call goes through [`HttpTransport::execute`]. A transport
//! never fails as a Rust error: connection problems are reported in
//! [`TransportResult::error_code`] so callers can distinguish "no response"
//! from "an error response".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT, redirect::Policy};

use crate::error::{ClientError, Result};

/// Transport error codes, numbered like libcurl's.
pub mod error_code {
    /// No error.
    pub const OK: u32 = 0;
    /// Unclassified failure.
    pub const FAILED: u32 = 1;
    /// The URL or a header could not be used.
    pub const MALFORMED_REQUEST: u32 = 3;
    /// The host could not be reached.
    pub const COULD_NOT_CONNECT: u32 = 7;
    /// The request timed out.
    pub const TIMEOUT: u32 = 28;
    /// Too many redirects.
    pub const TOO_MANY_REDIRECTS: u32 = 47;
    /// The response body could not be read.
    pub const RECEIVE_ERROR: u32 = 56;
}

/// Maximum number of redirects followed when redirects are enabled.
const MAX_REDIRECTS: usize = 10;

/// HTTP method of a [`RequestOptions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// How a single request is sent.
#[derive(Clone, Debug, PartialEq, Eq, bon::Builder)]
pub struct RequestOptions {
    /// HTTP method.
    #[builder(default)]
    pub method: HttpMethod,

    /// Request headers in sending order.
    #[builder(default)]
    pub headers: Vec<(String, String)>,

    /// Request body.
    #[builder(into)]
    pub body: Option<String>,

    /// Whether the server certificate is verified.
    #[builder(default = true)]
    pub verify_tls: bool,

    /// Whether redirects are followed.
    #[builder(default)]
    pub follow_redirects: bool,

    /// `User-Agent` header value.
    #[builder(into)]
    pub user_agent: Option<String>,
}

impl RequestOptions {
    /// Returns the first header named `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Outcome of a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResult {
    /// Response body.
    pub content: String,
    /// [`error_code::OK`] if a response was received.
    pub error_code: u32,
    /// Description of the transport error.
    pub error_detail: Option<String>,
    /// HTTP status, `0` when no response was received.
    pub http_status: u16,
}

impl TransportResult {
    /// A received response.
    #[must_use]
    pub fn response(http_status: u16, content: impl Into<String>) -> Self {
        Self { content: content.into(), error_code: error_code::OK, error_detail: None, http_status }
    }

    /// A request that produced no response.
    #[must_use]
    pub fn failed(error_code: u32, detail: impl Into<String>) -> Self {
        Self { content: String::new(), error_code, error_detail: Some(detail.into()), http_status: 0 }
    }

    /// Returns `true` if a response was received.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_code == error_code::OK
    }

    /// Converts a transport failure into [`ClientError::Transport`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if no response was received.
    pub fn into_response(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Transport {
                code: self.error_code,
                message: self.error_detail.unwrap_or_default(),
            })
        }
    }
}

/// Sends requests to the repository.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request to `url`.
    async fn execute(&self, url: &str, options: &RequestOptions) -> TransportResult;
}

/// [`HttpTransport`] backed by `reqwest`.
///
/// TLS verification and redirect handling are fixed per `reqwest::Client`,
/// so one client is kept for each combination.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    clients: [Client; 4],
}

impl ReqwestTransport {
    /// Creates a transport with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let build = |verify_tls: bool, follow_redirects: bool| {
            Client::builder()
                .timeout(timeout)
                .connect_timeout(connect_timeout)
                .danger_accept_invalid_certs(!verify_tls)
                .redirect(if follow_redirects {
                    Policy::limited(MAX_REDIRECTS)
                } else {
                    Policy::none()
                })
                .build()
                .map_err(|e| ClientError::config(format!("failed to build HTTP client: {e}")))
        };

        Ok(Self {
            clients: [build(false, false)?, build(false, true)?, build(true, false)?, build(true, true)?],
        })
    }

    fn client(&self, options: &RequestOptions) -> &Client {
        let index = (usize::from(options.verify_tls) << 1) | usize::from(options.follow_redirects);
        &self.clients[index]
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[tracing::instrument(skip(self, options), fields(method = ?options.method))]
    async fn execute(&self, url: &str, options: &RequestOptions) -> TransportResult {
        let mut request = self.client(options).request(options.method.into(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(agent) = &options.user_agent {
            request = request.header(USER_AGENT, agent.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%error, "request failed");
                return TransportResult::failed(classify(&error), error.to_string());
            },
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(content) => {
                tracing::debug!(status, "response received");
                TransportResult::response(status, content)
            },
            Err(error) => TransportResult::failed(error_code::RECEIVE_ERROR, error.to_string()),
        }
    }
}

fn classify(error: &reqwest::Error) -> u32 {
    if error.is_timeout() {
        error_code::TIMEOUT
    } else if error.is_connect() {
        error_code::COULD_NOT_CONNECT
    } else if error.is_redirect() {
        error_code::TOO_MANY_REDIRECTS
    } else if error.is_builder() {
        error_code::MALFORMED_REQUEST
    } else if error.is_body() || error.is_decode() {
        error_code::RECEIVE_ERROR
    } else {
        error_code::FAILED
    }
}
