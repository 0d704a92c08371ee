//! Raw repository requests the host forwards on behalf of an administrator
//! or a browser.
//!
//! None of these go through the ticket cache. The URLs are supplied by the
//! caller and may point at a different repository than the configured one.

use base64::{Engine, engine::general_purpose::STANDARD};
use edusharing_client::{HttpMethod, RequestOptions, TransportResult};

use crate::service::EduSharingService;

/// Returned by [`EduSharingService::get_render_html`] when the request fails.
pub const UNEXPECTED_ERROR: &str = "Unexpected Error";

const VALIDATE_SESSION_PATH: &str = "rest/authentication/v1/validateSession";
const REGISTER_PLUGIN_PATH: &str = "rest/admin/v1/applications/xml";

impl EduSharingService {
    /// Fetches repository metadata (usually the application XML) from `url`.
    ///
    /// TLS verification is disabled and redirects are followed, matching how
    /// repositories with self-signed certificates are first registered.
    #[tracing::instrument(skip(self, user_agent))]
    pub async fn import_metadata(&self, url: &str, user_agent: Option<&str>) -> TransportResult {
        self.repository.transport().execute(url, &browser_options(user_agent)).await
    }

    /// Checks a session against the repository at `url` with basic `auth`
    /// (`user:password`).
    #[tracing::instrument(skip(self, auth))]
    pub async fn validate_session(&self, url: &str, auth: &str) -> TransportResult {
        let options = RequestOptions::builder()
            .headers(vec![
                ("Content-Type".to_owned(), "application/json".to_owned()),
                ("Accept".to_owned(), "application/json".to_owned()),
                basic_auth(auth),
            ])
            .build();

        self.repository.transport().execute(&join(url, VALIDATE_SESSION_PATH), &options).await
    }

    /// Registers this application with the repository at `url`.
    ///
    /// `body` is a multipart payload separated by `delimiter`.
    #[tracing::instrument(skip(self, body, auth), fields(body.len = body.len()))]
    pub async fn register_plugin(
        &self,
        url: &str,
        delimiter: &str,
        body: &str,
        auth: &str,
    ) -> TransportResult {
        let options = RequestOptions::builder()
            .method(HttpMethod::Put)
            .headers(vec![
                ("Content-Type".to_owned(), format!("multipart/form-data; boundary={delimiter}")),
                ("Content-Length".to_owned(), body.len().to_string()),
                ("Accept".to_owned(), "application/json".to_owned()),
                basic_auth(auth),
            ])
            .body(body)
            .build();

        let result =
            self.repository.transport().execute(&join(url, REGISTER_PLUGIN_PATH), &options).await;
        if result.is_success() {
            tracing::info!(
                audit.action = "register_plugin",
                audit.resource = %format_args!("repository:{url}"),
                audit.result = "success",
                "audit_event"
            );
        }
        result
    }

    /// Signs `input` with the configured private key, base64 encoded.
    #[must_use]
    pub fn sign(&self, input: &str) -> String {
        self.repository.sign(input)
    }

    /// Fetches rendered HTML from `url`.
    ///
    /// Returns [`UNEXPECTED_ERROR`] if the request could not be completed.
    #[tracing::instrument(skip(self, user_agent))]
    pub async fn get_render_html(&self, url: &str, user_agent: Option<&str>) -> String {
        let result = self.repository.transport().execute(url, &browser_options(user_agent)).await;
        if !result.is_success() {
            tracing::warn!(
                error_code = result.error_code,
                error = result.error_detail.as_deref().unwrap_or_default(),
                "render request failed"
            );
            return UNEXPECTED_ERROR.to_owned();
        }
        result.content
    }
}

fn browser_options(user_agent: Option<&str>) -> RequestOptions {
    RequestOptions::builder()
        .verify_tls(false)
        .follow_redirects(true)
        .maybe_user_agent(user_agent)
        .build()
}

fn basic_auth(auth: &str) -> (String, String) {
    ("Authorization".to_owned(), format!("Basic {}", STANDARD.encode(auth)))
}

fn join(url: &str, path: &str) -> String {
    format!("{}/{path}", url.trim_end_matches('/'))
}
