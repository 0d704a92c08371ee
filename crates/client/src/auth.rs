//! Ticket issuance and validation over the authentication API.

use std::sync::Arc;

use async_trait::async_trait;
use edusharing_authn::{AuthError, AuthProvider, TicketAuthInfo, UserProfile};
use serde::Deserialize;

use crate::{
    base::RepositoryClient,
    error::{ClientError, Result, error_message},
    transport::{HttpMethod, RequestOptions},
};

#[derive(Deserialize)]
struct TicketResponse {
    ticket: String,
}

/// Talks to `/rest/authentication/v1`.
#[derive(Debug, Clone)]
pub struct AuthHelper {
    base: Arc<RepositoryClient>,
}

impl AuthHelper {
    /// Creates a helper over `base`.
    pub fn new(base: Arc<RepositoryClient>) -> Self {
        Self { base }
    }

    /// Requests a ticket for the repository user `auth_key`.
    ///
    /// The request is signed over `auth_key`; `profile` is sent as the body.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] if no response was received
    /// - [`ClientError::UnexpectedStatus`] if the repository did not answer 200 with a ticket
    #[tracing::instrument(skip(self, profile))]
    pub async fn request_ticket(&self, auth_key: &str, profile: &UserProfile) -> Result<String> {
        let url = self.base.endpoint(&["rest", "authentication", "v1", "appauth", auth_key])?;
        let body = serde_json::to_string(profile)
            .map_err(|e| ClientError::invalid_response("failed to encode profile", e))?;
        let options = RequestOptions::builder()
            .method(HttpMethod::Post)
            .headers(self.base.signature_headers(auth_key))
            .body(body)
            .build();

        let result = self.base.handle_request(&url, options).await.into_response()?;
        let unexpected = || ClientError::UnexpectedStatus {
            status: result.http_status,
            message: error_message(&result.content),
        };
        if result.http_status != 200 {
            return Err(unexpected());
        }
        serde_json::from_str::<TicketResponse>(&result.content)
            .map(|r| r.ticket)
            .map_err(|_| unexpected())
    }

    /// Asks the repository whether `ticket` is valid.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] if no response was received
    /// - [`ClientError::UnexpectedStatus`] on a non-200 answer
    /// - [`ClientError::InvalidResponse`] if the body cannot be decoded
    #[tracing::instrument(skip_all)]
    pub async fn validate_ticket(&self, ticket: &str) -> Result<TicketAuthInfo> {
        let url = self.base.endpoint(&["rest", "authentication", "v1", "validateSession"])?;
        let options = RequestOptions::builder()
            .headers(vec![
                ("Accept".to_owned(), "application/json".to_owned()),
                RepositoryClient::ticket_header(ticket),
            ])
            .build();

        let result = self.base.handle_request(&url, options).await.into_response()?;
        if result.http_status != 200 {
            return Err(ClientError::UnexpectedStatus {
                status: result.http_status,
                message: error_message(&result.content),
            });
        }
        serde_json::from_str(&result.content)
            .map_err(|e| ClientError::invalid_response("validateSession response", e))
    }
}

#[async_trait]
impl AuthProvider for AuthHelper {
    async fn ticket_for_user(
        &self,
        auth_key: &str,
        profile: &UserProfile,
    ) -> edusharing_authn::Result<String> {
        self.request_ticket(auth_key, profile).await.map_err(|e| {
            let message = match &e {
                ClientError::UnexpectedStatus { status, message } => {
                    format!("HTTP-Code {status}: {message}")
                },
                other => other.to_string(),
            };
            AuthError::ticket_request_failed_with_source(message, e)
        })
    }

    async fn ticket_authentication_info(
        &self,
        ticket: &str,
    ) -> edusharing_authn::Result<TicketAuthInfo> {
        self.validate_ticket(ticket)
            .await
            .map_err(|e| AuthError::ticket_validation_failed_with_source("validateSession failed", e))
    }
}
