//! The remote side of ticket handling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Status code the repository reports for a live ticket.
pub const STATUS_OK: &str = "OK";

/// Profile fields sent along with a ticket request.
///
/// The repository uses them to provision or refresh the user's account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Answer of the repository's session validation endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketAuthInfo {
    /// `OK` when the ticket is still accepted.
    pub status_code: String,
    /// Repository user the ticket belongs to.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl TicketAuthInfo {
    /// Returns `true` if the repository still accepts the ticket.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

/// Issues tickets and checks their validity against the repository.
///
/// The HTTP implementation lives in `edusharing-client`; tests substitute
/// scripted providers.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Requests a fresh ticket for the user identified by `auth_key`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TicketRequestFailed`](crate::AuthError::TicketRequestFailed)
    /// if the repository cannot be reached or refuses.
    async fn ticket_for_user(&self, auth_key: &str, profile: &UserProfile) -> Result<String>;

    /// Asks the repository whether `ticket` is still valid.
    ///
    /// A rejected ticket is reported through [`TicketAuthInfo::status_code`];
    /// an `Err` means the check itself could not be completed.
    async fn ticket_authentication_info(&self, ticket: &str) -> Result<TicketAuthInfo>;
}
