//! The course-management user a ticket is requested for.

use edusharing_storage::UserId;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AuthError, Result},
    provider::UserProfile,
};

/// Which attribute of a [`SessionUser`] identifies them to the repository.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKeyField {
    /// The numeric host user id.
    Id,
    /// The institution's id number.
    IdNumber,
    /// The email address.
    Email,
    /// The login name.
    #[default]
    Username,
}

impl AuthKeyField {
    /// Field name as used in configuration and error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuthKeyField::Id => "id",
            AuthKeyField::IdNumber => "id_number",
            AuthKeyField::Email => "email",
            AuthKeyField::Username => "username",
        }
    }
}

impl std::fmt::Display for AuthKeyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logged-in user of the host system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct SessionUser {
    /// Host user id; also keys the session ticket.
    pub id: UserId,

    /// Login name.
    #[builder(into, default)]
    pub username: String,

    /// Email address.
    #[builder(into)]
    pub email: Option<String>,

    /// Institution id number.
    #[builder(into)]
    pub id_number: Option<String>,

    /// Given name.
    #[builder(into)]
    pub first_name: Option<String>,

    /// Family name.
    #[builder(into)]
    pub last_name: Option<String>,

    /// Whether this is the host's guest account.
    #[builder(default)]
    pub is_guest: bool,
}

impl SessionUser {
    /// Derives the repository user name for this user.
    ///
    /// Guests map to `guest_key` when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingAuthKey`] if the selected field is empty.
    pub fn auth_key(&self, field: AuthKeyField, guest_key: Option<&str>) -> Result<String> {
        if self.is_guest
            && let Some(key) = guest_key.filter(|k| !k.is_empty())
        {
            return Ok(key.to_owned());
        }

        let value = match field {
            AuthKeyField::Id => Some(self.id.to_string()),
            AuthKeyField::IdNumber => self.id_number.clone(),
            AuthKeyField::Email => self.email.clone(),
            AuthKeyField::Username => Some(self.username.clone()),
        };

        value
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AuthError::MissingAuthKey { user: self.id.to_string(), field: field.as_str() })
    }

    /// Profile fields forwarded with a ticket request.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}
