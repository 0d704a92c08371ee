//! Configuration for [`TicketCache`](crate::TicketCache).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::user::AuthKeyField;

/// Default time a validated ticket is trusted without asking the repository (10 seconds).
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(10);

/// Ticket resolution settings.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use edusharing_authn::{AuthKeyField, TicketCacheConfig};
///
/// let config = TicketCacheConfig::builder()
///     .freshness_window(Duration::from_secs(30))
///     .auth_key_field(AuthKeyField::Email)
///     .guest_auth_key("esguest")
///     .build();
/// assert_eq!(config.guest_auth_key.as_deref(), Some("esguest"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct TicketCacheConfig {
    /// How long after its last validation a cached ticket is used as-is.
    #[serde(with = "humantime_serde", default = "default_freshness_window")]
    #[builder(default = DEFAULT_FRESHNESS_WINDOW)]
    pub freshness_window: Duration,

    /// User attribute sent to the repository as the user name.
    #[serde(default)]
    #[builder(default)]
    pub auth_key_field: AuthKeyField,

    /// Repository user name for the host's guest account.
    #[serde(default)]
    #[builder(into)]
    pub guest_auth_key: Option<String>,
}

fn default_freshness_window() -> Duration {
    DEFAULT_FRESHNESS_WINDOW
}

impl Default for TicketCacheConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
