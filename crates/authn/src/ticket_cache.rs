//! Per-session ticket resolution.
//!
//! A repository ticket is requested once per session and reused while the
//! repository keeps accepting it:
//!
//! ```text
//! get_ticket(user)
//!   │
//!   ├─ nothing cached ───────────────► request new ticket, cache, return
//!   │
//!   ├─ validated < freshness window ─► return cached ticket (no remote call)
//!   │
//!   └─ stale or never validated ─────► ask repository
//!          ├─ status OK ─────────────► refresh timestamp, return cached ticket
//!          └─ rejected / unreachable ► request new ticket, cache, return
//! ```
//!
//! Session state lives in a [`TicketSessionStore`] handed to the cache; the
//! cache itself holds no per-user state.

use std::sync::Arc;

use chrono::Utc;
use edusharing_storage::{CachedTicket, TicketSessionStore, UserId, Zeroizing};
use fail::fail_point;

use crate::{
    config::TicketCacheConfig,
    error::Result,
    provider::{AuthProvider, TicketAuthInfo},
    user::SessionUser,
};

/// Resolves the repository ticket for a session user.
pub struct TicketCache {
    provider: Arc<dyn AuthProvider>,
    sessions: Arc<dyn TicketSessionStore>,
    config: TicketCacheConfig,
}

impl TicketCache {
    /// Creates a ticket cache over `provider` and `sessions`.
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        sessions: Arc<dyn TicketSessionStore>,
        config: TicketCacheConfig,
    ) -> Self {
        Self { provider, sessions, config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &TicketCacheConfig {
        &self.config
    }

    /// Returns a ticket the repository accepts for `user`.
    ///
    /// At most one validity check and at most one new-ticket request are made
    /// per call.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingAuthKey`](crate::AuthError::MissingAuthKey) if a new ticket is needed and the user has no auth key
    /// - [`AuthError::TicketRequestFailed`](crate::AuthError::TicketRequestFailed) if the repository does not issue a ticket
    /// - [`AuthError::SessionStore`](crate::AuthError::SessionStore) if the session store fails
    #[tracing::instrument(skip(self, user), fields(user.id = %user.id))]
    pub async fn get_ticket(&self, user: &SessionUser) -> Result<Zeroizing<String>> {
        let Some(cached) = self.sessions.get(user.id).await? else {
            tracing::debug!(cache = "session", "cache miss");
            return self.issue(user).await;
        };

        if cached.is_fresh(Utc::now(), self.config.freshness_window) {
            tracing::debug!(cache = "session", "cache hit (fresh)");
            return Ok(cached.ticket);
        }

        match self.check_validity(&cached.ticket).await {
            Ok(info) if info.is_ok() => {
                tracing::debug!(cache = "session", "cache hit (revalidated)");
                self.sessions
                    .put(user.id, CachedTicket::validated(cached.ticket.as_str(), Utc::now()))
                    .await?;
                Ok(cached.ticket)
            },
            Ok(info) => {
                tracing::debug!(status = %info.status_code, "cached ticket rejected");
                self.issue(user).await
            },
            Err(error) => {
                tracing::warn!(%error, "ticket validity check failed, requesting a new ticket");
                self.issue(user).await
            },
        }
    }

    /// Drops the cached ticket for `user`.
    ///
    /// An audit event is emitted at INFO level.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionStore`](crate::AuthError::SessionStore) if the session store fails.
    #[tracing::instrument(skip(self))]
    pub async fn invalidate(&self, user: UserId) -> Result<()> {
        self.sessions.remove(user).await?;
        tracing::info!(
            audit.action = "invalidate_ticket",
            audit.resource = %format_args!("user:{user}"),
            audit.result = "success",
            "audit_event"
        );
        Ok(())
    }

    async fn check_validity(&self, ticket: &str) -> Result<TicketAuthInfo> {
        fail_point!("ticket-before-validate", |_| {
            Err(crate::AuthError::ticket_validation_failed("injected failure before validity check"))
        });
        self.provider.ticket_authentication_info(ticket).await
    }

    async fn issue(&self, user: &SessionUser) -> Result<Zeroizing<String>> {
        let auth_key =
            user.auth_key(self.config.auth_key_field, self.config.guest_auth_key.as_deref())?;
        let ticket = Zeroizing::new(self.provider.ticket_for_user(&auth_key, &user.profile()).await?);

        self.sessions.put(user.id, CachedTicket::validated(ticket.as_str(), Utc::now())).await?;
        tracing::debug!(cache = "session", "cached new ticket");
        Ok(ticket)
    }
}

impl std::fmt::Debug for TicketCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketCache").field("config", &self.config).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use std::time::Duration;

    use edusharing_storage::MemoryTicketSessionStore;

    use super::*;
    use crate::{
        error::AuthError,
        testutil::{ScriptedAuthProvider, session_user},
    };

    struct Fixture {
        provider: Arc<ScriptedAuthProvider>,
        sessions: Arc<MemoryTicketSessionStore>,
        cache: TicketCache,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(ScriptedAuthProvider::new());
        let sessions = Arc::new(MemoryTicketSessionStore::new());
        let cache = TicketCache::new(
            Arc::clone(&provider) as Arc<dyn AuthProvider>,
            Arc::clone(&sessions) as Arc<dyn TicketSessionStore>,
            TicketCacheConfig::default(),
        );
        Fixture { provider, sessions, cache }
    }

    async fn seed_stale(sessions: &MemoryTicketSessionStore, user: UserId, ticket: &str) {
        let stale = Utc::now() - chrono::Duration::seconds(60);
        sessions.put(user, CachedTicket::validated(ticket, stale)).await.expect("seed");
    }

    #[tokio::test]
    async fn test_no_cached_ticket_requests_one() {
        let f = fixture();
        let user = session_user(1);

        let ticket = f.cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(ticket.as_str(), "ticket-1");
        assert_eq!(f.provider.ticket_requests(), 1);
        assert_eq!(f.provider.validity_checks(), 0);

        let cached = f.sessions.get(user.id).await.expect("get").expect("cached");
        assert_eq!(cached.ticket.as_str(), "ticket-1");
        assert!(cached.validated_at.is_some());
    }

    #[tokio::test]
    async fn test_fresh_ticket_makes_no_remote_calls() {
        let f = fixture();
        let user = session_user(1);
        f.sessions.put(user.id, CachedTicket::validated("cached", Utc::now())).await.expect("seed");

        let ticket = f.cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(ticket.as_str(), "cached");
        assert_eq!(f.provider.ticket_requests(), 0);
        assert_eq!(f.provider.validity_checks(), 0);
    }

    #[tokio::test]
    async fn test_stale_valid_ticket_is_revalidated() {
        let f = fixture();
        let user = session_user(1);
        seed_stale(&f.sessions, user.id, "cached").await;
        let before = Utc::now();

        let ticket = f.cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(ticket.as_str(), "cached");
        assert_eq!(f.provider.validity_checks(), 1);
        assert_eq!(f.provider.ticket_requests(), 0);

        let cached = f.sessions.get(user.id).await.expect("get").expect("cached");
        assert!(cached.validated_at.expect("timestamp") >= before);
    }

    #[tokio::test]
    async fn test_unvalidated_ticket_is_checked() {
        let f = fixture();
        let user = session_user(1);
        f.sessions.put(user.id, CachedTicket::unvalidated("cached")).await.expect("seed");

        let ticket = f.cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(ticket.as_str(), "cached");
        assert_eq!(f.provider.validity_checks(), 1);
    }

    #[tokio::test]
    async fn test_rejected_ticket_is_replaced() {
        let f = fixture();
        f.provider.reject_tickets();
        let user = session_user(1);
        seed_stale(&f.sessions, user.id, "expired").await;

        let ticket = f.cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(ticket.as_str(), "ticket-1");
        assert_eq!(f.provider.validity_checks(), 1);
        assert_eq!(f.provider.ticket_requests(), 1);

        let cached = f.sessions.get(user.id).await.expect("get").expect("cached");
        assert_eq!(cached.ticket.as_str(), "ticket-1");
    }

    #[tokio::test]
    async fn test_failed_check_is_replaced() {
        let f = fixture();
        f.provider.fail_checks();
        let user = session_user(1);
        seed_stale(&f.sessions, user.id, "cached").await;

        let ticket = f.cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(ticket.as_str(), "ticket-1");
        assert_eq!(f.provider.ticket_requests(), 1);
    }

    #[tokio::test]
    async fn test_request_failure_propagates() {
        let f = fixture();
        f.provider.fail_requests();

        let err = f.cache.get_ticket(&session_user(1)).await.expect_err("must fail");

        assert!(matches!(err, AuthError::TicketRequestFailed { .. }), "unexpected: {err:?}");
        assert!(f.sessions.get(UserId::from(1)).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_auth_key_and_profile_forwarded() {
        let f = fixture();
        let user = SessionUser::builder()
            .id(UserId::from(9))
            .username("jdoe")
            .first_name("Jane")
            .email("jdoe@example.org")
            .build();

        f.cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(f.provider.last_auth_key().as_deref(), Some("jdoe"));
        let profile = f.provider.last_profile().expect("profile");
        assert_eq!(profile.first_name.as_deref(), Some("Jane"));
        assert_eq!(profile.email.as_deref(), Some("jdoe@example.org"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let f = fixture();

        let first = f.cache.get_ticket(&session_user(1)).await.expect("ticket");
        let second = f.cache.get_ticket(&session_user(2)).await.expect("ticket");

        assert_ne!(first.as_str(), second.as_str());
        assert_eq!(f.provider.ticket_requests(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_ticket() {
        let f = fixture();
        let user = session_user(1);
        f.cache.get_ticket(&user).await.expect("ticket");

        f.cache.invalidate(user.id).await.expect("invalidate");
        let ticket = f.cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(ticket.as_str(), "ticket-2");
        assert_eq!(f.provider.ticket_requests(), 2);
    }

    #[tokio::test]
    async fn test_custom_freshness_window() {
        let provider = Arc::new(ScriptedAuthProvider::new());
        let sessions = Arc::new(MemoryTicketSessionStore::new());
        let cache = TicketCache::new(
            Arc::clone(&provider) as Arc<dyn AuthProvider>,
            Arc::clone(&sessions) as Arc<dyn TicketSessionStore>,
            TicketCacheConfig::builder().freshness_window(Duration::from_secs(120)).build(),
        );
        let user = session_user(1);
        seed_stale(&sessions, user.id, "cached").await;

        cache.get_ticket(&user).await.expect("ticket");

        assert_eq!(provider.validity_checks(), 0);
    }
}
