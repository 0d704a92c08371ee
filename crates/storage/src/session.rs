//! Session-scoped ticket storage.
//!
//! Repository tickets belong to a user's session, not to the process. The
//! [`TicketSessionStore`] trait makes that state explicit so the ticket
//! resolution policy receives it as a collaborator instead of reaching into
//! ambient globals.
//!
//! ```text
//! request (user 17) ──► TicketSessionStore::get(17)
//!                            │
//!                ┌───────────┴───────────┐
//!                ▼                       ▼
//!            cached ticket           nothing cached
//!       (value + validated_at)      (issue a new one)
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use zeroize::Zeroizing;

use crate::{error::StorageResult, types::UserId};

/// Default idle timeout after which an untouched session entry is dropped (2 hours).
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(7_200);

/// Default maximum number of cached sessions.
pub const DEFAULT_SESSION_CAPACITY: u64 = 10_000;

/// A ticket cached for one user session.
///
/// The ticket value is wrapped in [`Zeroizing`] so it is scrubbed from
/// memory when dropped, and is never printed by the `Debug` impl.
#[derive(Clone)]
pub struct CachedTicket {
    /// Opaque ticket issued by the repository.
    pub ticket: Zeroizing<String>,
    /// When the repository last confirmed (or issued) the ticket.
    ///
    /// `None` means the ticket was cached without ever being validated.
    pub validated_at: Option<DateTime<Utc>>,
}

impl CachedTicket {
    /// A ticket confirmed valid at `at`.
    #[must_use]
    pub fn validated(ticket: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self { ticket: Zeroizing::new(ticket.into()), validated_at: Some(at) }
    }

    /// A ticket with no validation timestamp.
    #[must_use]
    pub fn unvalidated(ticket: impl Into<String>) -> Self {
        Self { ticket: Zeroizing::new(ticket.into()), validated_at: None }
    }

    /// Returns `true` if the ticket was validated less than `window` before `now`.
    ///
    /// Timestamps ahead of `now` count as fresh.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let Some(validated_at) = self.validated_at else {
            return false;
        };
        match chrono::Duration::from_std(window) {
            Ok(window) => now.signed_duration_since(validated_at) < window,
            Err(_) => true,
        }
    }
}

impl std::fmt::Debug for CachedTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedTicket")
            .field("ticket", &"<redacted>")
            .field("validated_at", &self.validated_at)
            .finish()
    }
}

/// Per-user session state holding the cached repository ticket.
#[async_trait]
pub trait TicketSessionStore: Send + Sync {
    /// Returns the ticket cached for `user`, if any.
    async fn get(&self, user: UserId) -> StorageResult<Option<CachedTicket>>;

    /// Caches `ticket` for `user`, replacing any previous entry.
    async fn put(&self, user: UserId, ticket: CachedTicket) -> StorageResult<()>;

    /// Drops the cached ticket for `user`. Removing an absent entry succeeds.
    async fn remove(&self, user: UserId) -> StorageResult<()>;
}

/// In-memory [`TicketSessionStore`] with idle expiry.
///
/// Entries untouched for the idle timeout are evicted, matching the lifetime
/// of a host web session. Capacity is bounded with LRU-style eviction.
#[derive(Clone)]
pub struct MemoryTicketSessionStore {
    sessions: Cache<UserId, CachedTicket>,
}

impl MemoryTicketSessionStore {
    /// Creates a store with [`DEFAULT_SESSION_IDLE_TIMEOUT`] and [`DEFAULT_SESSION_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_SESSION_IDLE_TIMEOUT, DEFAULT_SESSION_CAPACITY)
    }

    /// Creates a store with a custom idle timeout and capacity.
    #[must_use]
    pub fn with_idle_timeout(idle_timeout: Duration, max_capacity: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .time_to_idle(idle_timeout)
                .max_capacity(max_capacity)
                .build(),
        }
    }
}

impl Default for MemoryTicketSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTicketSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTicketSessionStore")
            .field("entries", &self.sessions.entry_count())
            .finish()
    }
}

#[async_trait]
impl TicketSessionStore for MemoryTicketSessionStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, user: UserId) -> StorageResult<Option<CachedTicket>> {
        Ok(self.sessions.get(&user).await)
    }

    #[tracing::instrument(skip(self, ticket))]
    async fn put(&self, user: UserId, ticket: CachedTicket) -> StorageResult<()> {
        self.sessions.insert(user, ticket).await;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, user: UserId) -> StorageResult<()> {
        self.sessions.invalidate(&user).await;
        Ok(())
    }
}
