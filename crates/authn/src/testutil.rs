//! Shared test utilities for ticket handling.
//!
//! Feature-gated behind `testutil` to keep it out of production builds.
//!
//! ```toml
//! [dev-dependencies]
//! edusharing-authn = { path = "../authn", features = ["testutil"] }
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use edusharing_storage::UserId;
use parking_lot::Mutex;

use crate::{
    error::{AuthError, Result},
    provider::{AuthProvider, STATUS_OK, TicketAuthInfo, UserProfile},
    user::SessionUser,
};

/// Builds a regular session user with `id` and username `user{id}`.
#[must_use]
pub fn session_user(id: i64) -> SessionUser {
    SessionUser::builder()
        .id(UserId::from(id))
        .username(format!("user{id}"))
        .email(format!("user{id}@example.org"))
        .build()
}

/// An [`AuthProvider`] that issues `ticket-1`, `ticket-2`, ... and counts calls.
///
/// Every ticket is accepted by the validity check until
/// [`reject_tickets`](Self::reject_tickets) is called.
#[derive(Debug, Default)]
pub struct ScriptedAuthProvider {
    requests: AtomicUsize,
    checks: AtomicUsize,
    reject: AtomicBool,
    fail_checks: AtomicBool,
    fail_requests: AtomicBool,
    last_auth_key: Mutex<Option<String>>,
    last_profile: Mutex<Option<UserProfile>>,
}

impl ScriptedAuthProvider {
    /// Creates a provider accepting every ticket.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the validity check report every ticket as invalid.
    pub fn reject_tickets(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    /// Makes the validity check fail with a transport-style error.
    pub fn fail_checks(&self) {
        self.fail_checks.store(true, Ordering::SeqCst);
    }

    /// Makes ticket requests fail.
    pub fn fail_requests(&self) {
        self.fail_requests.store(true, Ordering::SeqCst);
    }

    /// Number of `ticket_for_user` calls seen.
    #[must_use]
    pub fn ticket_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of `ticket_authentication_info` calls seen.
    #[must_use]
    pub fn validity_checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// Auth key of the most recent ticket request.
    #[must_use]
    pub fn last_auth_key(&self) -> Option<String> {
        self.last_auth_key.lock().clone()
    }

    /// Profile of the most recent ticket request.
    #[must_use]
    pub fn last_profile(&self) -> Option<UserProfile> {
        self.last_profile.lock().clone()
    }
}

#[async_trait]
impl AuthProvider for ScriptedAuthProvider {
    async fn ticket_for_user(&self, auth_key: &str, profile: &UserProfile) -> Result<String> {
        let n = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_auth_key.lock() = Some(auth_key.to_owned());
        *self.last_profile.lock() = Some(profile.clone());

        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(AuthError::ticket_request_failed("HTTP-Code 500"));
        }
        Ok(format!("ticket-{n}"))
    }

    async fn ticket_authentication_info(&self, _ticket: &str) -> Result<TicketAuthInfo> {
        self.checks.fetch_add(1, Ordering::SeqCst);

        if self.fail_checks.load(Ordering::SeqCst) {
            return Err(AuthError::ticket_validation_failed("connection refused"));
        }
        let status = if self.reject.load(Ordering::SeqCst) { "INVALID" } else { STATUS_OK };
        Ok(TicketAuthInfo { status_code: status.to_owned(), user_id: None })
    }
}
