#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection in the authn crate.
//!
//! These tests require both `failpoints` and `testutil` features:
//! ```bash
//! cargo test -p edusharing-authn --features failpoints,testutil --test failpoint_tests
//! ```

use std::sync::Arc;

use chrono::Utc;
use edusharing_authn::{
    AuthProvider, TicketCache, TicketCacheConfig,
    testutil::{ScriptedAuthProvider, session_user},
};
use edusharing_storage::{CachedTicket, MemoryTicketSessionStore, TicketSessionStore};

async fn setup_with_stale_ticket() -> (Arc<ScriptedAuthProvider>, TicketCache) {
    let provider = Arc::new(ScriptedAuthProvider::new());
    let sessions = Arc::new(MemoryTicketSessionStore::new());
    let stale = Utc::now() - chrono::Duration::seconds(60);
    sessions
        .put(session_user(1).id, CachedTicket::validated("cached", stale))
        .await
        .expect("failed to seed session");

    let cache = TicketCache::new(
        Arc::clone(&provider) as Arc<dyn AuthProvider>,
        sessions as Arc<dyn TicketSessionStore>,
        TicketCacheConfig::default(),
    );
    (provider, cache)
}

#[tokio::test]
async fn validity_check_failpoint_falls_back_to_new_ticket() {
    let scenario = fail::FailScenario::setup();
    let (provider, cache) = setup_with_stale_ticket().await;

    // Validity check fails before reaching the provider
    fail::cfg("ticket-before-validate", "return").expect("failed to configure fail point");

    let ticket = cache.get_ticket(&session_user(1)).await.expect("fallback must succeed");
    assert_eq!(ticket.as_str(), "ticket-1");
    assert_eq!(provider.validity_checks(), 0);
    assert_eq!(provider.ticket_requests(), 1);

    scenario.teardown();
}

#[tokio::test]
async fn validity_check_without_failpoint_reuses_ticket() {
    let scenario = fail::FailScenario::setup();
    let (provider, cache) = setup_with_stale_ticket().await;

    let ticket = cache.get_ticket(&session_user(1)).await.expect("ticket");
    assert_eq!(ticket.as_str(), "cached");
    assert_eq!(provider.validity_checks(), 1);
    assert_eq!(provider.ticket_requests(), 0);

    scenario.teardown();
}
