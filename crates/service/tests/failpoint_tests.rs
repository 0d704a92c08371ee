#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection in the service crate.
//!
//! ```bash
//! cargo test -p edusharing-service --features failpoints --test failpoint_tests
//! ```

use std::sync::Arc;

use chrono::Utc;
use edusharing_authn::{
    AuthProvider, TicketCache, TicketCacheConfig,
    testutil::{ScriptedAuthProvider, session_user},
};
use edusharing_client::testutil::{MemoryUsageRegistry, RecordingTransport, test_client};
use edusharing_service::{AddResourceInput, EduSharingService, ServiceError};
use edusharing_storage::{CourseId, MemoryRecordStore, MemoryTicketSessionStore};

fn setup() -> (Arc<MemoryUsageRegistry>, Arc<MemoryRecordStore>, EduSharingService) {
    let registry = Arc::new(MemoryUsageRegistry::new());
    let records = Arc::new(MemoryRecordStore::new());
    let tickets = TicketCache::new(
        Arc::new(ScriptedAuthProvider::new()) as Arc<dyn AuthProvider>,
        Arc::new(MemoryTicketSessionStore::new()),
        TicketCacheConfig::default(),
    );
    let service = EduSharingService::builder()
        .tickets(Arc::new(tickets))
        .registry(registry.clone())
        .records(records.clone())
        .repository(Arc::new(test_client("http://repo.test", Arc::new(RecordingTransport::new()))))
        .build();
    (registry, records, service)
}

fn input() -> AddResourceInput {
    AddResourceInput::builder()
        .course(CourseId::from(2))
        .name("Injected")
        .object_url("ccrep://home/node-7")
        .build()
}

#[tokio::test]
async fn create_usage_failpoint_triggers_add_compensation() {
    let scenario = fail::FailScenario::setup();
    let (registry, records, service) = setup();

    // Usage creation fails before the registry is reached
    fail::cfg("service-before-create-usage", "return").expect("failed to configure fail point");

    let failure = service
        .add_instance(&session_user(1), input(), Utc::now())
        .await
        .expect("add ran")
        .expect_err("link must fail");

    assert!(failure.compensated);
    assert!(matches!(failure.source, ServiceError::Registry(_)));
    assert_eq!(registry.create_calls(), 0);
    assert!(records.is_empty());

    scenario.teardown();
}

#[tokio::test]
async fn without_failpoint_add_links_record() {
    let scenario = fail::FailScenario::setup();
    let (registry, records, service) = setup();

    service
        .add_instance(&session_user(1), input(), Utc::now())
        .await
        .expect("add ran")
        .expect("linked");

    assert_eq!(registry.create_calls(), 1);
    assert_eq!(records.len(), 1);

    scenario.teardown();
}
