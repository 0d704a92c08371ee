//! Integration test verifying that service operations produce spans and
//! audit events without recording ticket values.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use edusharing_authn::{
    AuthProvider, TicketCache, TicketCacheConfig,
    testutil::{ScriptedAuthProvider, session_user},
};
use edusharing_client::testutil::{MemoryUsageRegistry, RecordingTransport, test_client};
use edusharing_service::{AddResourceInput, EduSharingService, UsageDescriptor};
use edusharing_storage::{CourseId, MemoryRecordStore, MemoryTicketSessionStore};
use tracing::{
    Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};

#[derive(Clone, Default)]
struct Collector {
    spans: Arc<Mutex<Vec<String>>>,
    fields: Arc<Mutex<Vec<String>>>,
}

struct FieldVisitor<'a>(&'a mut Vec<String>);

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push(format!("{}={value:?}", field.name()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Collector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            self.spans.lock().expect("lock poisoned").push(span.name().to_owned());
        }
        attrs.record(&mut FieldVisitor(&mut self.fields.lock().expect("lock poisoned")));
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        event.record(&mut FieldVisitor(&mut self.fields.lock().expect("lock poisoned")));
    }
}

fn service() -> EduSharingService {
    let tickets = TicketCache::new(
        Arc::new(ScriptedAuthProvider::new()) as Arc<dyn AuthProvider>,
        Arc::new(MemoryTicketSessionStore::new()),
        TicketCacheConfig::default(),
    );
    EduSharingService::builder()
        .tickets(Arc::new(tickets))
        .registry(Arc::new(MemoryUsageRegistry::new()))
        .records(Arc::new(MemoryRecordStore::new()))
        .repository(Arc::new(test_client("http://repo.test", Arc::new(RecordingTransport::new()))))
        .build()
}

#[tokio::test]
async fn resource_lifecycle_is_traced_and_audited() {
    let collector = Collector::default();
    let spans = Arc::clone(&collector.spans);
    let fields = Arc::clone(&collector.fields);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let service = service();
    let user = session_user(1);
    let input = AddResourceInput::builder()
        .course(CourseId::from(4))
        .object_url("ccrep://home/node-1")
        .build();

    let id = service.add_instance(&user, input, Utc::now()).await.expect("add").expect("linked");
    service.delete_instance(&user, id).await.expect("delete");

    let recorded = spans.lock().expect("lock poisoned");
    for name in ["add_instance", "create_usage", "delete_instance", "get_usage_id", "delete_usage"] {
        assert!(recorded.iter().any(|s| s == name), "missing span '{name}', recorded: {recorded:?}");
    }

    let fields = fields.lock().expect("lock poisoned");
    for action in ["create_usage", "delete_usage", "delete_instance"] {
        let expected = format!("audit.action={action:?}");
        assert!(fields.iter().any(|f| f == &expected), "missing audit event {action}: {fields:?}");
    }
}

#[tokio::test]
async fn descriptor_ticket_is_not_recorded() {
    let collector = Collector::default();
    let fields = Arc::clone(&collector.fields);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let descriptor = UsageDescriptor::builder()
        .container_id("4")
        .resource_id("1")
        .node_id("node-1")
        .ticket("TICKET_SECRET_VALUE")
        .build();
    service().create_usage(&session_user(1), &descriptor).await.expect("create");

    let fields = fields.lock().expect("lock poisoned");
    assert!(!fields.is_empty());
    assert!(
        fields.iter().all(|f| !f.contains("TICKET_SECRET_VALUE")),
        "ticket leaked into trace fields: {fields:?}"
    );
}
