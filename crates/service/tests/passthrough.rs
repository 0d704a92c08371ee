//! Raw repository requests and signing exposed by the service.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use edusharing_authn::{AuthProvider, TicketCache, TicketCacheConfig, testutil::ScriptedAuthProvider};
use edusharing_client::{
    HttpMethod, RequestSigner, TransportResult,
    testutil::{MemoryUsageRegistry, RecordingTransport, TEST_PRIVATE_KEY, test_client},
};
use edusharing_service::{EduSharingService, UNEXPECTED_ERROR};
use edusharing_storage::{MemoryRecordStore, MemoryTicketSessionStore};

fn setup() -> (Arc<RecordingTransport>, EduSharingService) {
    let transport = Arc::new(RecordingTransport::new());
    let tickets = TicketCache::new(
        Arc::new(ScriptedAuthProvider::new()) as Arc<dyn AuthProvider>,
        Arc::new(MemoryTicketSessionStore::new()),
        TicketCacheConfig::default(),
    );

    let service = EduSharingService::builder()
        .tickets(Arc::new(tickets))
        .registry(Arc::new(MemoryUsageRegistry::new()))
        .records(Arc::new(MemoryRecordStore::new()))
        .repository(Arc::new(test_client("http://configured.test", transport.clone())))
        .build();

    (transport, service)
}

#[tokio::test]
async fn import_metadata_uses_browser_options() {
    let (transport, service) = setup();
    transport.push_response(TransportResult::response(200, "<properties/>"));

    let result = service
        .import_metadata("https://other.test/metadata?format=lms", Some("Mozilla/5.0"))
        .await;

    assert_eq!(result.content, "<properties/>");
    let call = transport.last_call().expect("request sent");
    assert_eq!(call.url, "https://other.test/metadata?format=lms");
    assert_eq!(call.options.method, HttpMethod::Get);
    assert!(!call.options.verify_tls);
    assert!(call.options.follow_redirects);
    assert_eq!(call.options.user_agent.as_deref(), Some("Mozilla/5.0"));
}

#[tokio::test]
async fn validate_session_sends_basic_auth() {
    let (transport, service) = setup();

    let result = service.validate_session("https://other.test/edu-sharing/", "admin:secret").await;

    assert!(result.is_success());

    let call = transport.last_call().expect("request sent");
    assert_eq!(call.url, "https://other.test/edu-sharing/rest/authentication/v1/validateSession");
    assert_eq!(call.options.method, HttpMethod::Get);
    assert_eq!(call.options.header("authorization"), Some("Basic YWRtaW46c2VjcmV0"));
    assert_eq!(call.options.header("Accept"), Some("application/json"));
    assert_eq!(call.options.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn register_plugin_puts_multipart_body() {
    let (transport, service) = setup();
    let body = "--XYZ\r\nContent-Disposition: form-data; name=\"xml\"\r\n\r\n<xml/>\r\n--XYZ--";

    let result =
        service.register_plugin("https://other.test/edu-sharing", "XYZ", body, "admin:secret").await;

    assert!(result.is_success());
    let call = transport.last_call().expect("request sent");
    assert_eq!(call.url, "https://other.test/edu-sharing/rest/admin/v1/applications/xml");
    assert_eq!(call.options.method, HttpMethod::Put);
    assert_eq!(call.options.header("Content-Type"), Some("multipart/form-data; boundary=XYZ"));
    let length = body.len().to_string();
    assert_eq!(call.options.header("Content-Length"), Some(length.as_str()));
    assert_eq!(call.options.header("Authorization"), Some("Basic YWRtaW46c2VjcmV0"));
    assert_eq!(call.options.body.as_deref(), Some(body));
}

#[tokio::test]
async fn get_render_html_returns_content() {
    let (transport, service) = setup();
    transport.push_response(TransportResult::response(200, "<div>rendered</div>"));

    let html = service.get_render_html("https://other.test/render", None).await;

    assert_eq!(html, "<div>rendered</div>");
    let call = transport.last_call().expect("request sent");
    assert!(call.options.user_agent.is_none());
    assert!(!call.options.verify_tls);
}

#[tokio::test]
async fn get_render_html_masks_transport_errors() {
    let (transport, service) = setup();
    transport.push_response(TransportResult::failed(7, "Failed to connect"));

    let html = service.get_render_html("https://other.test/render", Some("Mozilla/5.0")).await;

    assert_eq!(html, UNEXPECTED_ERROR);
    assert_eq!(html, "Unexpected Error");
}

#[tokio::test]
async fn get_render_html_passes_http_error_bodies_through() {
    let (transport, service) = setup();
    transport.push_response(TransportResult::response(500, "repository error page"));

    let html = service.get_render_html("https://other.test/render", None).await;

    assert_eq!(html, "repository error page");
}

#[tokio::test]
async fn sign_uses_configured_key() {
    let (_, service) = setup();
    let signer = RequestSigner::from_pem(TEST_PRIVATE_KEY).expect("test key");

    let signature = service.sign("test-app1700000000000");

    assert!(!signature.is_empty());
    assert_eq!(signature, signer.sign("test-app1700000000000"));
}
