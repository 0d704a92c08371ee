//! Shared test utilities for repository calls.
//!
//! Feature-gated behind `testutil` to keep it out of production builds.
//!
//! ```toml
//! [dev-dependencies]
//! edusharing-client = { path = "../client", features = ["testutil"] }
//! ```

use std::{
    collections::{HashSet, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    base::RepositoryClient,
    config::RepositoryConfig,
    error::{ClientError, Result},
    transport::{HttpTransport, RequestOptions, TransportResult},
    usage::{NewUsage, Node, Usage, UsageRegistry},
};

/// 2048-bit RSA test key, PKCS#8 PEM.
pub const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/test_key.pem");

/// [`TEST_PRIVATE_KEY`] in PKCS#1 PEM form.
pub const TEST_PRIVATE_KEY_PKCS1: &str = include_str!("../tests/fixtures/test_key_pkcs1.pem");

/// Application id used by [`test_config`].
pub const TEST_APP_ID: &str = "test-app";

/// A valid configuration for `base_url` signed with [`TEST_PRIVATE_KEY`].
#[must_use]
pub fn test_config(base_url: &str) -> RepositoryConfig {
    RepositoryConfig::builder()
        .base_url(base_url)
        .app_id(TEST_APP_ID)
        .private_key(TEST_PRIVATE_KEY)
        .build()
        .expect("test config must be valid")
}

/// A [`RepositoryClient`] for `base_url` sending through `transport`.
#[must_use]
pub fn test_client(base_url: &str, transport: Arc<dyn HttpTransport>) -> RepositoryClient {
    RepositoryClient::new(test_config(base_url), transport).expect("test client must build")
}

/// A request seen by [`RecordingTransport`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
    /// Full request URL.
    pub url: String,
    /// Options the request was sent with.
    pub options: RequestOptions,
}

/// An [`HttpTransport`] that records requests and replays queued responses.
///
/// When the queue is empty, requests answer `200` with an empty body.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<TransportResult>>,
}

impl RecordingTransport {
    /// Creates a transport with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next unanswered request.
    pub fn push_response(&self, response: TransportResult) {
        self.responses.lock().push_back(response);
    }

    /// All requests seen so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn execute(&self, url: &str, options: &RequestOptions) -> TransportResult {
        self.calls.lock().push(RecordedCall { url: url.to_owned(), options: options.clone() });
        self.responses.lock().pop_front().unwrap_or_else(|| TransportResult::response(200, ""))
    }
}

/// In-memory [`UsageRegistry`] with failure injection and call counters.
///
/// Created usages get ids `usage-1`, `usage-2`, ...
#[derive(Debug, Default)]
pub struct MemoryUsageRegistry {
    usages: Mutex<Vec<Usage>>,
    deleted_nodes: Mutex<HashSet<String>>,
    last_ticket: Mutex<Option<String>>,
    reported_version: Mutex<Option<String>>,
    next_id: AtomicUsize,
    fail_create: AtomicBool,
    creates: AtomicUsize,
    lookups: AtomicUsize,
    deletes: AtomicUsize,
    node_loads: AtomicUsize,
}

impl MemoryUsageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create_usage` fail.
    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Makes created usages carry `version` instead of the requested one.
    pub fn report_version(&self, version: &str) {
        *self.reported_version.lock() = Some(version.to_owned());
    }

    /// Makes `node_by_usage` report `node_id` as deleted.
    pub fn mark_node_deleted(&self, node_id: &str) {
        self.deleted_nodes.lock().insert(node_id.to_owned());
    }

    /// Registers a usage directly.
    pub fn insert(&self, usage: Usage) {
        self.usages.lock().push(usage);
    }

    /// Live usages.
    #[must_use]
    pub fn usages(&self) -> Vec<Usage> {
        self.usages.lock().clone()
    }

    /// Ticket of the most recent `create_usage` call.
    #[must_use]
    pub fn last_ticket(&self) -> Option<String> {
        self.last_ticket.lock().clone()
    }

    /// Number of `create_usage` calls seen.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of `usage_id_by_parameters` calls seen.
    #[must_use]
    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `delete_usage` calls seen.
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Number of `node_by_usage` calls seen.
    #[must_use]
    pub fn node_calls(&self) -> usize {
        self.node_loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageRegistry for MemoryUsageRegistry {
    async fn create_usage(&self, usage: &NewUsage) -> Result<Usage> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        *self.last_ticket.lock() = Some(usage.ticket.as_str().to_owned());

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ClientError::UsageCreationFailed {
                status: 500,
                message: "injected create failure".into(),
            });
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Usage {
            node_id: usage.node_id.clone(),
            node_version: self.reported_version.lock().clone().or_else(|| usage.node_version.clone()),
            container_id: usage.container_id.clone(),
            resource_id: usage.resource_id.clone(),
            usage_id: Some(format!("usage-{n}")),
        };
        self.usages.lock().push(created.clone());
        Ok(created)
    }

    async fn usage_id_by_parameters(
        &self,
        _ticket: &str,
        node_id: &str,
        container_id: &str,
        resource_id: &str,
    ) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .usages
            .lock()
            .iter()
            .find(|u| {
                u.node_id == node_id && u.container_id == container_id && u.resource_id == resource_id
            })
            .and_then(|u| u.usage_id.clone()))
    }

    async fn delete_usage(&self, node_id: &str, usage_id: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut usages = self.usages.lock();
        let before = usages.len();
        usages.retain(|u| !(u.node_id == node_id && u.usage_id.as_deref() == Some(usage_id)));
        if usages.len() == before {
            return Err(ClientError::UsageDeleted { message: format!("no usage {usage_id}") });
        }
        Ok(())
    }

    async fn node_by_usage(&self, usage: &Usage) -> Result<Node> {
        self.node_loads.fetch_add(1, Ordering::SeqCst);
        if self.deleted_nodes.lock().contains(&usage.node_id) {
            return Err(ClientError::NodeDeleted { node_id: usage.node_id.clone() });
        }
        let known = self.usages.lock().iter().any(|u| {
            u.node_id == usage.node_id
                && u.container_id == usage.container_id
                && u.resource_id == usage.resource_id
        });
        if !known {
            return Err(ClientError::UsageDeleted { message: "usage not found".into() });
        }
        Ok(Node {
            details_snippet: Some(format!("<div>{}</div>", usage.node_id)),
            node: serde_json::json!({ "ref": { "id": usage.node_id } }),
            ..Node::default()
        })
    }
}
