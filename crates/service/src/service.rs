//! The [`EduSharingService`] facade.

use std::sync::Arc;

use edusharing_authn::{AuthProvider, TicketCache};
use edusharing_client::{AuthHelper, NodeHelper, RepositoryClient, UsageRegistry};
use edusharing_storage::{ResourceRecordStore, TicketSessionStore};

use crate::{
    config::ServiceConfig,
    error::Result,
    resolver::{NodeIdResolver, ObjectUrlResolver},
};

/// Links course resources to repository nodes.
///
/// Every collaborator is injected: tickets come from a [`TicketCache`], usages
/// from a [`UsageRegistry`], records from a [`ResourceRecordStore`]. The
/// [`RepositoryClient`] serves the signing and raw-request passthroughs.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use edusharing_service::{EduSharingService, ServiceConfig};
/// use edusharing_storage::MemoryRecordStore;
///
/// let config: ServiceConfig = serde_json::from_str(&std::fs::read_to_string("edusharing.json")?)?;
/// let service = EduSharingService::from_config(config, Arc::new(MemoryRecordStore::new()))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EduSharingService {
    pub(crate) tickets: Arc<TicketCache>,
    pub(crate) registry: Arc<dyn UsageRegistry>,
    pub(crate) records: Arc<dyn ResourceRecordStore>,
    pub(crate) resolver: Arc<dyn NodeIdResolver>,
    pub(crate) repository: Arc<RepositoryClient>,
}

#[bon::bon]
impl EduSharingService {
    /// Creates a service from its collaborators.
    ///
    /// `resolver` defaults to [`ObjectUrlResolver`].
    #[builder]
    pub fn new(
        tickets: Arc<TicketCache>,
        registry: Arc<dyn UsageRegistry>,
        records: Arc<dyn ResourceRecordStore>,
        #[builder(default = Arc::new(ObjectUrlResolver) as Arc<dyn NodeIdResolver>)]
        resolver: Arc<dyn NodeIdResolver>,
        repository: Arc<RepositoryClient>,
    ) -> Self {
        Self { tickets, registry, records, resolver, repository }
    }

    /// Wires the HTTP helpers and an in-memory session store from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Registry`](crate::ServiceError::Registry) if the
    /// repository configuration or private key is invalid.
    pub fn from_config(config: ServiceConfig, records: Arc<dyn ResourceRecordStore>) -> Result<Self> {
        let sessions: Arc<dyn TicketSessionStore> = Arc::new(config.sessions.build_store());
        let repository = Arc::new(RepositoryClient::from_config(config.repository)?);
        let auth: Arc<dyn AuthProvider> = Arc::new(AuthHelper::new(Arc::clone(&repository)));
        let tickets = Arc::new(TicketCache::new(auth, sessions, config.tickets));
        let registry: Arc<dyn UsageRegistry> = Arc::new(NodeHelper::new(Arc::clone(&repository)));

        tracing::info!(
            base_url = repository.config().base_url(),
            app_id = repository.config().app_id(),
            "edu-sharing service configured"
        );

        Ok(Self::builder()
            .tickets(tickets)
            .registry(registry)
            .records(records)
            .repository(repository)
            .build())
    }

    /// Returns the ticket cache.
    #[must_use]
    pub fn tickets(&self) -> &TicketCache {
        &self.tickets
    }

    /// Returns the repository client.
    #[must_use]
    pub fn repository(&self) -> &RepositoryClient {
        &self.repository
    }
}

impl std::fmt::Debug for EduSharingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EduSharingService")
            .field("tickets", &self.tickets)
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}
