//! Usage operations: create, look up, delete and render.

use edusharing_authn::SessionUser;
use edusharing_client::{NewUsage, Node, Usage};
use edusharing_storage::Zeroizing;
use fail::fail_point;

use crate::{
    descriptor::UsageDescriptor,
    error::{Result, ServiceError},
    service::EduSharingService,
};

impl EduSharingService {
    /// Returns a ticket the repository accepts for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Auth`] if no ticket can be obtained.
    pub async fn get_ticket(&self, user: &SessionUser) -> Result<Zeroizing<String>> {
        Ok(self.tickets.get_ticket(user).await?)
    }

    /// Registers a usage of `node_id` in `container_id`/`resource_id`.
    ///
    /// Uses `descriptor.ticket` when set, otherwise the user's session ticket.
    /// An audit event is emitted at INFO level on success.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::MissingField`] if container, resource or node id is missing
    /// - [`ServiceError::Auth`] if no ticket can be obtained
    /// - [`ServiceError::Registry`] if the repository refuses
    #[tracing::instrument(skip(self, user, descriptor), fields(user.id = %user.id))]
    pub async fn create_usage(&self, user: &SessionUser, descriptor: &UsageDescriptor) -> Result<Usage> {
        let container_id = descriptor.container_id()?;
        let resource_id = descriptor.resource_id()?;
        let node_id = descriptor.node_id()?;

        let ticket = match descriptor.ticket.as_deref().filter(|t| !t.is_empty()) {
            Some(ticket) => Zeroizing::new(ticket.to_owned()),
            None => self.tickets.get_ticket(user).await?,
        };

        fail_point!("service-before-create-usage", |_| {
            Err(ServiceError::Registry(edusharing_client::ClientError::UsageCreationFailed {
                status: 0,
                message: "injected failure before usage creation".into(),
            }))
        });

        let usage = self
            .registry
            .create_usage(&NewUsage {
                ticket,
                container_id: container_id.to_owned(),
                resource_id: resource_id.to_owned(),
                node_id: node_id.to_owned(),
                node_version: descriptor.node_version().map(str::to_owned),
            })
            .await?;

        tracing::info!(
            audit.action = "create_usage",
            audit.resource = %format_args!("node:{node_id}/course:{container_id}/resource:{resource_id}"),
            audit.result = "success",
            "audit_event"
        );
        Ok(usage)
    }

    /// Looks up the id of the usage described by `descriptor`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::MissingField`] if ticket, node, container or resource id is missing
    /// - [`ServiceError::UsageNotFound`] if the repository has no such usage
    #[tracing::instrument(skip(self, descriptor))]
    pub async fn get_usage_id(&self, descriptor: &UsageDescriptor) -> Result<String> {
        let ticket = descriptor.ticket()?;
        let node_id = descriptor.node_id()?;
        let container_id = descriptor.container_id()?;
        let resource_id = descriptor.resource_id()?;

        self.registry
            .usage_id_by_parameters(ticket, node_id, container_id, resource_id)
            .await?
            .ok_or(ServiceError::UsageNotFound)
    }

    /// Deletes the usage `descriptor.usage_id` of `descriptor.node_id`.
    ///
    /// An audit event is emitted at INFO level on success.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::MissingUsageId`] without a usage id; the registry is not contacted
    /// - [`ServiceError::MissingField`] without a node id
    /// - [`ServiceError::Registry`] if the repository refuses
    #[tracing::instrument(skip(self, descriptor))]
    pub async fn delete_usage(&self, descriptor: &UsageDescriptor) -> Result<()> {
        let usage_id = descriptor
            .usage_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ServiceError::MissingUsageId)?;
        let node_id = descriptor.node_id()?;

        self.registry.delete_usage(node_id, usage_id).await?;

        tracing::info!(
            audit.action = "delete_usage",
            audit.resource = %format_args!("node:{node_id}/usage:{usage_id}"),
            audit.result = "success",
            "audit_event"
        );
        Ok(())
    }

    /// Loads the node behind the usage described by `descriptor`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::MissingField`] if node, container or resource id is missing
    /// - [`ServiceError::Registry`] wrapping `NodeDeleted` or `UsageDeleted` when
    ///   either is gone; see [`ServiceError::is_node_deleted`]
    #[tracing::instrument(skip(self, descriptor))]
    pub async fn get_node(&self, descriptor: &UsageDescriptor) -> Result<Node> {
        let usage = Usage {
            node_id: descriptor.node_id()?.to_owned(),
            node_version: descriptor.node_version().map(str::to_owned),
            container_id: descriptor.container_id()?.to_owned(),
            resource_id: descriptor.resource_id()?.to_owned(),
            usage_id: descriptor.usage_id.clone(),
        };

        Ok(self.registry.node_by_usage(&usage).await?)
    }
}
