//! Resource lifecycle: placing, changing and removing repository objects in
//! a course.
//!
//! Add and update keep the local record consistent with the repository: if
//! the usage cannot be created, the local change is undone before the
//! [`LinkFailure`] is returned.
//!
//! ```text
//! add_instance                        update_instance
//!   insert record (no usage id)         load record (snapshot)
//!                                       get ticket (errors are fatal)
//!   create usage ──┐                    create usage ──┐
//!     ok:  store usage id               ok:  store new values + usage id
//!     err: delete record ──► LinkFailure  err: write snapshot back ──► LinkFailure
//! ```

use chrono::{DateTime, Utc};
use edusharing_authn::SessionUser;
use edusharing_storage::{NewResourceRecord, RecordId, ResourceRecord};

use crate::{
    descriptor::{AddResourceInput, UpdateResourceInput, UsageDescriptor, reset_options},
    error::{LinkFailure, LinkResult, Result, ServiceError},
    service::EduSharingService,
};

impl EduSharingService {
    /// Stores a new resource and registers its usage.
    ///
    /// Returns `Ok(Ok(id))` when linked, `Ok(Err(LinkFailure))` when the usage
    /// could not be created and the inserted record was removed again.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidObjectUrl`] before anything is written
    /// - [`ServiceError::Storage`] if the record cannot be inserted or updated
    #[tracing::instrument(skip(self, user, input, now), fields(user.id = %user.id, course = %input.course))]
    pub async fn add_instance(
        &self,
        user: &SessionUser,
        input: AddResourceInput,
        now: DateTime<Utc>,
    ) -> Result<LinkResult<RecordId>> {
        let node_id = self.resolver.resolve(&input.object_url)?;

        let new_record = NewResourceRecord::builder()
            .course(input.course)
            .name(input.name)
            .intro(input.intro)
            .object_url(input.object_url)
            .object_version(input.object_version)
            .time_created(now)
            .time_modified(now)
            .time_updated(now)
            .presentation(reset_options(input.presentation))
            .build();
        let id = self.records.insert_record(new_record.clone()).await?;

        let descriptor = UsageDescriptor::builder()
            .container_id(new_record.course.to_string())
            .resource_id(id.to_string())
            .node_id(node_id)
            .node_version(new_record.object_version.clone())
            .build();

        match self.create_usage(user, &descriptor).await {
            Ok(usage) => {
                let mut record = new_record.into_record(id);
                record.usage_id = usage.usage_id;
                if let Some(version) = usage.node_version {
                    record.object_version = version;
                }
                self.records.update_record(&record).await?;
                Ok(Ok(id))
            },
            Err(source) => {
                tracing::warn!(record.id = %id, error = %source, "usage creation failed, removing record");
                let compensated = match self.records.delete_record(id).await {
                    Ok(()) => true,
                    Err(error) => {
                        tracing::warn!(record.id = %id, %error, "failed to remove unlinked record");
                        false
                    },
                };
                Ok(Err(LinkFailure { record_id: id, source, compensated }))
            },
        }
    }

    /// Re-links an existing resource and stores its new settings.
    ///
    /// Returns `Ok(Ok(()))` when linked, `Ok(Err(LinkFailure))` when the usage
    /// could not be created and the record was restored to its loaded state.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::RecordNotFound`] if `input.id` does not exist
    /// - [`ServiceError::InvalidObjectUrl`] before anything is written
    /// - [`ServiceError::Auth`] if no ticket can be obtained; the record is untouched
    /// - [`ServiceError::Storage`] if the record cannot be read or written
    #[tracing::instrument(skip(self, user, input, now), fields(user.id = %user.id, record.id = %input.id))]
    pub async fn update_instance(
        &self,
        user: &SessionUser,
        input: UpdateResourceInput,
        now: DateTime<Utc>,
    ) -> Result<LinkResult<()>> {
        let original = self.load_record(input.id).await?;
        let node_id = self.resolver.resolve(&input.object_url)?;
        let ticket = self.tickets.get_ticket(user).await?;

        let descriptor = UsageDescriptor::builder()
            .container_id(input.course.to_string())
            .resource_id(input.id.to_string())
            .node_id(node_id)
            .node_version(input.object_version.clone())
            .ticket(ticket.as_str())
            .build();

        match self.create_usage(user, &descriptor).await {
            Ok(usage) => {
                let updated = ResourceRecord {
                    id: original.id,
                    course: input.course,
                    name: input.name.unwrap_or_else(|| original.name.clone()),
                    intro: input.intro.unwrap_or_else(|| original.intro.clone()),
                    object_url: input.object_url,
                    object_version: input.object_version,
                    usage_id: usage.usage_id,
                    time_created: now,
                    time_modified: now,
                    time_updated: now,
                    presentation: reset_options(input.presentation),
                };
                self.records.update_record(&updated).await?;
                Ok(Ok(()))
            },
            Err(source) => {
                tracing::warn!(record.id = %original.id, error = %source, "usage creation failed, restoring record");
                let compensated = match self.records.update_record(&original).await {
                    Ok(()) => true,
                    Err(error) => {
                        tracing::warn!(record.id = %original.id, %error, "failed to restore record");
                        false
                    },
                };
                Ok(Err(LinkFailure { record_id: original.id, source, compensated }))
            },
        }
    }

    /// Deletes the usage of a resource, then the resource itself.
    ///
    /// An audit event is emitted at INFO level on success.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::RecordNotFound`] if `id` does not exist
    /// - [`ServiceError::UsageNotFound`] if the repository has no usage for it
    /// - [`ServiceError::Registry`] if the usage cannot be deleted; the record is kept
    #[tracing::instrument(skip(self, user), fields(user.id = %user.id))]
    pub async fn delete_instance(&self, user: &SessionUser, id: RecordId) -> Result<()> {
        let record = self.load_record(id).await?;
        let node_id = self.resolver.resolve(&record.object_url)?;
        let ticket = self.tickets.get_ticket(user).await?;

        let mut descriptor = UsageDescriptor::builder()
            .container_id(record.course.to_string())
            .resource_id(record.id.to_string())
            .node_id(node_id)
            .ticket(ticket.as_str())
            .build();
        descriptor.usage_id = Some(self.get_usage_id(&descriptor).await?);
        self.delete_usage(&descriptor).await?;

        self.records.delete_record(record.id).await?;
        tracing::info!(
            audit.action = "delete_instance",
            audit.resource = %format_args!("record:{}", record.id),
            audit.result = "success",
            "audit_event"
        );
        Ok(())
    }

    async fn load_record(&self, id: RecordId) -> Result<ResourceRecord> {
        self.records.get_record(id).await?.ok_or(ServiceError::RecordNotFound { id })
    }
}
