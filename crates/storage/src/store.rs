//! Storage trait for resource record persistence.
//!
//! [`ResourceRecordStore`] abstracts the host database table holding one
//! [`ResourceRecord`] per placed repository object. Production hosts back it
//! with their own database layer; [`MemoryRecordStore`] serves tests and
//! development.
//!
//! # Usage
//!
//! ```
//! use edusharing_storage::{CourseId, MemoryRecordStore, NewResourceRecord, ResourceRecordStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryRecordStore::new();
//!     let id = store
//!         .insert_record(
//!             NewResourceRecord::builder()
//!                 .course(CourseId::from(4))
//!                 .object_url("ccrep://home/abc")
//!                 .build(),
//!         )
//!         .await?;
//!
//!     assert!(store.get_record(id).await?.is_some());
//!     Ok(())
//! }
//! ```

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    error::{StorageError, StorageResult},
    record::{NewResourceRecord, ResourceRecord},
    types::RecordId,
};

/// Persistence layer for resource records.
///
/// Operations are row-level; there is no transaction spanning calls, so
/// compensating writes issued by callers are best-effort.
#[async_trait]
pub trait ResourceRecordStore: Send + Sync {
    /// Retrieves a record by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if the record exists
    /// - `Ok(None)` if it doesn't
    /// - `Err(...)` on storage errors
    async fn get_record(&self, id: RecordId) -> StorageResult<Option<ResourceRecord>>;

    /// Inserts a new record and returns its generated id.
    async fn insert_record(&self, record: NewResourceRecord) -> StorageResult<RecordId>;

    /// Overwrites every field of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no record has `record.id`.
    async fn update_record(&self, record: &ResourceRecord) -> StorageResult<()>;

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the record doesn't exist.
    async fn delete_record(&self, id: RecordId) -> StorageResult<()>;
}

/// In-memory implementation of [`ResourceRecordStore`].
///
/// Ids are assigned from a monotonically increasing sequence starting at 1
/// and never reused, mirroring an auto-increment column.
///
/// `MemoryRecordStore` is cheaply cloneable; all clones share the same rows.
#[derive(Debug, Clone)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<BTreeMap<RecordId, ResourceRecord>>>,
    next_id: Arc<AtomicI64>,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self { records: Arc::default(), next_id: Arc::new(AtomicI64::new(1)) }
    }
}

impl MemoryRecordStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Copies every stored record, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ResourceRecord> {
        self.records.read().values().cloned().collect()
    }
}

#[async_trait]
impl ResourceRecordStore for MemoryRecordStore {
    #[tracing::instrument(skip(self))]
    async fn get_record(&self, id: RecordId) -> StorageResult<Option<ResourceRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    #[tracing::instrument(skip(self, record), fields(course = %record.course))]
    async fn insert_record(&self, record: NewResourceRecord) -> StorageResult<RecordId> {
        let id = RecordId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut records = self.records.write();

        if records.contains_key(&id) {
            return Err(StorageError::conflict(ResourceRecord::key(id)));
        }

        records.insert(id, record.into_record(id));
        Ok(id)
    }

    #[tracing::instrument(skip(self, record), fields(id = %record.id))]
    async fn update_record(&self, record: &ResourceRecord) -> StorageResult<()> {
        let mut records = self.records.write();
        let slot = records
            .get_mut(&record.id)
            .ok_or_else(|| StorageError::not_found(ResourceRecord::key(record.id)))?;

        *slot = record.clone();
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_record(&self, id: RecordId) -> StorageResult<()> {
        if self.records.write().remove(&id).is_none() {
            return Err(StorageError::not_found(ResourceRecord::key(id)));
        }
        Ok(())
    }
}
