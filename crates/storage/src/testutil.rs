//! Shared test utilities for record storage.
//!
//! Feature-gated behind `testutil` to keep it out of production builds.
//!
//! ```toml
//! [dev-dependencies]
//! edusharing-storage = { path = "../storage", features = ["testutil"] }
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    error::{StorageError, StorageResult},
    record::{NewResourceRecord, ResourceRecord},
    store::{MemoryRecordStore, ResourceRecordStore},
    types::{CourseId, RecordId},
};

/// Builds a new record for `course` pointing at `object_url`.
#[must_use]
pub fn new_record(course: i64, object_url: &str) -> NewResourceRecord {
    NewResourceRecord::builder()
        .course(CourseId::from(course))
        .name("Test resource")
        .object_url(object_url)
        .object_version("1.0")
        .build()
}

/// A [`MemoryRecordStore`] whose writes can be switched to fail.
///
/// Used to exercise compensation paths where the rollback write itself
/// fails. Every call is counted.
#[derive(Debug, Default)]
pub struct FlakyRecordStore {
    inner: MemoryRecordStore,
    fail_updates: AtomicBool,
    fail_deletes: AtomicBool,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

impl FlakyRecordStore {
    /// Wraps a fresh in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for direct inspection.
    #[must_use]
    pub fn inner(&self) -> &MemoryRecordStore {
        &self.inner
    }

    /// Makes every subsequent `update_record` fail.
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    /// Makes every subsequent `delete_record` fail.
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Number of `update_record` calls seen.
    #[must_use]
    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Number of `delete_record` calls seen.
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceRecordStore for FlakyRecordStore {
    async fn get_record(&self, id: RecordId) -> StorageResult<Option<ResourceRecord>> {
        self.inner.get_record(id).await
    }

    async fn insert_record(&self, record: NewResourceRecord) -> StorageResult<RecordId> {
        self.inner.insert_record(record).await
    }

    async fn update_record(&self, record: &ResourceRecord) -> StorageResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StorageError::internal("injected update failure"));
        }
        self.inner.update_record(record).await
    }

    async fn delete_record(&self, id: RecordId) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::internal("injected delete failure"));
        }
        self.inner.delete_record(id).await
    }
}

/// Assert that a [`StorageResult`] is a [`StorageError::NotFound`].
#[macro_export]
macro_rules! assert_not_found {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::NotFound { .. })),
            "expected StorageError::NotFound, got: {:?}",
            $result,
        );
    };
}
