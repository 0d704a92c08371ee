//! Local persistence for the edu-sharing integration.
//!
//! This crate holds the two pieces of state the integration keeps on the
//! course-management side:
//!
//! - **Resource records**: one [`ResourceRecord`] per repository object placed in a course, behind
//!   the [`ResourceRecordStore`] trait
//! - **Session tickets**: the repository ticket cached per user session, behind the
//!   [`TicketSessionStore`] trait
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  edusharing-service                         │
//! │        (add / update / delete instance orchestration)       │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │     ResourceRecordStore      │     TicketSessionStore       │
//! │  (get, insert, update,       │   (get, put, remove)         │
//! │   delete)                    │                              │
//! ├──────────────────────────────┼──────────────────────────────┤
//! │  MemoryRecordStore (tests)   │ MemoryTicketSessionStore     │
//! │  host database (production)  │ (idle-expiring cache)        │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with record builders and a store whose writes
//!   can be made to fail.

#![deny(unsafe_code)]

pub mod error;
pub mod record;
pub mod session;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod types;

// Re-export primary types at crate root for convenience
pub use error::{BoxError, StorageError, StorageResult};
pub use record::{NewResourceRecord, PresentationOptions, ResourceRecord};
pub use session::{
    CachedTicket, DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TIMEOUT,
    MemoryTicketSessionStore, TicketSessionStore,
};
pub use store::{MemoryRecordStore, ResourceRecordStore};
pub use types::{CourseId, RecordId, UserId};
pub use zeroize::Zeroizing;
