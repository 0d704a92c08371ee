//! Course-side orchestration of edu-sharing usages.
//!
//! A course platform places repository objects into courses as *resources*.
//! Each resource is a local [`ResourceRecord`](edusharing_storage::ResourceRecord)
//! backed by a *usage* in the repository. [`EduSharingService`] keeps the two
//! in step:
//!
//! - **Tickets**: [`EduSharingService::get_ticket`] resolves the user's repository ticket, reusing
//!   the session's cached one while it is fresh or still valid
//! - **Usages**: create, look up and delete usages and render their nodes
//! - **Lifecycle**: [`EduSharingService::add_instance`], [`EduSharingService::update_instance`] and
//!   [`EduSharingService::delete_instance`] write records and usages together, undoing the local
//!   write when the repository refuses
//! - **Passthroughs**: raw metadata, session, registration and render requests plus request
//!   signing
//!
//! # Crate layout
//!
//! ```text
//! edusharing-service   orchestration (this crate)
//!   ├── edusharing-authn    ticket cache, AuthProvider
//!   ├── edusharing-client   HTTP helpers, signing, UsageRegistry
//!   └── edusharing-storage  records, session tickets
//! ```
//!
//! # Feature Flags
//!
//! - **`failpoints`**: Enables `fail` injection points for fault tests.

#![deny(unsafe_code)]

pub mod config;
pub mod descriptor;
pub mod error;
mod lifecycle;
mod passthrough;
pub mod resolver;
mod service;
mod usage;

pub use config::{ServiceConfig, SessionStoreConfig};
pub use descriptor::{AddResourceInput, UpdateResourceInput, UsageDescriptor};
pub use error::{LinkFailure, LinkResult, Result, ServiceError};
pub use passthrough::UNEXPECTED_ERROR;
pub use resolver::{NodeIdResolver, ObjectUrlResolver, object_id_from_url};
pub use service::EduSharingService;
