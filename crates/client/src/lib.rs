//! Signed HTTP client for the edu-sharing repository.
//!
//! The repository trusts this application by its RSA signature and acts for
//! a user by that user's ticket. This crate wraps the REST endpoints the
//! integration uses:
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │ AuthHelper           │   │ NodeHelper           │
//! │ (AuthProvider)       │   │ (UsageRegistry)      │
//! └──────────┬───────────┘   └──────────┬───────────┘
//!            └────────────┬─────────────┘
//!                         ▼
//!              RepositoryClient (config, signer)
//!                         │
//!                         ▼
//!              HttpTransport (reqwest)
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with a recording transport, an in-memory
//!   [`UsageRegistry`] and a test RSA key.

#![deny(unsafe_code)]

pub mod auth;
pub mod base;
pub mod config;
pub mod error;
pub mod node;
pub mod signing;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod transport;
pub mod usage;

pub use auth::AuthHelper;
pub use base::RepositoryClient;
pub use config::RepositoryConfig;
pub use error::{ClientError, Result};
pub use node::NodeHelper;
pub use signing::RequestSigner;
pub use transport::{HttpMethod, HttpTransport, ReqwestTransport, RequestOptions, TransportResult};
pub use usage::{NewUsage, Node, Usage, UsageRegistry};
