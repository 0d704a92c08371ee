//! Repository ticket handling for the edu-sharing integration.
//!
//! Every call the integration makes on behalf of a user carries a repository
//! ticket. This crate decides when an existing ticket can be reused and when
//! a new one has to be requested:
//!
//! - [`TicketCache`]: the per-session resolution policy
//! - [`AuthProvider`]: the remote side that issues and validates tickets
//! - [`SessionUser`] and [`AuthKeyField`]: how a host user is identified to the repository
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with a scripted [`AuthProvider`].
//! - **`failpoints`**: Enables the `ticket-before-validate` fail point.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod provider;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
pub mod ticket_cache;
pub mod user;

pub use config::{DEFAULT_FRESHNESS_WINDOW, TicketCacheConfig};
pub use error::{AuthError, Result};
pub use provider::{AuthProvider, STATUS_OK, TicketAuthInfo, UserProfile};
pub use ticket_cache::TicketCache;
pub use user::{AuthKeyField, SessionUser};
