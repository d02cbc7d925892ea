//! Session acquisition and caching for vidlink.
//!
//! # Architecture
//!
//! - [`Bootstrapper`] - The unsigned API-key exchange that mints a session
//! - [`SessionStore`] - Caches the current session, refreshing it before expiry
//! - [`ApiEnvelope`] - The service's JSON response envelope
//!
//! The store refreshes with a double-checked critical section: N concurrent
//! callers on an empty or stale store produce exactly one bootstrap call.

pub use self::bootstrap::{Bootstrapper, parse_bootstrap_response};
pub use self::envelope::{ApiEnvelope, BootstrapData};
pub use self::error::{BootstrapError, Result, SessionError};
pub use self::store::{SessionProvider, SessionStore};

#[cfg(feature = "reqwest")]
pub use self::bootstrap::HttpBootstrapper;

mod bootstrap;
mod envelope;
mod error;
mod store;
