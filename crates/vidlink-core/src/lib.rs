//! Shared vocabulary for the vidlink signed-session client.
//!
//! # Key Types
//!
//! - [`Session`] - Immutable session value issued by the bootstrap endpoint
//! - [`Clock`] / [`NonceSource`] - Substitutable time and randomness leaves
//! - [`headers`] - Wire names of the signature headers
//!
//! Requests whose path ends with [`BOOTSTRAP_SUFFIX`] are the one unsigned
//! call in the protocol; see [`is_bootstrap_path`].

pub use self::clock::{Clock, FixedClock, FixedNonce, NonceSource, RandomNonce, SystemClock};
pub use self::session::{DEFAULT_GRACE, Session};

mod clock;
mod session;

/// Path suffix of the unsigned session bootstrap endpoint.
pub const BOOTSTRAP_SUFFIX: &str = "/mobile-client/bootstrap";

/// Header names used on the wire.
pub mod headers {
    pub const ACCEPT: &str = "Accept";
    pub const API_KEY: &str = "X-API-Key";
    pub const SESSION_ID: &str = "X-Session-Id";
    pub const TIMESTAMP: &str = "X-Timestamp";
    pub const NONCE: &str = "X-Nonce";
    pub const SIGNATURE: &str = "X-Signature";

    pub const JSON: &str = "application/json";
}

/// Returns `true` when `path` addresses the bootstrap endpoint.
///
/// Matches on suffix so versioned prefixes (`/api/v1`, `/api/v2`, ...) are
/// tolerated. A trailing query string is ignored.
pub fn is_bootstrap_path(path: &str) -> bool {
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    path.ends_with(BOOTSTRAP_SUFFIX)
}
