//! Canonical request signing for vidlink sessions.
//!
//! Each signed request carries `X-Session-Id`, `X-Timestamp`, `X-Nonce` and
//! `X-Signature`, where the signature is the HMAC-SHA256 of
//!
//! ```text
//! METHOD \n PATH[?QUERY] \n TIMESTAMP \n NONCE \n hex(sha256(BODY))
//! ```
//!
//! keyed by the session secret.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::{Duration, UNIX_EPOCH};
//! use vidlink_core::{FixedClock, FixedNonce, Session};
//! use vidlink_sign::Signer;
//!
//! let signer = Signer::new(
//!     Arc::new(FixedClock::at_unix(1_700_000_000)),
//!     Arc::new(FixedNonce("abc123".into())),
//! );
//! let session = Session::new("sid1", "s3cr3t", UNIX_EPOCH + Duration::from_secs(1_700_000_600));
//!
//! let headers = signer.sign(&session, "POST", "/api/v1/downloads", None, b"").unwrap();
//! assert_eq!(headers.timestamp, "1700000000");
//! ```

pub use self::canonical::{SigningContext, canonical_path};
pub use self::digest::{body_sha256_hex, hmac_sha256_hex};
pub use self::error::{Result, SignError};
pub use self::signer::{SignatureHeaders, Signer, sign_canonical};

mod canonical;
mod digest;
mod error;
mod signer;
