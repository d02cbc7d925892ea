use std::sync::Arc;

use tracing::trace;
use vidlink_core::{Clock, NonceSource, RandomNonce, Session, SystemClock, headers};

use crate::Result;
use crate::canonical::SigningContext;
use crate::digest::hmac_sha256_hex;

/// The four headers attached to every signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub session_id: String,
    pub timestamp:  String,
    pub nonce:      String,
    pub signature:  String,
}

impl SignatureHeaders {
    pub fn to_headers(&self) -> [(&'static str, String); 4] {
        [
            (headers::SESSION_ID, self.session_id.clone()),
            (headers::TIMESTAMP, self.timestamp.clone()),
            (headers::NONCE, self.nonce.clone()),
            (headers::SIGNATURE, self.signature.clone()),
        ]
    }
}

/// Signs a canonical string with a session secret.
pub fn sign_canonical(secret: &str, canonical: &str) -> Result<String> { hmac_sha256_hex(secret, canonical) }

/// Produces signature headers for outgoing requests.
///
/// Timestamp and nonce are drawn fresh on every call, so re-signing the same
/// request (as the auth retry does) never replays a nonce.
#[derive(Clone)]
pub struct Signer {
    clock: Arc<dyn Clock>,
    nonce: Arc<dyn NonceSource>,
}

impl Default for Signer {
    fn default() -> Self { Self::new(Arc::new(SystemClock), Arc::new(RandomNonce)) }
}

impl Signer {
    pub fn new(clock: Arc<dyn Clock>, nonce: Arc<dyn NonceSource>) -> Self { Self { clock, nonce } }

    /// Build the signing context for a request without signing it.
    pub fn context(&self, method: &str, path: &str, query: Option<&str>, body: &[u8]) -> SigningContext {
        let timestamp = self.clock.unix_seconds().to_string();
        let nonce = self.nonce.nonce();
        SigningContext::new(method, path, query, timestamp, nonce, body)
    }

    pub fn sign(
        &self,
        session: &Session,
        method: &str,
        path: &str,
        query: Option<&str>,
        body: &[u8],
    ) -> Result<SignatureHeaders> {
        let ctx = self.context(method, path, query, body);
        let signature = sign_canonical(session.secret(), &ctx.canonical_string())?;

        trace!(
            session_id = session.session_id(),
            method,
            path = %ctx.canonical_path,
            timestamp = %ctx.timestamp,
            "signed request"
        );

        Ok(SignatureHeaders {
            session_id: session.session_id().to_owned(),
            timestamp: ctx.timestamp,
            nonce: ctx.nonce,
            signature,
        })
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").field("clock", &"{ ... }").field("nonce", &"{ ... }").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};
    use vidlink_core::{FixedClock, FixedNonce};

    const EXPECTED: &str = "9ffcc546fbd1caacc7c1d9e6c5123cfa9e6598a89f893b5aac8609d13c2f3cd6";

    fn fixed_signer() -> Signer {
        Signer::new(
            Arc::new(FixedClock::at_unix(1_700_000_000)),
            Arc::new(FixedNonce("abc123".into())),
        )
    }

    fn session() -> Session {
        Session::new("sid1", "s3cr3t", UNIX_EPOCH + Duration::from_secs(1_700_000_600))
    }

    #[test]
    fn test_known_signature_vector() {
        let headers = fixed_signer()
            .sign(&session(), "POST", "/api/v1/downloads", None, b"")
            .unwrap();

        assert_eq!(headers.session_id, "sid1");
        assert_eq!(headers.timestamp, "1700000000");
        assert_eq!(headers.nonce, "abc123");
        assert_eq!(headers.signature, EXPECTED);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = fixed_signer();
        let a = signer.sign(&session(), "POST", "/api/v1/downloads", None, b"").unwrap();
        let b = signer.sign(&session(), "POST", "/api/v1/downloads", None, b"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_query_participates_in_signature() {
        let signer = fixed_signer();
        let plain = signer.sign(&session(), "GET", "/api/v1/downloads", None, b"").unwrap();
        let paged = signer
            .sign(&session(), "GET", "/api/v1/downloads", Some("page=2"), b"")
            .unwrap();
        assert_ne!(plain.signature, paged.signature);
    }

    #[test]
    fn test_body_participates_in_signature() {
        let signer = fixed_signer();
        let empty = signer.sign(&session(), "POST", "/x", None, b"").unwrap();
        let json = signer.sign(&session(), "POST", "/x", None, b"{}").unwrap();
        assert_ne!(empty.signature, json.signature);
    }

    #[test]
    fn test_random_nonce_differs_per_call() {
        let signer = Signer::new(Arc::new(FixedClock::at_unix(1)), Arc::new(RandomNonce));
        let a = signer.sign(&session(), "GET", "/x", None, b"").unwrap();
        let b = signer.sign(&session(), "GET", "/x", None, b"").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_header_names() {
        let headers = fixed_signer().sign(&session(), "GET", "/x", None, b"").unwrap();
        let names: Vec<&str> = headers.to_headers().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, ["X-Session-Id", "X-Timestamp", "X-Nonce", "X-Signature"]);
    }
}
