use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::Result;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex SHA-256 of `body`. The empty body hashes the empty input.
pub fn body_sha256_hex(body: &[u8]) -> String { hex::encode(Sha256::digest(body)) }

/// Lowercase hex HMAC-SHA256 of `message`, keyed by the UTF-8 bytes of `secret`.
pub fn hmac_sha256_hex(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
