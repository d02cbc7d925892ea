//! Canonical string construction.
//!
//! The server rebuilds the same string from the received request, so every
//! byte here is part of the wire contract: field order, the newline
//! separator, and the raw (non-normalized) method and query.

use crate::digest::body_sha256_hex;

/// `path`, plus `?query` only when `query` is non-empty.
pub fn canonical_path(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_owned(),
    }
}

/// Per-request inputs to the signature. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    pub method:          String,
    pub canonical_path:  String,
    pub timestamp:       String,
    pub nonce:           String,
    pub body_sha256_hex: String,
}

impl SigningContext {
    pub fn new(
        method: &str,
        path: &str,
        query: Option<&str>,
        timestamp: impl Into<String>,
        nonce: impl Into<String>,
        body: &[u8],
    ) -> Self {
        Self {
            method:          method.to_owned(),
            canonical_path:  canonical_path(path, query),
            timestamp:       timestamp.into(),
            nonce:           nonce.into(),
            body_sha256_hex: body_sha256_hex(body),
        }
    }

    pub fn canonical_string(&self) -> String {
        [
            self.method.as_str(),
            self.canonical_path.as_str(),
            self.timestamp.as_str(),
            self.nonce.as_str(),
            self.body_sha256_hex.as_str(),
        ]
        .join("\n")
    }
}
