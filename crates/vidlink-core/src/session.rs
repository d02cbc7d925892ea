use std::fmt;
use std::time::{Duration, SystemTime};

/// Lead time before expiry at which a session is treated as stale.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// A bootstrapped signing session.
///
/// Fields are private and there are no setters: a new secret means a new
/// `Session`. Absence of a session is the store's concern, never a session
/// with empty fields.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    session_id: String,
    secret:     String,
    expires_at: SystemTime,
}

impl Session {
    pub fn new(session_id: impl Into<String>, secret: impl Into<String>, expires_at: SystemTime) -> Self {
        Self {
            session_id: session_id.into(),
            secret: secret.into(),
            expires_at,
        }
    }

    /// Build a session that expires `ttl` after `issued_at`.
    pub fn from_ttl(
        session_id: impl Into<String>,
        secret: impl Into<String>,
        issued_at: SystemTime,
        ttl: Duration,
    ) -> Self {
        let expires_at = issued_at.checked_add(ttl).unwrap_or(issued_at);
        Self::new(session_id, secret, expires_at)
    }

    pub fn session_id(&self) -> &str { &self.session_id }

    /// The HMAC key. Never log this.
    pub fn secret(&self) -> &str { &self.secret }

    pub fn expires_at(&self) -> SystemTime { self.expires_at }

    /// `true` iff `expires_at > now + grace`.
    pub fn is_fresh_at(&self, now: SystemTime, grace: Duration) -> bool {
        match now.checked_add(grace) {
            Some(deadline) => self.expires_at > deadline,
            None => false,
        }
    }

    /// Time left until hard expiry, zero if already expired.
    pub fn remaining_at(&self, now: SystemTime) -> Duration {
        self.expires_at.duration_since(now).unwrap_or(Duration::ZERO)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.session_id)
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn at(secs: u64) -> SystemTime { UNIX_EPOCH + Duration::from_secs(secs) }

    #[test]
    fn test_freshness_threshold() {
        let now = at(1_000);

        let stale = Session::new("sid", "sec", now + Duration::from_secs(4));
        assert!(!stale.is_fresh_at(now, DEFAULT_GRACE));

        let fresh = Session::new("sid", "sec", now + Duration::from_secs(6));
        assert!(fresh.is_fresh_at(now, DEFAULT_GRACE));
    }

    #[test]
    fn test_freshness_boundary_is_strict() {
        let now = at(1_000);
        let edge = Session::new("sid", "sec", now + DEFAULT_GRACE);
        assert!(!edge.is_fresh_at(now, DEFAULT_GRACE));
    }

    #[test]
    fn test_from_ttl() {
        let session = Session::from_ttl("sid1", "sec1", at(100), Duration::from_secs(600));
        assert_eq!(session.expires_at(), at(700));
        assert_eq!(session.remaining_at(at(400)), Duration::from_secs(300));
        assert_eq!(session.remaining_at(at(900)), Duration::ZERO);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let session = Session::new("sid1", "super-secret-value", at(0));
        let rendered = format!("{session:?}");
        assert!(rendered.contains("sid1"));
        assert!(!rendered.contains("super-secret-value"));
    }
}
