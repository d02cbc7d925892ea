use http::StatusCode;

/// Position of a dispatch within one request's auth sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// Signed with whatever session the store had.
    Initial,
    /// Signed with a session minted after the initial attempt was rejected.
    Refreshed,
}

/// Decides when an auth rejection earns a session refresh and one resend.
///
/// Only [`Attempt::Initial`] can be followed by another attempt, so a request
/// is dispatched at most twice no matter what the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRetryPolicy {
    /// Treat 403 like 401. Some deployments use 403 for feature gating,
    /// where a new session cannot help.
    pub refresh_on_forbidden: bool,
}

impl Default for AuthRetryPolicy {
    fn default() -> Self {
        Self {
            refresh_on_forbidden: true,
        }
    }
}

impl AuthRetryPolicy {
    pub fn is_auth_rejection(&self, status: StatusCode) -> bool {
        status == StatusCode::UNAUTHORIZED || (self.refresh_on_forbidden && status == StatusCode::FORBIDDEN)
    }

    /// The attempt to make after `attempt` came back with `status`, if any.
    pub fn next(&self, attempt: Attempt, status: StatusCode) -> Option<Attempt> {
        match attempt {
            Attempt::Initial if self.is_auth_rejection(status) => Some(Attempt::Refreshed),
            _ => None,
        }
    }
}
