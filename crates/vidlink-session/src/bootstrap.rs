use std::future::Future;
use std::time::{Duration, SystemTime};

use vidlink_core::Session;

use crate::envelope::{ApiEnvelope, BootstrapData};
use crate::error::BootstrapError;

/// Exchanges the application API key for a fresh [`Session`].
///
/// This is the one unsigned call in the protocol. Implementations must not
/// consult a session store.
pub trait Bootstrapper: Send + Sync {
    fn bootstrap(&self) -> impl Future<Output = Result<Session, BootstrapError>> + Send;
}

/// Turn a raw bootstrap response into a [`Session`].
///
/// `received_at` anchors the relative `expires_in` to the local clock.
pub fn parse_bootstrap_response(
    status: u16,
    body: &[u8],
    received_at: SystemTime,
) -> Result<Session, BootstrapError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(body)
            .map(|env| env.error_message("bootstrap failed"))
            .unwrap_or_else(|_| "bootstrap failed".to_owned());
        return Err(BootstrapError::Status { status, message });
    }

    let envelope: ApiEnvelope<BootstrapData> =
        serde_json::from_slice(body).map_err(|e| BootstrapError::Payload(e.to_string()))?;
    let data = envelope
        .data
        .ok_or_else(|| BootstrapError::Payload("missing data".to_owned()))?;

    if data.session_id.is_empty() {
        return Err(BootstrapError::Payload("empty session_id".to_owned()));
    }
    if data.session_secret.is_empty() {
        return Err(BootstrapError::Payload("empty session_secret".to_owned()));
    }

    Ok(Session::from_ttl(
        data.session_id,
        data.session_secret,
        received_at,
        Duration::from_secs(data.expires_in),
    ))
}

#[cfg(feature = "reqwest")]
mod http_impl {
    use std::sync::Arc;

    use tracing::{debug, info};
    use vidlink_core::{BOOTSTRAP_SUFFIX, Clock, SystemClock, headers};

    use super::*;

    /// Bootstrap over HTTP: `POST {base_url}/mobile-client/bootstrap`.
    #[derive(Clone)]
    pub struct HttpBootstrapper {
        client:   reqwest::Client,
        endpoint: String,
        api_key:  String,
        clock:    Arc<dyn Clock>,
    }

    impl HttpBootstrapper {
        pub fn new(client: reqwest::Client, base_url: &str, api_key: impl Into<String>) -> Self {
            Self {
                client,
                endpoint: format!("{}{BOOTSTRAP_SUFFIX}", base_url.trim_end_matches('/')),
                api_key: api_key.into(),
                clock: Arc::new(SystemClock),
            }
        }

        pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
            self.clock = clock;
            self
        }

        pub fn endpoint(&self) -> &str { &self.endpoint }
    }

    impl Bootstrapper for HttpBootstrapper {
        async fn bootstrap(&self) -> Result<Session, BootstrapError> {
            debug!(endpoint = %self.endpoint, "requesting session bootstrap");

            let response = self
                .client
                .post(&self.endpoint)
                .header(headers::ACCEPT, headers::JSON)
                .header(reqwest::header::CONTENT_TYPE, headers::JSON)
                .header(headers::API_KEY, &self.api_key)
                .body("{}")
                .send()
                .await
                .map_err(|e| BootstrapError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| BootstrapError::Transport(e.to_string()))?;

            let session = parse_bootstrap_response(status, &body, self.clock.now())?;
            info!(
                session_id = session.session_id(),
                ttl_secs = session.remaining_at(self.clock.now()).as_secs(),
                "session bootstrapped"
            );
            Ok(session)
        }
    }

    impl std::fmt::Debug for HttpBootstrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("HttpBootstrapper")
                .field("endpoint", &self.endpoint)
                .field("api_key", &"<redacted>")
                .finish()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_endpoint_trims_trailing_slash() {
            let client = reqwest::Client::new();
            let b = HttpBootstrapper::new(client.clone(), "https://api.example.com/api/v1/", "key");
            assert_eq!(b.endpoint(), "https://api.example.com/api/v1/mobile-client/bootstrap");

            let b = HttpBootstrapper::new(client, "https://api.example.com/api/v1", "key");
            assert_eq!(b.endpoint(), "https://api.example.com/api/v1/mobile-client/bootstrap");
        }

        #[test]
        fn test_debug_redacts_api_key() {
            let b = HttpBootstrapper::new(reqwest::Client::new(), "https://x", "very-secret-key");
            assert!(!format!("{b:?}").contains("very-secret-key"));
        }
    }
}

#[cfg(feature = "reqwest")]
pub use http_impl::HttpBootstrapper;
