//! The signing and auth-retry layer.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use vidlink_core::{Session, headers, is_bootstrap_path};
use vidlink_session::{ApiEnvelope, SessionProvider};
use vidlink_sign::Signer;

use crate::error::{ClientError, Result};
use crate::retry::{Attempt, AuthRetryPolicy};
use crate::transport::{ApiRequest, ApiResponse, Transport, rooted};

/// Signs every outgoing request and retries once on auth rejection.
///
/// Per request:
///
/// ```text
/// NeedSession -> Signed -> Sent -> {Accepted, Rejected}
/// Rejected -> invalidate -> NeedSession' -> Signed' -> Sent' -> Final
/// ```
///
/// Requests to the bootstrap endpoint skip the session store and signer and
/// carry only the static API key headers. Transport errors and non-auth
/// statuses are returned unchanged.
pub struct SignedClient<T, P> {
    transport:   T,
    sessions:    Arc<P>,
    signer:      Signer,
    api_key:     String,
    path_prefix: String,
    policy:      AuthRetryPolicy,
}

impl<T: Transport, P: SessionProvider> SignedClient<T, P> {
    pub fn new(transport: T, sessions: Arc<P>, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            sessions,
            signer: Signer::default(),
            api_key: api_key.into(),
            path_prefix: String::new(),
            policy: AuthRetryPolicy::default(),
        }
    }

    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.signer = signer;
        self
    }

    /// Prefix prepended to every request path, e.g. `/api/v1`.
    pub fn with_path_prefix(mut self, prefix: &str) -> Self {
        self.path_prefix = prefix.trim_end_matches('/').to_owned();
        self
    }

    pub fn with_policy(mut self, policy: AuthRetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sessions(&self) -> &Arc<P> { &self.sessions }

    pub fn transport(&self) -> &T { &self.transport }

    /// Full server-side path plus the static headers every request carries,
    /// unless the caller already set them.
    fn prepare(&self, request: &ApiRequest) -> ApiRequest {
        let mut prepared = request.clone();
        prepared.path = format!("{}{}", self.path_prefix, rooted(&request.path));
        if !prepared.has_header(headers::ACCEPT) {
            prepared.headers.push((headers::ACCEPT.to_owned(), headers::JSON.to_owned()));
        }
        if !prepared.has_header(headers::API_KEY) {
            prepared.headers.push((headers::API_KEY.to_owned(), self.api_key.clone()));
        }
        prepared
    }

    fn sign(&self, request: &ApiRequest, session: &Session) -> Result<ApiRequest> {
        let signature = self.signer.sign(
            session,
            request.method.as_str(),
            &request.path,
            request.query.as_deref(),
            &request.body,
        )?;

        let mut signed = request.clone();
        signed
            .headers
            .extend(signature.to_headers().into_iter().map(|(k, v)| (k.to_owned(), v)));
        Ok(signed)
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        debug!(method = %request.method, path = %request.path, status = %response.status, "dispatched");
        Ok(response)
    }

    /// Send `request`, returning whatever the final attempt produced.
    ///
    /// A 401 (and by default 403) on the first attempt invalidates the
    /// session and resends once with a fresh one. The second response is
    /// returned as-is, even if it is another rejection.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let request = self.prepare(request);

        if is_bootstrap_path(&request.path) {
            debug!(path = %request.path, "bootstrap path, sending unsigned");
            return self.dispatch(&request).await;
        }

        let mut attempt = Attempt::Initial;
        loop {
            if attempt == Attempt::Refreshed {
                self.sessions.invalidate();
            }

            let session = self.sessions.get_or_create().await?;
            let response = self.dispatch(&self.sign(&request, &session)?).await?;

            match self.policy.next(attempt, response.status) {
                Some(next) => {
                    warn!(
                        status = %response.status,
                        path = %request.path,
                        session_id = session.session_id(),
                        "request rejected, refreshing session and retrying once"
                    );
                    attempt = next;
                }
                None => return Ok(response),
            }
        }
    }

    /// Send `request` and decode the `data` member of the response envelope.
    ///
    /// A final 401/403 becomes [`ClientError::AuthRejected`]; any other
    /// non-2xx status, or `success: false`, becomes [`ClientError::Api`].
    pub async fn send_json<D: DeserializeOwned>(&self, request: &ApiRequest) -> Result<D> {
        let response = self.send(request).await?;
        decode_envelope(&self.policy, &response)
    }
}

fn decode_envelope<D: DeserializeOwned>(policy: &AuthRetryPolicy, response: &ApiResponse) -> Result<D> {
    let status = response.status;
    let fallback = status.canonical_reason().unwrap_or("request failed");

    if policy.is_auth_rejection(status) {
        return Err(ClientError::AuthRejected {
            status: status.as_u16(),
        });
    }

    if !status.is_success() {
        let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&response.body)
            .map(|env| env.error_message(fallback))
            .unwrap_or_else(|_| fallback.to_owned());
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ApiEnvelope<D> = serde_json::from_slice(&response.body)?;
    if !envelope.success {
        return Err(ClientError::Api {
            status:  status.as_u16(),
            message: envelope.error_message(fallback),
        });
    }

    envelope.data.ok_or_else(|| ClientError::Api {
        status:  status.as_u16(),
        message: "No data returned".to_owned(),
    })
}

impl<T: Transport, P: SessionProvider> Transport for SignedClient<T, P> {
    type Error = ClientError;

    async fn send(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, Self::Error> {
        SignedClient::send(self, request).await
    }
}

impl<T, P> std::fmt::Debug for SignedClient<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedClient")
            .field("path_prefix", &self.path_prefix)
            .field("policy", &self.policy)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
