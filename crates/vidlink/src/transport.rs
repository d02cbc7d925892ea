use std::borrow::Cow;
use std::future::Future;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use vidlink_core::headers;

/// An outgoing API request.
///
/// `path` and `query` must already be percent-encoded: they are signed
/// byte-for-byte and sent as-is. A path without a leading `/` gets one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method:  Method,
    pub path:    String,
    pub query:   Option<String>,
    pub headers: Vec<(String, String)>,
    pub body:    Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path: String = path.into();
        Self {
            method,
            path: rooted(&path).into_owned(),
            query: None,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self { Self::new(Method::GET, path) }

    pub fn post(path: impl Into<String>) -> Self { Self::new(Method::POST, path) }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn has_header(&self, name: &str) -> bool { self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)) }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> serde_json::Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.header("Content-Type", headers::JSON).body(body))
    }

    /// `path?query`, or just `path` when there is no query.
    pub fn path_and_query(&self) -> String { vidlink_sign::canonical_path(&self.path, self.query.as_deref()) }
}

/// `path` with a leading `/`, so joining it onto an origin or prefix never
/// runs into the previous segment.
pub(crate) fn rooted(path: &str) -> Cow<'_, str> {
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

/// A received API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status:  StatusCode,
    pub headers: HeaderMap,
    pub body:    Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn text(&self) -> String { String::from_utf8_lossy(&self.body).into_owned() }
}

/// The `send(request) -> response` capability the signing layer wraps.
///
/// Implementations own connection handling, TLS, DNS and timeouts. They must
/// return non-2xx statuses as responses, not errors.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: Production implementation using `reqwest`
/// - [`SignedClient`](crate::SignedClient): Signs and retries around another transport
/// - Mock implementations for testing
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(&self, request: &ApiRequest) -> impl Future<Output = Result<ApiResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;

    /// Production transport using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
        origin: String,
    }

    impl ReqwestTransport {
        /// `origin` is `scheme://host[:port]`; request paths are appended to it.
        pub fn new(client: reqwest::Client, origin: &str) -> Self {
            Self {
                client,
                origin: origin.trim_end_matches('/').to_owned(),
            }
        }

        pub fn url_for(&self, request: &ApiRequest) -> String {
            format!("{}{}", self.origin, rooted(&request.path_and_query()))
        }
    }

    impl Transport for ReqwestTransport {
        type Error = reqwest::Error;

        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, Self::Error> {
            let mut builder = self.client.request(request.method.clone(), self.url_for(request));
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.body(request.body.clone()).send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;

            Ok(ApiResponse { status, headers, body })
        }
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;
