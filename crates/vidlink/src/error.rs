//! Error types for vidlink.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] vidlink_session::SessionError),

    #[error("failed to sign request: {0}")]
    Sign(#[from] vidlink_sign::SignError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication rejected with HTTP {status} after session refresh")]
    AuthRejected { status: u16 },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("invalid base URL: {0:?}")]
    InvalidUrl(String),

    #[error(transparent)]
    Resolver(#[from] vidlink_dns::ResolveError),

    #[cfg(feature = "reqwest")]
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[cfg(feature = "reqwest")]
    #[error("invalid proxy URL {url}: {source}")]
    Proxy {
        url:    String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<figment::Error> for ClientError {
    fn from(e: figment::Error) -> Self { ClientError::Config(Box::new(e)) }
}

pub type Result<T> = std::result::Result<T, ClientError>;
