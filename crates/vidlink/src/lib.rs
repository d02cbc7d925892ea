//! Signed-session HTTP client for the video downloader API.
//!
//! # Architecture
//!
//! - [`Transport`] - The `send(request) -> response` seam; [`ReqwestTransport`] in production
//! - [`SignedClient`] - Signs each request and retries once on 401/403
//! - [`ClientConfig`] - Figment-loaded settings that wire everything together
//!
//! Sessions come from [`vidlink_session::SessionStore`], signatures from
//! [`vidlink_sign::Signer`] and DNS fallback from [`vidlink_dns`].
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), vidlink::ClientError> {
//! use vidlink::{ApiRequest, ClientConfig};
//!
//! let client = ClientConfig::new("https://api.example.com/api/v1", "app-key").build()?;
//! let response = client.send(&ApiRequest::get("/mobile-client/platforms")).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod retry;
mod transport;

pub use client::SignedClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use retry::{Attempt, AuthRetryPolicy};
pub use transport::{ApiRequest, ApiResponse, Transport};

#[cfg(feature = "reqwest")]
pub use config::HttpClient;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;

pub use vidlink_core::{Clock, NonceSource, Session};
pub use vidlink_session::{ApiEnvelope, SessionError, SessionProvider, SessionStore};
pub use vidlink_sign::Signer;
